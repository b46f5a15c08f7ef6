mod abilities;
mod collision;
mod modes;
mod movement;
mod player;

pub use player::PlayerController;
