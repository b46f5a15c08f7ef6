//! Player movement state machine and dual-engine collision resolver for a
//! stylized exploration world.
//!
//! [`systems::PlayerController`] is the entry point: it owns the player's
//! kinematic record and advances it one frame at a time against a
//! [`world::PhysicsWorld`].

pub mod audio;
pub mod camera;
pub mod collab;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fsm;
pub mod math;
pub mod physics;
pub mod scene;
pub mod systems;
pub mod terrain;
pub mod vine;
pub mod world;
