use glam::Vec3;

use crate::config::{AbilityConfig, MovementConfig};
use crate::fsm::StateMachine;

// ---------------------------------------------------------------------------
// Player mode
// ---------------------------------------------------------------------------

/// Mutually exclusive movement modes; exactly one is active per frame.
///
/// Transition rules live in `systems::player`. Dance sub-state rides inside
/// its variant, so leaving `Dancing` drops it automatically.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerMode {
    /// Walking, falling and jumping on terrain and platforms.
    Default,
    /// Submerged in the lake or a flooded cave mouth.
    Swimming,
    /// Reserved; currently behaves as `Default` with zero velocity.
    Climbing,
    /// Attached to a vine; the vine's pendulum drives the position.
    Vine,
    /// Decorative beat-synced motion.
    Dancing(DanceState),
}

impl PlayerMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Swimming => "Swimming",
            Self::Climbing => "Climbing",
            Self::Vine => "Vine",
            Self::Dancing(_) => "Dancing",
        }
    }
}

/// Captured when dancing starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DanceState {
    pub origin: Vec3,
    /// Flat camera heading (radians) when the dance started.
    pub heading: f32,
    pub elapsed: f32,
    /// smooth_damp spring state for the camera roll.
    pub roll_velocity: f32,
}

impl DanceState {
    pub fn new(origin: Vec3, heading: f32) -> Self {
        Self {
            origin,
            heading,
            elapsed: 0.0,
            roll_velocity: 0.0,
        }
    }
}

/// FSM holding the player's mode.
pub type ModeFsm = StateMachine<PlayerMode>;

// ---------------------------------------------------------------------------
// Abilities
// ---------------------------------------------------------------------------

/// Double jump, dash and phase-shift bookkeeping.
///
/// Only meaningful in `Default` mode; reset on every mode change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityState {
    pub air_jumps_left: u32,
    pub dash_cooldown: f32,
    pub is_phasing: bool,
    pub phase_timer: f32,
    /// Visual distortion uniform, pulsing high while phasing.
    pub distortion: f32,
    air_jumps: u32,
}

impl AbilityState {
    pub fn new(cfg: &AbilityConfig) -> Self {
        Self {
            air_jumps_left: cfg.air_jumps,
            dash_cooldown: 0.0,
            is_phasing: false,
            phase_timer: 0.0,
            distortion: 0.0,
            air_jumps: cfg.air_jumps,
        }
    }

    pub fn refill_air_jumps(&mut self) {
        self.air_jumps_left = self.air_jumps;
    }

    pub fn reset(&mut self) {
        *self = Self {
            air_jumps: self.air_jumps,
            air_jumps_left: self.air_jumps,
            dash_cooldown: 0.0,
            is_phasing: false,
            phase_timer: 0.0,
            distortion: 0.0,
        };
    }
}

// ---------------------------------------------------------------------------
// Player kinematic record
// ---------------------------------------------------------------------------

/// The single mutable kinematic record of the player.
#[derive(Clone, Debug)]
pub struct PlayerState {
    /// Tracked position, `player_height` above the feet.
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub sprint_speed: f32,
    pub sneak_speed: f32,
    /// Current gravity after environment modulation.
    pub gravity: f32,
    pub mode: ModeFsm,
    pub is_grounded: bool,
    pub is_underwater: bool,
    pub abilities: AbilityState,
}

impl PlayerState {
    pub fn new(position: Vec3, movement: &MovementConfig, abilities: &AbilityConfig) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            speed: movement.walk_speed,
            sprint_speed: movement.sprint_speed,
            sneak_speed: movement.sneak_speed,
            gravity: movement.gravity,
            mode: ModeFsm::new(PlayerMode::Default),
            is_grounded: false,
            is_underwater: false,
            abilities: AbilityState::new(abilities),
        }
    }

    pub fn current_mode(&self) -> &PlayerMode {
        &self.mode.state
    }

    /// Seconds spent in the current mode.
    pub fn time_in_mode(&self) -> f32 {
        self.mode.elapsed
    }

    pub fn is_swimming(&self) -> bool {
        self.mode.state == PlayerMode::Swimming
    }
}
