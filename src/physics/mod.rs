//! The two interchangeable movement backends used by Default mode.
//!
//! [`FastPathEngine`] wraps the compiled engine and its flat state slot;
//! [`FallbackIntegrator`] is the plain integrator that understands the carved
//! basin. Both implement [`MovementEngine`], so the controller picks one by
//! zone and falls back uniformly when the fast path declines.

mod compiled;
mod fallback;

pub use compiled::{CompiledEngine, FastPathEngine};
pub use fallback::FallbackIntegrator;

use glam::Vec3;

use crate::terrain::Terrain;

/// What the player wants to do this frame, already resolved against the camera.
#[derive(Clone, Copy, Debug)]
pub struct MoveIntent {
    /// Horizontal move direction, length at most 1.
    pub direction: Vec3,
    /// Walk, sprint or sneak speed, whichever is active.
    pub speed: f32,
    /// Only ever set while grounded; air jumps belong to the ability system.
    pub jump: bool,
    pub sprint: bool,
    pub sneak: bool,
    pub gravity_multiplier: f32,
}

impl MoveIntent {
    pub fn target_velocity(&self) -> Vec3 {
        self.direction * self.speed
    }
}

/// Kinematic state handed to an engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
}

/// Result of one successful engine step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineStep {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    /// A grounded jump was applied this step.
    pub jumped: bool,
    /// Vertical velocity at the moment of ground contact (before the snap zeroed it).
    pub impact_velocity: f32,
}

pub trait MovementEngine {
    fn name(&self) -> &'static str;

    /// Advance one frame, or `None` if this engine cannot handle it.
    fn try_step(&mut self, dt: f32, body: &Kinematics, intent: &MoveIntent, terrain: &Terrain) -> Option<EngineStep>;
}
