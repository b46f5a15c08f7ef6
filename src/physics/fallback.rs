use crate::config::MovementConfig;
use crate::terrain::Terrain;

use super::{EngineStep, Kinematics, MoveIntent, MovementEngine};

/// Slow path: smoothing, gravity and ground snapping against the unified
/// ground height (basin and island included). Never declines.
pub struct FallbackIntegrator {
    config: MovementConfig,
}

impl FallbackIntegrator {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }
}

impl MovementEngine for FallbackIntegrator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn try_step(&mut self, dt: f32, body: &Kinematics, intent: &MoveIntent, terrain: &Terrain) -> Option<EngineStep> {
        let cfg = &self.config;
        let mut position = body.position;
        let mut velocity = body.velocity;

        // Low-pass horizontal velocity toward the camera-relative target.
        let blend = (cfg.smoothing_rate * dt).min(1.0);
        let target = intent.target_velocity();
        velocity.x += (target.x - velocity.x) * blend;
        velocity.z += (target.z - velocity.z) * blend;

        let jumped = intent.jump && body.grounded;
        if jumped {
            velocity.y = cfg.jump_speed;
        } else {
            velocity.y -= cfg.gravity * intent.gravity_multiplier * dt;
        }

        // Semi-implicit Euler: velocity first, then position.
        position += velocity * dt;

        let ground = terrain.height(position.x, position.z) + cfg.player_height;
        let impact_velocity = velocity.y;
        let falling = velocity.y <= 0.0;
        let landed = falling && position.y <= ground;
        // Walking down a gentle slope keeps contact instead of hopping.
        let stuck = body.grounded && !jumped && falling && position.y - ground <= cfg.step_down;

        let grounded = landed || stuck;
        if grounded {
            position.y = ground;
            velocity.y = 0.0;
        }

        Some(EngineStep {
            position,
            velocity,
            grounded,
            jumped,
            impact_velocity,
        })
    }
}
