use glam::Vec3;
use log::trace;

use crate::engine::input::Action;
use crate::events::PhysicsEvent;
use crate::physics::{EngineStep, Kinematics, MoveIntent, MovementEngine};
use crate::world::PhysicsWorld;

use super::player::{Frame, PlayerController};

impl PlayerController {
    /// Camera-relative movement direction from the held keys, length at most 1.
    pub(super) fn move_direction(f: &Frame) -> Vec3 {
        let forward = f.camera.flat_forward();
        let right = f.camera.flat_right();

        let mut dir = Vec3::ZERO;
        if f.held(Action::Forward) {
            dir += forward;
        }
        if f.held(Action::Back) {
            dir -= forward;
        }
        if f.held(Action::Right) {
            dir += right;
        }
        if f.held(Action::Left) {
            dir -= right;
        }
        if dir.length_squared() > 1.0 {
            dir = dir.normalize();
        }
        dir
    }

    /// Walking, falling and grounded jumps.
    ///
    /// Inside the lake basin the fast path is skipped outright; elsewhere it
    /// runs first and the fallback takes over whenever it declines.
    pub(super) fn default_mode(&mut self, world: &PhysicsWorld, f: &mut Frame) {
        let sneak = f.held(Action::Sneak);
        let sprint = f.held(Action::Sprint) && !sneak;
        let s = &self.state;
        let speed = if sneak {
            s.sneak_speed
        } else if sprint {
            s.sprint_speed
        } else {
            s.speed
        };

        let intent = MoveIntent {
            direction: Self::move_direction(f),
            speed,
            jump: f.held(Action::Jump) && s.is_grounded,
            sprint,
            sneak,
            gravity_multiplier: f.env.gravity_multiplier,
        };
        let body = Kinematics {
            position: s.position,
            velocity: s.velocity,
            grounded: s.is_grounded,
        };

        let in_basin = world.terrain.zones().in_basin(body.position.x, body.position.z);
        let fast = if in_basin {
            None
        } else {
            self.fast.try_step(f.dt, &body, &intent, &world.terrain)
        };
        f.report.used_fast_path = fast.is_some();

        let engine = if f.report.used_fast_path {
            self.fast.name()
        } else {
            self.fallback.name()
        };
        let step = fast
            .or_else(|| self.fallback.try_step(f.dt, &body, &intent, &world.terrain))
            .unwrap_or(EngineStep {
                position: body.position,
                velocity: body.velocity,
                grounded: body.grounded,
                jumped: false,
                impact_velocity: 0.0,
            });
        trace!("{engine} step: {:?} -> {:?}", body.position, step.position);

        let was_grounded = self.state.is_grounded;
        self.state.position = step.position;
        self.state.velocity = step.velocity;
        self.state.is_grounded = step.grounded;

        if step.jumped {
            f.consume_jump();
            f.report.push(PhysicsEvent::Jump { air: false });
        }

        if !was_grounded && step.grounded {
            // The fast path only reports hard landings.
            let cfg = &self.config.movement;
            if !f.report.used_fast_path || step.impact_velocity < cfg.landing_impact_speed {
                f.report.push(PhysicsEvent::Land {
                    impact: step.impact_velocity,
                });
            }
        }

        if !step.grounded {
            self.state.velocity += f.env.wind * self.config.movement.wind_response * f.dt;
        }
    }
}
