use log::debug;

use crate::collab::Collaborators;
use crate::components::PlayerMode;
use crate::engine::input::Action;
use crate::events::PhysicsEvent;

use super::player::{Frame, PlayerController};

/// Phase distortion pulse: `BASE + AMPLITUDE * sin(RATE * t)`.
const DISTORTION_BASE: f32 = 0.8;
const DISTORTION_AMPLITUDE: f32 = 0.2;
const DISTORTION_RATE: f32 = 10.0;

impl PlayerController {
    /// Double jump, dash and phase shift. Timers run every frame; the
    /// abilities themselves only trigger in Default mode.
    pub(super) fn update_abilities(&mut self, f: &mut Frame, collab: &mut Collaborators) {
        let cfg = &self.config.abilities;
        let a = &mut self.state.abilities;

        a.dash_cooldown = (a.dash_cooldown - f.dt).max(0.0);
        if a.is_phasing {
            a.phase_timer -= f.dt;
            if a.phase_timer <= 0.0 {
                a.is_phasing = false;
                a.phase_timer = 0.0;
                f.report.push(PhysicsEvent::PhaseEnded);
            }
        }

        if self.state.mode.state == PlayerMode::Default {
            if self.state.is_grounded {
                a.refill_air_jumps();
            }

            if !self.state.is_grounded && a.air_jumps_left > 0 && self.edges.was_pressed(Action::Jump, f.input) {
                self.state.velocity.y = cfg.air_jump_speed;
                a.air_jumps_left -= 1;
                f.consume_jump();
                f.report.push(PhysicsEvent::Jump { air: true });
            }

            if a.dash_cooldown <= 0.0 && self.edges.was_pressed(Action::Dash, f.input) {
                let direction = f.camera.flat_forward();
                if !self.state.is_grounded {
                    self.state.velocity.y = 0.0;
                }
                self.state.velocity += direction * cfg.dash_impulse;
                a.dash_cooldown = cfg.dash_cooldown;
                f.report.push(PhysicsEvent::Dash { direction });
            }

            if !a.is_phasing && self.edges.was_pressed(Action::Phase, f.input) {
                match collab.inventory.consume(&cfg.phase_item) {
                    Ok(()) => {
                        a.is_phasing = true;
                        a.phase_timer = cfg.phase_duration;
                        f.report.push(PhysicsEvent::PhaseStarted);
                    }
                    Err(err) => {
                        debug!("phase shift denied: {err}");
                        collab.notifier.toast(&format!("Phase shift unavailable: {err}"));
                        f.report.push(PhysicsEvent::PhaseDenied);
                    }
                }
            }
        }

        a.distortion = if a.is_phasing {
            DISTORTION_BASE + DISTORTION_AMPLITUDE * (DISTORTION_RATE * self.clock).sin()
        } else {
            0.0
        };
    }
}
