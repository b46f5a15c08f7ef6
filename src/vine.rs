//! Vine swing: a planar pendulum the player can hang from.
//!
//! The controller owns which vine is active; the vine itself only knows
//! whether something is hanging from it and how it is swinging.

use glam::Vec3;

use crate::camera::CameraPose;
use crate::engine::input::{Action, InputState};

const MAX_SWING_ANGLE: f32 = 1.3;
const SWING_DAMPING: f32 = 0.15;
/// Tangential acceleration from pumping forward/back (units/s²).
const PUMP_ACCEL: f32 = 6.0;
const RELEASE_KICK: f32 = 4.0;

/// Handed back by [`VineSwing::detach`].
#[derive(Clone, Copy, Debug)]
pub struct VineRelease {
    /// Controller clock at the moment of release; used to debounce regrabs.
    pub timestamp: f32,
    /// Velocity the player leaves the vine with.
    pub velocity: Vec3,
}

#[derive(Clone, Debug)]
pub struct VineSwing {
    pub anchor: Vec3,
    pub length: f32,
    angle: f32,
    angular_velocity: f32,
    /// Horizontal unit vector of the swing plane.
    swing_dir: Vec3,
    attached: bool,
}

impl VineSwing {
    pub fn new(anchor: Vec3, length: f32) -> Self {
        Self {
            anchor,
            length,
            angle: 0.0,
            angular_velocity: 0.0,
            swing_dir: Vec3::X,
            attached: false,
        }
    }

    pub fn tip(&self) -> Vec3 {
        self.anchor - Vec3::Y * self.length
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Grab the vine from `position` while moving at `velocity`.
    /// The swing plane follows the player's horizontal motion.
    pub fn attach(&mut self, position: Vec3, velocity: Vec3) {
        let offset = position - self.anchor;
        let horizontal_offset = Vec3::new(offset.x, 0.0, offset.z);
        let horizontal_velocity = Vec3::new(velocity.x, 0.0, velocity.z);

        self.swing_dir = horizontal_velocity
            .try_normalize()
            .or_else(|| horizontal_offset.try_normalize())
            .unwrap_or(Vec3::X);

        let drop = (self.anchor.y - position.y).max(0.1);
        self.angle = horizontal_offset
            .dot(self.swing_dir)
            .atan2(drop)
            .clamp(-MAX_SWING_ANGLE, MAX_SWING_ANGLE);
        self.angular_velocity = horizontal_velocity.dot(self.swing_dir) / self.length;
        self.attached = true;
    }

    /// Advance the pendulum and move the camera to the hang point.
    pub fn update(&mut self, camera: &mut CameraPose, dt: f32, input: &InputState, gravity: f32) {
        if !self.attached {
            return;
        }

        let pump = match (input.is_key_held(Action::Forward), input.is_key_held(Action::Back)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        // Pump along the camera heading, projected into the swing plane.
        let pump = pump * camera.flat_forward().dot(self.swing_dir).signum();

        let accel = -(gravity / self.length) * self.angle.sin() + pump * PUMP_ACCEL / self.length;
        self.angular_velocity += accel * dt;
        self.angular_velocity *= (1.0 - SWING_DAMPING * dt).max(0.0);
        self.angle += self.angular_velocity * dt;

        if self.angle.abs() > MAX_SWING_ANGLE {
            self.angle = self.angle.clamp(-MAX_SWING_ANGLE, MAX_SWING_ANGLE);
            self.angular_velocity = 0.0;
        }

        camera.position = self.hang_point();
    }

    /// Where the player hangs at the current angle.
    pub fn hang_point(&self) -> Vec3 {
        self.anchor + self.swing_dir * (self.angle.sin() * self.length)
            - Vec3::Y * (self.angle.cos() * self.length)
    }

    /// Let go. Returns the release timestamp and the carried velocity.
    pub fn detach(&mut self, now: f32) -> VineRelease {
        let tangent = self.swing_dir * self.angle.cos() + Vec3::Y * self.angle.sin();
        let velocity = tangent * (self.angular_velocity * self.length) + Vec3::Y * RELEASE_KICK;
        self.attached = false;
        self.angular_velocity = 0.0;
        VineRelease {
            timestamp: now,
            velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_below_anchor_hangs_straight() {
        let mut vine = VineSwing::new(Vec3::new(0.0, 10.0, 0.0), 4.0);
        vine.attach(Vec3::new(0.0, 6.0, 0.0), Vec3::ZERO);
        assert!(vine.is_attached());
        assert!(vine.angle().abs() < 1e-6);
        assert!((vine.hang_point() - vine.tip()).length() < 1e-5);
    }

    #[test]
    fn displaced_pendulum_swings_back_through_bottom() {
        let mut vine = VineSwing::new(Vec3::new(0.0, 10.0, 0.0), 4.0);
        vine.attach(Vec3::new(2.0, 7.0, 0.0), Vec3::ZERO);
        let start = vine.angle();
        assert!(start > 0.0);

        let mut cam = CameraPose::default();
        let idle = InputState::new();
        let mut crossed = false;
        for _ in 0..120 {
            vine.update(&mut cam, 1.0 / 60.0, &idle, 20.0);
            if vine.angle() < 0.0 {
                crossed = true;
                break;
            }
        }
        assert!(crossed);
        // Camera follows the hang point, always `length` from the anchor.
        assert!(((cam.position - vine.anchor).length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn detach_carries_swing_speed_and_kick() {
        let mut vine = VineSwing::new(Vec3::new(0.0, 10.0, 0.0), 4.0);
        vine.attach(Vec3::new(0.0, 6.0, 0.0), Vec3::new(8.0, 0.0, 0.0));
        let release = vine.detach(3.5);
        assert!(!vine.is_attached());
        assert_eq!(release.timestamp, 3.5);
        assert!(release.velocity.x > 7.0);
        assert!(release.velocity.y >= RELEASE_KICK - 1e-4);
    }
}
