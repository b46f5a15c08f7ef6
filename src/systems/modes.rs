use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::components::PlayerMode;
use crate::engine::input::Action;
use crate::events::PhysicsEvent;
use crate::math::smooth_damp;
use crate::vine::VineSwing;
use crate::world::PhysicsWorld;

use super::player::{Frame, PlayerController};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Swimmers stay this far above the lake bed.
const SWIM_FLOOR_CLEARANCE: f32 = 0.5;

const DANCE_DRIFT_RADIUS: f32 = 0.6;
/// Radians per second around the drift circle.
const DANCE_DRIFT_SPEED: f32 = 0.8;
const DANCE_BOB_HEIGHT: f32 = 0.15;
const DANCE_MAX_ROLL: f32 = 0.12;
const DANCE_ROLL_SMOOTHING: f32 = 0.15;

impl PlayerController {
    // -----------------------------------------------------------------------
    // Swimming
    // -----------------------------------------------------------------------

    pub(super) fn swim_mode(&mut self, world: &PhysicsWorld, f: &mut Frame) {
        let cfg = &self.config.swim;
        let dt = f.dt;
        let v = &mut self.state.velocity;

        v.y -= cfg.gravity * dt;
        // Clamped so a long stall cannot flip the velocity.
        *v *= (1.0 - cfg.drag * dt).max(0.0);

        let thrust = Self::move_direction(f).normalize_or_zero();
        *v += thrust * cfg.thrust_speed * dt;
        if f.held(Action::Jump) {
            v.y += cfg.thrust_speed * dt;
        }
        if f.held(Action::Sneak) {
            v.y -= cfg.thrust_speed * dt;
        }

        let pos = &mut self.state.position;
        *pos += *v * dt;

        let floor = world.terrain.height(pos.x, pos.z) + SWIM_FLOOR_CLEARANCE;
        if pos.y < floor {
            pos.y = floor;
            v.y = v.y.max(0.0);
        }
        self.state.is_grounded = false;
    }

    // -----------------------------------------------------------------------
    // Climbing
    // -----------------------------------------------------------------------

    /// Not implemented as a real mode: stop and hand back to Default.
    pub(super) fn climb_mode(&mut self, f: &mut Frame) {
        self.state.velocity = Vec3::ZERO;
        self.change_mode(PlayerMode::Default, f);
    }

    // -----------------------------------------------------------------------
    // Vine
    // -----------------------------------------------------------------------

    pub(super) fn vine_mode(&mut self, world: &PhysicsWorld, f: &mut Frame) {
        let Some(entity) = self.active_vine else {
            self.change_mode(PlayerMode::Default, f);
            return;
        };
        let Ok(mut vine) = world.obstacles.get::<&mut VineSwing>(entity) else {
            self.active_vine = None;
            self.change_mode(PlayerMode::Default, f);
            return;
        };

        if self.edges.was_pressed(Action::Jump, f.input) {
            let release = vine.detach(self.clock);
            self.state.velocity = release.velocity;
            self.last_detach = Some(release.timestamp);
            self.active_vine = None;
            f.consume_jump();
            f.report.push(PhysicsEvent::VineRelease { vine: entity });
            drop(vine);
            self.change_mode(PlayerMode::Default, f);
            return;
        }

        let before = self.state.position;
        vine.update(f.camera, f.dt, f.input, self.state.gravity);
        self.state.position = f.camera.position;
        // A zero-length frame keeps the last swing velocity.
        if f.dt > 0.0 {
            self.state.velocity = (self.state.position - before) / f.dt;
        }
        self.state.is_grounded = false;
    }

    // -----------------------------------------------------------------------
    // Dancing
    // -----------------------------------------------------------------------

    /// Circular drift around the start point with a beat-synced bob and roll.
    pub(super) fn dance_mode(&mut self, f: &mut Frame) {
        let PlayerMode::Dancing(dance) = &mut self.state.mode.state else {
            return;
        };
        dance.elapsed += f.dt;
        let t = dance.elapsed;
        let kick = f.audio.kick();

        let a0 = dance.heading;
        let a = a0 + t * DANCE_DRIFT_SPEED;
        let drift = Vec3::new(a.cos() - a0.cos(), 0.0, a.sin() - a0.sin()) * DANCE_DRIFT_RADIUS;
        let bob = (f.audio.phase() * PI).sin() * DANCE_BOB_HEIGHT * (1.0 + kick);

        let target_roll = (t * f.audio.beats_per_second() * TAU * 0.5).sin() * DANCE_MAX_ROLL * (0.5 + 0.5 * kick);
        f.camera.roll = smooth_damp(
            f.camera.roll,
            target_roll,
            &mut dance.roll_velocity,
            DANCE_ROLL_SMOOTHING,
            f.dt,
        );

        self.state.position = dance.origin + drift + Vec3::Y * bob;
        self.state.velocity = Vec3::ZERO;
    }
}
