use glam::{Vec2, Vec3};
use log::{debug, info};

use crate::config::MovementConfig;
use crate::terrain::Terrain;
use crate::world::EngineCollider;

use super::{EngineStep, Kinematics, MoveIntent, MovementEngine};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Return codes of [`CompiledEngine::update`].
pub const AIRBORNE: i32 = 0;
pub const GROUNDED: i32 = 1;
pub const FAILED: i32 = -1;

/// A sprinting jump leaves the ground slightly faster.
const SPRINT_JUMP_BOOST: f32 = 1.1;
/// Push-out passes against overlapping stems per update.
const PUSH_ITERATIONS: usize = 4;
/// Stems stop blocking this far below the cap top (the cap's thickness).
const CAP_CLEARANCE: f32 = 0.6;

// ---------------------------------------------------------------------------
// Compiled engine
// ---------------------------------------------------------------------------

/// The compiled character engine, exposed through a flat call surface:
/// a state slot written before [`update`](Self::update) and read after it,
/// and a tri-state return code.
///
/// It only knows raw terrain height and the uploaded stem cylinders. The
/// carved lake basin is invisible to it, which is why the controller never
/// routes basin frames here.
pub struct CompiledEngine {
    config: MovementConfig,
    position: Vec3,
    velocity: Vec3,
    grounded: bool,
    colliders: Vec<EngineCollider>,
    ready: bool,
    jump_applied: bool,
    impact_velocity: f32,
}

impl CompiledEngine {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            grounded: false,
            colliders: Vec::new(),
            ready: false,
            jump_applied: false,
            impact_velocity: 0.0,
        }
    }

    /// Replace the static collider set. The engine refuses to run until this
    /// has been called once, even with an empty list.
    pub fn upload_obstacles(&mut self, colliders: Vec<EngineCollider>) {
        info!("fast path: uploaded {} stem colliders", colliders.len());
        self.colliders = colliders;
        self.ready = true;
    }

    pub fn set_state(&mut self, position: Vec3, velocity: Vec3, grounded: bool) {
        self.position = position;
        self.velocity = velocity;
        self.grounded = grounded;
    }

    pub fn state(&self) -> (Vec3, Vec3) {
        (self.position, self.velocity)
    }

    pub fn last_jump_applied(&self) -> bool {
        self.jump_applied
    }

    pub fn last_impact_velocity(&self) -> f32 {
        self.impact_velocity
    }

    /// Advance the slot by `dt`. Returns [`GROUNDED`], [`AIRBORNE`], or
    /// [`FAILED`] when the engine is not ready or the inputs are unusable;
    /// on failure the slot is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        terrain: &Terrain,
        dt: f32,
        move_x: f32,
        move_z: f32,
        move_speed: f32,
        jump: bool,
        sprint: bool,
        sneak: bool,
        gravity_multiplier: f32,
    ) -> i32 {
        self.jump_applied = false;
        if !self.ready {
            return FAILED;
        }
        let inputs_ok = dt >= 0.0
            && [dt, move_x, move_z, move_speed, gravity_multiplier].iter().all(|v| v.is_finite())
            && self.position.is_finite()
            && self.velocity.is_finite();
        if !inputs_ok {
            return FAILED;
        }

        let cfg = &self.config;
        let mut pos = self.position;
        let mut vel = self.velocity;

        let blend = (cfg.smoothing_rate * dt).min(1.0);
        let target = Vec2::new(move_x, move_z) * move_speed;
        vel.x += (target.x - vel.x) * blend;
        vel.z += (target.y - vel.z) * blend;

        let jumped = jump && self.grounded;
        if jumped {
            vel.y = if sprint {
                cfg.jump_speed * SPRINT_JUMP_BOOST
            } else {
                cfg.jump_speed
            };
        } else {
            vel.y -= cfg.gravity * gravity_multiplier * dt;
        }

        let mut next = pos + vel * dt;

        // Sneaking never walks off a ledge.
        if sneak && self.grounded && !jumped {
            let here = terrain.raw_height(pos.x, pos.z);
            let there = terrain.raw_height(next.x, next.z);
            if here - there > cfg.step_down {
                next.x = pos.x;
                next.z = pos.z;
                vel.x = 0.0;
                vel.z = 0.0;
            }
        }
        pos = next;

        self.push_out_of_stems(&mut pos, &mut vel);

        let ground = terrain.raw_height(pos.x, pos.z) + cfg.player_height;
        let impact = vel.y;
        let falling = vel.y <= 0.0;
        let grounded = (falling && pos.y <= ground)
            || (self.grounded && !jumped && falling && pos.y - ground <= cfg.step_down);
        if grounded {
            pos.y = ground;
            vel.y = 0.0;
        }

        self.position = pos;
        self.velocity = vel;
        self.grounded = grounded;
        self.jump_applied = jumped;
        self.impact_velocity = impact;

        if grounded {
            GROUNDED
        } else {
            AIRBORNE
        }
    }

    /// Resolve horizontal overlap with stem cylinders the body is level with.
    fn push_out_of_stems(&self, pos: &mut Vec3, vel: &mut Vec3) {
        let radius = self.config.player_radius;
        let feet = pos.y - self.config.player_height;
        for _ in 0..PUSH_ITERATIONS {
            let mut pushed = false;
            for c in &self.colliders {
                if pos.y < c.base.y || feet > c.base.y + c.height - CAP_CLEARANCE {
                    continue;
                }
                let d = Vec2::new(pos.x - c.base.x, pos.z - c.base.z);
                let dist = d.length().max(0.001);
                let overlap = (radius + c.radius) - dist;
                if overlap > 0.0 {
                    let n = d / dist;
                    pos.x += n.x * overlap;
                    pos.z += n.y * overlap;
                    // Drop the velocity component driving into the stem.
                    let into = vel.x * n.x + vel.z * n.y;
                    if into < 0.0 {
                        vel.x -= n.x * into;
                        vel.z -= n.y * into;
                    }
                    pushed = true;
                }
            }
            if !pushed {
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MovementEngine adapter
// ---------------------------------------------------------------------------

/// [`CompiledEngine`] behind the [`MovementEngine`] seam. Counts every call
/// so routing can be observed from tests and the driver.
pub struct FastPathEngine {
    engine: CompiledEngine,
    calls: usize,
}

impl FastPathEngine {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            engine: CompiledEngine::new(config),
            calls: 0,
        }
    }

    pub fn upload_obstacles(&mut self, colliders: Vec<EngineCollider>) {
        self.engine.upload_obstacles(colliders);
    }

    /// Number of `try_step` calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl MovementEngine for FastPathEngine {
    fn name(&self) -> &'static str {
        "fast path"
    }

    fn try_step(&mut self, dt: f32, body: &Kinematics, intent: &MoveIntent, terrain: &Terrain) -> Option<EngineStep> {
        self.calls += 1;
        self.engine.set_state(body.position, body.velocity, body.grounded);
        let code = self.engine.update(
            terrain,
            dt,
            intent.direction.x,
            intent.direction.z,
            intent.speed,
            intent.jump,
            intent.sprint,
            intent.sneak,
            intent.gravity_multiplier,
        );
        if code < 0 {
            debug!(
                "{} declined at ({:.1}, {:.1})",
                self.name(),
                body.position.x,
                body.position.z
            );
            return None;
        }

        let (position, velocity) = self.engine.state();
        Some(EngineStep {
            position,
            velocity,
            grounded: code == GROUNDED,
            jumped: self.engine.last_jump_applied(),
            impact_velocity: self.engine.last_impact_velocity(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;
    use crate::terrain::{FlatGround, TerrainZones};

    fn flat() -> Terrain {
        Terrain::new(FlatGround(0.0), TerrainZones::from_config(&ZoneConfig::default()))
    }

    fn ready_engine(colliders: Vec<EngineCollider>) -> CompiledEngine {
        let mut engine = CompiledEngine::new(MovementConfig::default());
        engine.upload_obstacles(colliders);
        engine
    }

    #[test]
    fn refuses_to_run_before_upload() {
        let mut engine = CompiledEngine::new(MovementConfig::default());
        engine.set_state(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, false);
        let code = engine.update(&flat(), 1.0 / 60.0, 0.0, 0.0, 0.0, false, false, false, 1.0);
        assert_eq!(code, FAILED);
        assert_eq!(engine.state().0, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn nan_input_fails_without_touching_slot() {
        let mut engine = ready_engine(Vec::new());
        engine.set_state(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, false);
        let code = engine.update(&flat(), 1.0 / 60.0, f32::NAN, 0.0, 6.0, false, false, false, 1.0);
        assert_eq!(code, FAILED);
        assert_eq!(engine.state(), (Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO));
    }

    #[test]
    fn lands_on_raw_terrain() {
        let mut engine = ready_engine(Vec::new());
        engine.set_state(Vec3::new(0.0, 1.85, 0.0), Vec3::new(0.0, -5.0, 0.0), false);
        let code = engine.update(&flat(), 1.0 / 60.0, 0.0, 0.0, 0.0, false, false, false, 1.0);
        assert_eq!(code, GROUNDED);
        let (pos, vel) = engine.state();
        assert!((pos.y - 1.8).abs() < 1e-5);
        assert_eq!(vel.y, 0.0);
        assert!(engine.last_impact_velocity() < -5.0);
    }

    #[test]
    fn sprint_jump_is_slightly_higher() {
        let mut engine = ready_engine(Vec::new());
        engine.set_state(Vec3::new(0.0, 1.8, 0.0), Vec3::ZERO, true);
        let code = engine.update(&flat(), 1.0 / 60.0, 0.0, 0.0, 0.0, true, true, false, 1.0);
        assert_eq!(code, AIRBORNE);
        assert!(engine.last_jump_applied());
        assert!((engine.state().1.y - 8.0 * SPRINT_JUMP_BOOST).abs() < 1e-5);
    }

    #[test]
    fn stem_pushes_player_out() {
        let stem = EngineCollider {
            base: Vec3::ZERO,
            radius: 0.5,
            height: 3.0,
        };
        let mut engine = ready_engine(vec![stem]);
        // Walking +X straight into the stem.
        engine.set_state(Vec3::new(-1.0, 1.8, 0.0), Vec3::new(6.0, 0.0, 0.0), true);
        engine.update(&flat(), 0.1, 1.0, 0.0, 6.0, false, false, false, 1.0);
        let (pos, vel) = engine.state();
        let dist = Vec2::new(pos.x, pos.z).length();
        assert!(dist >= 0.9 - 1e-4);
        assert!(vel.x <= 1e-5);
    }

    #[test]
    fn adapter_counts_calls_and_maps_failure_to_none() {
        let mut fast = FastPathEngine::new(MovementConfig::default());
        let body = Kinematics {
            position: Vec3::new(0.0, 5.0, 0.0),
            velocity: Vec3::ZERO,
            grounded: false,
        };
        let intent = MoveIntent {
            direction: Vec3::ZERO,
            speed: 0.0,
            jump: false,
            sprint: false,
            sneak: false,
            gravity_multiplier: 1.0,
        };
        assert!(fast.try_step(1.0 / 60.0, &body, &intent, &flat()).is_none());
        fast.upload_obstacles(Vec::new());
        assert!(fast.try_step(1.0 / 60.0, &body, &intent, &flat()).is_some());
        assert_eq!(fast.calls(), 2);
    }
}
