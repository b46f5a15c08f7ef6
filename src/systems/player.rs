use std::sync::Arc;

use glam::Vec3;
use hecs::Entity;
use log::{debug, warn};

use crate::audio::{AudioSnapshot, EnvironmentModifiers};
use crate::camera::CameraPose;
use crate::collab::Collaborators;
use crate::components::{Cave, DanceState, PlayerMode, PlayerState};
use crate::config::PhysicsConfig;
use crate::engine::input::{Action, InputEdges, InputState};
use crate::events::StepReport;
use crate::physics::{FallbackIntegrator, FastPathEngine};
use crate::world::PhysicsWorld;

// ---------------------------------------------------------------------------
// Per-frame context
// ---------------------------------------------------------------------------

/// Borrowed inputs and accumulated output of one [`PlayerController::step`].
pub(super) struct Frame<'a> {
    pub dt: f32,
    pub camera: &'a mut CameraPose,
    pub input: &'a mut InputState,
    pub audio: &'a AudioSnapshot,
    pub env: EnvironmentModifiers,
    pub report: StepReport,
    /// Jump was released by a handler this frame; keep it from re-firing while held.
    pub jump_consumed: bool,
}

impl Frame<'_> {
    pub fn held(&self, action: Action) -> bool {
        self.input.is_key_held(action)
    }

    pub fn consume_jump(&mut self) {
        self.input.release(Action::Jump);
        self.jump_consumed = true;
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The player movement state machine.
///
/// Owns the player's kinematic record, both movement engines and the
/// edge-detection state. Everything else (obstacles, terrain, collaborators)
/// is passed into [`step`](Self::step).
pub struct PlayerController {
    pub(super) state: PlayerState,
    pub(super) edges: InputEdges,
    pub(super) fast: FastPathEngine,
    pub(super) fallback: FallbackIntegrator,
    pub(super) config: Arc<PhysicsConfig>,
    /// Seconds simulated so far.
    pub(super) clock: f32,
    pub(super) active_vine: Option<Entity>,
    pub(super) last_detach: Option<f32>,
    /// Solid surface (cap, cloud, pad) stood on last frame.
    pub(super) platform: Option<Entity>,
    /// Geyser plume ridden last frame.
    pub(super) geyser: Option<Entity>,
    pub(super) candidates: Vec<Entity>,
}

impl PlayerController {
    pub fn new(config: Arc<PhysicsConfig>, spawn: Vec3) -> Self {
        Self {
            state: PlayerState::new(spawn, &config.movement, &config.abilities),
            edges: InputEdges::new(),
            fast: FastPathEngine::new(config.movement.clone()),
            fallback: FallbackIntegrator::new(config.movement.clone()),
            config,
            clock: 0.0,
            active_vine: None,
            last_detach: None,
            platform: None,
            geyser: None,
            candidates: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    pub fn active_vine(&self) -> Option<Entity> {
        self.active_vine
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn fast_path_calls(&self) -> usize {
        self.fast.calls()
    }

    /// Hand the world's stem colliders to the fast path. Until this is called
    /// the fast path declines every frame and the fallback runs everywhere.
    pub fn upload_obstacles(&mut self, world: &PhysicsWorld) {
        self.fast.upload_obstacles(world.engine_colliders());
    }

    /// Switch mode outside the normal transition rules (debug tools, scripted
    /// sequences). Resets abilities like any other mode change.
    pub fn force_mode(&mut self, mode: PlayerMode) -> bool {
        self.enter(mode)
    }

    /// Advance the player by `dt` seconds.
    pub fn step(
        &mut self,
        world: &mut PhysicsWorld,
        dt: f32,
        camera: &mut CameraPose,
        input: &mut InputState,
        audio: &AudioSnapshot,
        collab: &mut Collaborators,
    ) -> StepReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.scrub_velocity();

        let env = audio.modifiers();
        self.state.gravity = self.config.movement.gravity * env.gravity_multiplier;

        let mut frame = Frame {
            dt,
            camera,
            input,
            audio,
            env,
            report: StepReport::default(),
            jump_consumed: false,
        };

        self.update_mode(world, &mut frame);

        match self.state.mode.state {
            PlayerMode::Default => self.default_mode(world, &mut frame),
            PlayerMode::Swimming => self.swim_mode(world, &mut frame),
            PlayerMode::Climbing => self.climb_mode(&mut frame),
            PlayerMode::Vine => self.vine_mode(world, &mut frame),
            PlayerMode::Dancing(_) => self.dance_mode(&mut frame),
        }

        self.update_abilities(&mut frame, collab);
        self.resolve_collisions(world, &mut frame);

        let water = self.water_level(world);
        self.state.is_underwater = water.is_some_and(|w| self.state.position.y < w);

        self.edges.latch(frame.input);
        if frame.jump_consumed {
            self.edges.mark_held(Action::Jump);
        }
        self.clock += dt;
        self.state.mode.tick(dt);

        frame.report
    }

    fn scrub_velocity(&mut self) {
        let v = &mut self.state.velocity;
        if !v.is_finite() {
            warn!("non-finite player velocity {v:?}, zeroing bad components");
            for c in [&mut v.x, &mut v.y, &mut v.z] {
                if !c.is_finite() {
                    *c = 0.0;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Dance toggle, then water, then vine. Entering `Dancing` ends the check.
    fn update_mode(&mut self, world: &PhysicsWorld, f: &mut Frame) {
        if self.edges.was_pressed(Action::Dance, f.input) {
            if matches!(self.state.mode.state, PlayerMode::Dancing(_)) {
                self.change_mode(PlayerMode::Default, f);
            } else {
                let dance = DanceState::new(self.state.position, f.camera.heading());
                self.change_mode(PlayerMode::Dancing(dance), f);
                return;
            }
        }

        // A held vine outranks the water, so skip the water test while swinging.
        if self.active_vine.is_none() {
            let water = self.water_level(world);
            let submerged = water.is_some_and(|w| self.state.position.y < w);
            let swimming = self.state.is_swimming();

            if submerged && !swimming {
                self.change_mode(PlayerMode::Swimming, f);
                self.state.velocity *= self.config.swim.entry_damping;
                self.state.is_grounded = false;
                f.report.push(crate::events::PhysicsEvent::Splash);
            } else if !submerged && swimming {
                self.change_mode(PlayerMode::Default, f);
                if f.held(Action::Jump) {
                    self.state.velocity.y = self.config.swim.exit_boost;
                    f.consume_jump();
                }
            }
        }

        if self.active_vine.is_some() {
            self.change_mode(PlayerMode::Vine, f);
        } else if self.state.mode.state == PlayerMode::Vine {
            self.change_mode(PlayerMode::Default, f);
        }
    }

    /// Highest water surface over the player: flooded cave gates nearby,
    /// and the lake when over open basin water.
    pub(super) fn water_level(&mut self, world: &PhysicsWorld) -> Option<f32> {
        let zones = &self.config.zones;
        let pos = self.state.position;
        let mut level = world.terrain.lake_level(pos.x, pos.z);

        world.candidates_into::<Cave>(pos, zones.gate_capture_radius, &mut self.candidates);
        for &e in &self.candidates {
            let Some((transform, cave)) = world.obstacle::<Cave>(e) else {
                continue;
            };
            if !cave.is_blocked {
                continue;
            }
            let gate = transform.transform_point(cave.gate_position);
            let dx = pos.x - gate.x;
            let dz = pos.z - gate.z;
            if dx * dx + dz * dz < zones.gate_capture_radius * zones.gate_capture_radius {
                let surface = gate.y + zones.gate_water_height;
                level = Some(level.map_or(surface, |l| l.max(surface)));
            }
        }
        level
    }

    /// Mode change with the per-frame side effects: pending ability edges are
    /// dropped when entering `Vine` or `Dancing`, and leaving `Dancing`
    /// levels the camera.
    pub(super) fn change_mode(&mut self, next: PlayerMode, f: &mut Frame) -> bool {
        if !self.enter(next) {
            return false;
        }
        if matches!(self.state.mode.previous, PlayerMode::Dancing(_)) {
            f.camera.roll = 0.0;
        }
        if matches!(self.state.mode.state, PlayerMode::Vine | PlayerMode::Dancing(_)) {
            self.edges.suppress(f.input);
        }
        true
    }

    fn enter(&mut self, next: PlayerMode) -> bool {
        let from = self.state.mode.state.label();
        if !self.state.mode.go(next) {
            return false;
        }
        debug!("mode: {from} -> {}", self.state.mode.state.label());
        self.state.abilities.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{Stockpile, ToastLog};
    use crate::components::{LocalTransform, Mushroom};
    use crate::events::PhysicsEvent;
    use crate::scene::prefabs::{register_cave, spawn_mushroom, spawn_vine, CaveDef, MushroomDef, VineDef};
    use crate::scene::test_scene::flat_world;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        world: PhysicsWorld,
        ctl: PlayerController,
        camera: CameraPose,
        audio: AudioSnapshot,
        stock: Stockpile,
        toasts: ToastLog,
    }

    impl Rig {
        /// Flat ground at y = 0, default zones, fast path ready.
        fn new(spawn: Vec3) -> Self {
            Self::with_world(flat_world(Arc::new(PhysicsConfig::default())), spawn)
        }

        fn with_world(mut world: PhysicsWorld, spawn: Vec3) -> Self {
            if !world.is_indexed() {
                world.build_spatial_index().unwrap();
            }
            let mut ctl = PlayerController::new(Arc::clone(world.config()), spawn);
            ctl.upload_obstacles(&world);
            Self {
                world,
                ctl,
                // Facing +Z.
                camera: CameraPose::new(spawn, Vec3::Z),
                audio: AudioSnapshot::default(),
                stock: Stockpile::new(),
                toasts: ToastLog::default(),
            }
        }

        fn step(&mut self, dt: f32, input: &mut InputState) -> StepReport {
            let mut collab = Collaborators {
                inventory: &mut self.stock,
                notifier: &mut self.toasts,
            };
            self.ctl
                .step(&mut self.world, dt, &mut self.camera, input, &self.audio, &mut collab)
        }

        fn settle(&mut self) {
            let mut idle = InputState::new();
            for _ in 0..240 {
                self.step(DT, &mut idle);
            }
            assert!(self.ctl.state().is_grounded);
        }
    }

    /// Flat world with a vine hanging from (0, 12, 0), and a player falling
    /// sideways through its capture zone.
    fn vine_rig() -> (Rig, Entity) {
        let mut world = flat_world(Arc::new(PhysicsConfig::default()));
        let vine = spawn_vine(
            &mut world,
            VineDef {
                anchor: Vec3::new(0.0, 12.0, 0.0),
                length: Some(4.0),
            },
        )
        .unwrap();
        let mut rig = Rig::with_world(world, Vec3::new(0.3, 9.0, 0.0));
        rig.ctl.state_mut().velocity = Vec3::new(3.0, -1.0, 0.0);
        rig.camera = CameraPose::new(rig.ctl.state().position, Vec3::X);
        (rig, vine)
    }

    /// Flat world with one blocked cave whose gate sits at `gate` in world space.
    fn gate_world(gate: Vec3) -> PhysicsWorld {
        let mut world = flat_world(Arc::new(PhysicsConfig::default()));
        register_cave(
            &mut world,
            CaveDef {
                transform: LocalTransform::new(gate),
                gate_position: Vec3::ZERO,
                is_blocked: true,
            },
        )
        .unwrap();
        world
    }

    #[test]
    fn zero_dt_idle_step_changes_nothing() {
        let mut rig = Rig::new(Vec3::new(0.0, 10.0, 0.0));
        rig.settle();
        let before = rig.ctl.state().clone();
        rig.step(0.0, &mut InputState::new());
        let after = rig.ctl.state();
        assert_eq!(after.position, before.position);
        assert_eq!(after.velocity, before.velocity);
        assert_eq!(after.mode.state, before.mode.state);

        // Also mid-air.
        let mut rig = Rig::new(Vec3::new(0.0, 10.0, 0.0));
        rig.ctl.state_mut().velocity = Vec3::new(1.0, -2.0, 0.5);
        let before = rig.ctl.state().clone();
        rig.step(0.0, &mut InputState::new());
        assert_eq!(rig.ctl.state().position, before.position);
        assert_eq!(rig.ctl.state().velocity, before.velocity);

        // Hanging from a vine mid-swing.
        let (mut rig, _) = vine_rig();
        let mut idle = InputState::new();
        for _ in 0..11 {
            rig.step(DT, &mut idle);
        }
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Vine);
        let before = rig.ctl.state().clone();
        assert_ne!(before.velocity, Vec3::ZERO);
        rig.step(0.0, &mut idle);
        assert_eq!(rig.ctl.state().position, before.position);
        assert_eq!(rig.ctl.state().velocity, before.velocity);
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Vine);

        // Walking into a flooded gate whose water is well below the player.
        let mut rig = Rig::with_world(gate_world(Vec3::new(100.0, -5.0, 0.0)), Vec3::new(101.0, 1.8, 0.0));
        rig.ctl.state_mut().is_grounded = true;
        rig.ctl.state_mut().velocity = Vec3::new(-4.0, 0.0, 0.0);
        let before = rig.ctl.state().clone();
        let report = rig.step(0.0, &mut idle);
        assert!(report.contains(|e| matches!(e, PhysicsEvent::WaterGatePush { .. })));
        assert_eq!(rig.ctl.state().position, before.position);
        assert_eq!(rig.ctl.state().velocity, before.velocity);
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Default);
    }

    #[test]
    fn grounded_position_sits_on_the_surface() {
        // Outside the basin (fast path) and on the island (fallback), walking
        // away from the basin rim with a jump every 50 frames.
        for spawn in [Vec3::new(0.0, 6.0, 0.0), Vec3::new(0.0, 8.0, 55.0)] {
            let mut rig = Rig::new(spawn);
            let mut input = InputState::with(&[Action::Back]);
            for i in 0..300 {
                if i % 50 == 0 {
                    input.press(Action::Jump);
                }
                rig.step(DT, &mut input);
                let s = rig.ctl.state();
                if s.is_grounded {
                    let ground = rig.world.terrain.height(s.position.x, s.position.z);
                    assert!((s.position.y - (ground + 1.8)).abs() < 1e-4, "frame {i}: {:?}", s.position);
                }
            }
        }
    }

    #[test]
    fn basin_frames_never_touch_the_fast_path() {
        // Island inside the basin.
        let mut rig = Rig::new(Vec3::new(0.0, 8.0, 55.0));
        let mut input = InputState::with(&[Action::Left]);
        let mut idle = InputState::new();
        for i in 0..120 {
            let report = if i < 30 { rig.step(DT, &mut input) } else { rig.step(DT, &mut idle) };
            assert!(!report.used_fast_path);
        }
        assert_eq!(rig.ctl.fast_path_calls(), 0);
        assert!(rig.ctl.state().is_grounded);
        assert!((rig.ctl.state().position.y - 4.8).abs() < 1e-3);

        // Same walk outside the basin uses it.
        let mut rig = Rig::new(Vec3::new(0.0, 8.0, 0.0));
        for _ in 0..10 {
            rig.step(DT, &mut input);
        }
        assert_eq!(rig.ctl.fast_path_calls(), 10);
    }

    #[test]
    fn fast_path_failure_falls_back() {
        let mut world = flat_world(Arc::new(PhysicsConfig::default()));
        world.build_spatial_index().unwrap();
        let config = Arc::clone(world.config());
        // Never uploaded: the compiled engine declines every call.
        let mut ctl = PlayerController::new(config, Vec3::new(0.0, 1.82, 0.0));
        ctl.state_mut().velocity.y = -3.0;
        let mut cam = CameraPose::default();
        let mut stock = Stockpile::new();
        let mut toasts = ToastLog::default();
        let mut collab = Collaborators {
            inventory: &mut stock,
            notifier: &mut toasts,
        };
        let report = ctl.step(
            &mut world,
            DT,
            &mut cam,
            &mut InputState::new(),
            &AudioSnapshot::default(),
            &mut collab,
        );
        assert!(!report.used_fast_path);
        assert_eq!(ctl.fast_path_calls(), 1);
        assert!(ctl.state().is_grounded);
        assert!(report.contains(|e| matches!(e, PhysicsEvent::Land { .. })));
    }

    #[test]
    fn falling_into_the_lake_starts_swimming_and_damps() {
        let mut rig = Rig::new(Vec3::new(-20.0, 2.0, 50.0));
        rig.ctl.state_mut().velocity = Vec3::new(1.0, -3.0, 0.0);
        let mut idle = InputState::new();
        let mut entered = false;
        for _ in 0..60 {
            let before = rig.ctl.state().velocity.length();
            let report = rig.step(DT, &mut idle);
            if rig.ctl.state().is_swimming() {
                assert!(rig.ctl.state().velocity.length() < before);
                assert!(report.contains(|e| *e == PhysicsEvent::Splash));
                assert!(rig.ctl.state().is_underwater);
                entered = true;
                break;
            }
        }
        assert!(entered);
    }

    #[test]
    fn surfacing_with_jump_gets_exit_boost() {
        let mut rig = Rig::new(Vec3::new(-20.0, 1.0, 50.0));
        let mut idle = InputState::new();
        rig.step(DT, &mut idle);
        assert!(rig.ctl.state().is_swimming());

        rig.ctl.state_mut().position.y = 1.6;
        let mut jump = InputState::with(&[Action::Jump]);
        rig.step(DT, &mut jump);
        let s = rig.ctl.state();
        assert_eq!(s.mode.state, PlayerMode::Default);
        assert!(s.velocity.y > 7.0);
        assert!(!jump.is_key_held(Action::Jump));
    }

    #[test]
    fn island_rim_under_the_surface_is_lake() {
        // Inside the island radius, but the rim ground is near the lake bed.
        let mut rig = Rig::new(Vec3::new(0.0, 3.0, 62.5));
        let mut idle = InputState::new();
        for _ in 0..240 {
            rig.step(DT, &mut idle);
        }
        let s = rig.ctl.state();
        assert!(s.is_swimming());
        assert!(s.is_underwater);
        assert!(s.position.y < 1.5);
    }

    #[test]
    fn flooded_gate_floods_and_lets_swimmers_through() {
        // Gate water surface at y = 3, above a walker standing at 1.8.
        let mut rig = Rig::with_world(gate_world(Vec3::new(100.0, 2.0, 0.0)), Vec3::new(101.0, 1.8, 0.0));
        rig.ctl.state_mut().is_grounded = true;
        let mut idle = InputState::new();

        let report = rig.step(DT, &mut idle);
        assert!(rig.ctl.state().is_swimming());
        assert!(rig.ctl.state().is_underwater);
        assert!(report.contains(|e| *e == PhysicsEvent::Splash));

        // Inside the gate radius, but swimming: no push back.
        for _ in 0..30 {
            let report = rig.step(DT, &mut idle);
            assert!(!report.contains(|e| matches!(e, PhysicsEvent::WaterGatePush { .. })));
        }
        let s = rig.ctl.state();
        assert!(s.is_swimming());
        assert_eq!(s.position.x, 101.0);
        assert_eq!(s.position.z, 0.0);
    }

    #[test]
    fn held_vine_outranks_the_lake() {
        let mut world = flat_world(Arc::new(PhysicsConfig::default()));
        // Open lake water over a flat bed at -4; the vine tip dips under the surface.
        let vine = spawn_vine(
            &mut world,
            VineDef {
                anchor: Vec3::new(-20.0, 4.0, 50.0),
                length: Some(4.0),
            },
        )
        .unwrap();
        let mut rig = Rig::with_world(world, Vec3::new(-20.3, 1.0, 50.0));
        let mut idle = InputState::new();

        let report = rig.step(DT, &mut idle);
        assert!(report.contains(|e| *e == PhysicsEvent::Splash));
        assert!(report.contains(|e| *e == PhysicsEvent::VineGrab { vine }));

        for _ in 0..60 {
            rig.step(DT, &mut idle);
            let s = rig.ctl.state();
            assert_eq!(s.mode.state, PlayerMode::Vine);
            assert_eq!(rig.ctl.active_vine(), Some(vine));
        }
        // Hanging below the lake surface without swimming.
        assert!(rig.ctl.state().position.y < 1.5);
    }

    #[test]
    fn entering_vine_swallows_ability_edges() {
        let (mut rig, vine) = vine_rig();
        let mut idle = InputState::new();
        let report = rig.step(DT, &mut idle);
        assert!(report.contains(|e| *e == PhysicsEvent::VineGrab { vine }));

        // Jump and Dash pressed on the frame the mode switches to Vine.
        let mut input = InputState::with(&[Action::Jump, Action::Dash]);
        let report = rig.step(DT, &mut input);
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Vine);
        assert!(report.events.is_empty());
        assert_eq!(rig.ctl.active_vine(), Some(vine));
        assert_eq!(rig.ctl.state().abilities.dash_cooldown, 0.0);

        // Still held: nothing fires.
        let report = rig.step(DT, &mut input);
        assert!(report.events.is_empty());
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Vine);

        // A fresh Jump releases; the Dash held since entry still does not fire.
        input.release(Action::Jump);
        rig.step(DT, &mut input);
        input.press(Action::Jump);
        let report = rig.step(DT, &mut input);
        assert!(report.contains(|e| *e == PhysicsEvent::VineRelease { vine }));
        assert!(!report.contains(|e| matches!(e, PhysicsEvent::Dash { .. })));
        assert!(!report.contains(|e| *e == PhysicsEvent::Jump { air: true }));
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Default);
    }

    #[test]
    fn trampoline_bounces_a_falling_player() {
        let mut world = flat_world(Arc::new(PhysicsConfig::default()));
        let base = Vec3::new(5.0, 0.0, 5.0);
        let shroom = spawn_mushroom(
            &mut world,
            MushroomDef {
                position: base,
                cap_radius: Some(1.5),
                cap_height: Some(2.0),
                stem_radius: Some(0.3),
                bounce_force: Some(15.0),
                trampoline: true,
            },
        )
        .unwrap();
        let mut rig = Rig::with_world(world, Vec3::new(5.0, 2.1 + 1.8, 5.0));
        rig.ctl.state_mut().velocity = Vec3::new(0.0, -5.0, 0.0);
        rig.audio.kick_trigger = 0.5;

        // Jump held since before this frame: not a fresh air-jump edge.
        let mut input = InputState::with(&[Action::Jump]);
        rig.ctl.edges.latch(&input);

        let report = rig.step(DT, &mut input);
        assert!(rig.ctl.state().velocity.y > 0.0);
        assert!((rig.ctl.state().velocity.y - 17.5).abs() < 1e-4);
        assert!(!input.is_key_held(Action::Jump));
        assert!(report.contains(|e| matches!(e, PhysicsEvent::TrampolineBounce { .. })));
        let m = *rig.world.obstacles.get::<&Mushroom>(shroom).unwrap();
        assert_eq!(m.squash, 1.0);
    }

    #[test]
    fn solid_cap_is_a_platform() {
        let mut world = flat_world(Arc::new(PhysicsConfig::default()));
        spawn_mushroom(
            &mut world,
            MushroomDef {
                position: Vec3::new(5.0, 0.0, 5.0),
                cap_height: Some(2.0),
                ..Default::default()
            },
        )
        .unwrap();
        let mut rig = Rig::with_world(world, Vec3::new(5.0, 2.3 + 1.8, 5.0));
        let mut idle = InputState::new();
        let mut landings = 0;
        for _ in 0..120 {
            let report = rig.step(DT, &mut idle);
            landings += report
                .events
                .iter()
                .filter(|e| matches!(e, PhysicsEvent::MushroomLanding { .. }))
                .count();
        }
        let s = rig.ctl.state();
        assert!(s.is_grounded);
        assert!((s.position.y - 3.8).abs() < 1e-4);
        assert_eq!(landings, 1);

        // A jump off the cap works like a jump off the ground.
        let mut jump = InputState::with(&[Action::Jump]);
        rig.step(DT, &mut jump);
        assert!(rig.ctl.state().velocity.y > 7.0);
    }

    #[test]
    fn dash_adds_impulse_along_camera_forward_once() {
        let mut rig = Rig::new(Vec3::new(0.0, 6.0, 0.0));
        rig.settle();
        let vz = rig.ctl.state().velocity.z;
        let mut dash = InputState::with(&[Action::Dash]);
        let report = rig.step(DT, &mut dash);
        let s = rig.ctl.state();
        assert!((s.velocity.z - (vz + 18.0)).abs() < 1e-3);
        assert_eq!(s.abilities.dash_cooldown, 1.0);
        assert!(report.contains(|e| matches!(e, PhysicsEvent::Dash { .. })));

        // Still held: no new edge, nothing more added.
        let after_first = s.velocity.z;
        let report = rig.step(DT, &mut dash);
        assert!(rig.ctl.state().velocity.z < after_first);
        assert!(!report.contains(|e| matches!(e, PhysicsEvent::Dash { .. })));
    }

    #[test]
    fn double_jump_needs_a_fresh_press() {
        let mut rig = Rig::new(Vec3::new(0.0, 6.0, 0.0));
        rig.settle();

        let mut input = InputState::with(&[Action::Jump]);
        let report = rig.step(DT, &mut input);
        assert!(report.contains(|e| *e == PhysicsEvent::Jump { air: false }));

        // Holding jump through the next frames does not air jump.
        for _ in 0..5 {
            input.press(Action::Jump);
            let report = rig.step(DT, &mut input);
            assert!(!report.contains(|e| *e == PhysicsEvent::Jump { air: true }));
        }
        rig.step(DT, &mut InputState::new());

        let mut input = InputState::with(&[Action::Jump]);
        let report = rig.step(DT, &mut input);
        assert!(report.contains(|e| *e == PhysicsEvent::Jump { air: true }));
        assert_eq!(rig.ctl.state().abilities.air_jumps_left, 0);
        assert!((rig.ctl.state().velocity.y - 9.0).abs() < 1e-4);
    }

    #[test]
    fn phase_needs_inventory() {
        let mut rig = Rig::new(Vec3::new(0.0, 6.0, 0.0));
        rig.settle();
        let report = rig.step(DT, &mut InputState::with(&[Action::Phase]));
        assert!(report.contains(|e| *e == PhysicsEvent::PhaseDenied));
        assert!(!rig.ctl.state().abilities.is_phasing);
        assert_eq!(rig.toasts.messages.len(), 1);

        rig.step(DT, &mut InputState::new());
        rig.stock.add("rainbow_shard", 1);
        let report = rig.step(DT, &mut InputState::with(&[Action::Phase]));
        assert!(report.contains(|e| *e == PhysicsEvent::PhaseStarted));
        assert!(rig.ctl.state().abilities.is_phasing);
        assert!(rig.ctl.state().abilities.distortion >= 0.6);

        let mut idle = InputState::new();
        let mut ended = false;
        for _ in 0..(5.5 / DT) as usize {
            ended |= rig.step(DT, &mut idle).contains(|e| *e == PhysicsEvent::PhaseEnded);
        }
        assert!(ended);
        assert!(!rig.ctl.state().abilities.is_phasing);
        assert_eq!(rig.ctl.state().abilities.distortion, 0.0);
    }

    #[test]
    fn dancing_is_exclusive_and_swallows_ability_edges() {
        let mut rig = Rig::new(Vec3::new(0.0, 6.0, 0.0));
        rig.settle();

        let mut input = InputState::with(&[Action::Dance, Action::Dash, Action::Jump]);
        let report = rig.step(DT, &mut input);
        assert!(matches!(rig.ctl.state().mode.state, PlayerMode::Dancing(_)));
        assert!(report.events.is_empty());
        assert_eq!(rig.ctl.state().velocity, Vec3::ZERO);
        assert_eq!(rig.ctl.state().abilities.dash_cooldown, 0.0);

        // Toggle out while Dash is still held: no dash fires.
        input.release(Action::Dance);
        rig.step(DT, &mut input);
        input.press(Action::Dance);
        let report = rig.step(DT, &mut input);
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Default);
        assert!(!report.contains(|e| matches!(e, PhysicsEvent::Dash { .. })));
        assert_eq!(rig.camera.roll, 0.0);
    }

    #[test]
    fn climbing_passes_through_to_default() {
        let mut rig = Rig::new(Vec3::new(0.0, 6.0, 0.0));
        rig.ctl.state_mut().velocity = Vec3::new(3.0, 3.0, 3.0);
        assert!(rig.ctl.force_mode(PlayerMode::Climbing));
        rig.step(DT, &mut InputState::new());
        assert_eq!(rig.ctl.state().mode.state, PlayerMode::Default);
        assert_eq!(rig.ctl.state().velocity, Vec3::ZERO);
    }

    #[test]
    fn nan_velocity_is_scrubbed() {
        let mut rig = Rig::new(Vec3::new(0.0, 6.0, 0.0));
        rig.ctl.state_mut().velocity = Vec3::new(f32::NAN, 0.0, 2.0);
        rig.step(DT, &mut InputState::new());
        assert!(rig.ctl.state().velocity.is_finite());
        assert!(rig.ctl.state().position.is_finite());
    }
}
