use glam::{Vec2, Vec3};
use hecs::Entity;
use log::trace;

use crate::components::{Cave, Cloud, Geyser, Mushroom, PanningPad, PlayerMode};
use crate::events::PhysicsEvent;
use crate::vine::VineSwing;
use crate::world::PhysicsWorld;

use super::player::{Frame, PlayerController};

/// Horizontal speed kept per 60 Hz tick while pressed against a flooded gate.
const GATE_DAMPING_PER_TICK: f32 = 0.5;
const DAMPING_TICK_RATE: f32 = 60.0;

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

impl PlayerController {
    /// Narrow phase against the special geometry neither engine models.
    /// Runs after the mode handler every frame. Each category is shortlisted
    /// by its spatial grid and then tested exactly.
    pub(super) fn resolve_collisions(&mut self, world: &PhysicsWorld, f: &mut Frame) {
        let mut buf = std::mem::take(&mut self.candidates);

        self.water_gates(world, f, &mut buf);

        // Vine and dance modes own the position; surfaces would fight them.
        let driven = matches!(self.state.mode.state, PlayerMode::Vine | PlayerMode::Dancing(_));
        let previous_platform = self.platform.take();
        if !driven {
            let mut landed = self.mushrooms(world, f, &mut buf);
            if landed.is_none() {
                landed = self.clouds(world, &mut buf);
            }
            if landed.is_none() {
                landed = self.panning_pads(world, f, &mut buf);
            }
            self.platform = landed;
            self.geysers(world, f, &mut buf);
        } else {
            self.geyser = None;
        }

        if let Some(platform) = self.platform {
            if previous_platform != Some(platform) {
                match world.obstacles.satisfies::<&Cloud>(platform) {
                    Ok(true) => f.report.push(PhysicsEvent::CloudPlatform { cloud: platform }),
                    _ if world.obstacles.satisfies::<&Mushroom>(platform).unwrap_or(false) => {
                        f.report.push(PhysicsEvent::MushroomLanding { mushroom: platform })
                    }
                    _ => {}
                }
            }
        }

        self.attach_vine(world, f, &mut buf);

        self.candidates = buf;
    }

    /// Band test shared by caps, clouds and pads: feet within the band
    /// around `top`, and not moving up.
    fn touches_top(&self, top: f32) -> bool {
        let c = &self.config.collision;
        let feet = self.state.position.y - self.config.movement.player_height;
        self.state.velocity.y < 0.0 && feet <= top + c.cap_band_above && feet >= top - c.cap_band_below
    }

    fn land_on(&mut self, top: f32) {
        self.state.position.y = top + self.config.movement.player_height;
        self.state.velocity.y = 0.0;
        self.state.is_grounded = true;
    }

    // -----------------------------------------------------------------------
    // Water gates
    // -----------------------------------------------------------------------

    fn water_gates(&mut self, world: &PhysicsWorld, f: &mut Frame, buf: &mut Vec<Entity>) {
        if self.state.is_swimming() {
            return;
        }
        let c = &self.config.collision;
        world.candidates_into::<Cave>(self.state.position, c.gate_radius, buf);
        for &e in buf.iter() {
            let Some((transform, cave)) = world.obstacle::<Cave>(e) else {
                continue;
            };
            if !cave.is_blocked {
                continue;
            }
            let gate = transform.transform_point(cave.gate_position);
            let pos = self.state.position;
            let away = Vec3::new(pos.x - gate.x, 0.0, pos.z - gate.z);
            if away.length() >= c.gate_radius {
                continue;
            }
            // Standing dead centre: push back against the direction of travel.
            let dir = away
                .try_normalize()
                .or_else(|| (-Vec3::new(self.state.velocity.x, 0.0, self.state.velocity.z)).try_normalize())
                .unwrap_or(Vec3::X);
            self.state.position += dir * c.gate_push_force * f.dt;
            let damping = GATE_DAMPING_PER_TICK.powf(f.dt * DAMPING_TICK_RATE);
            self.state.velocity.x *= damping;
            self.state.velocity.z *= damping;
            f.report.push(PhysicsEvent::WaterGatePush { cave: e });
        }
    }

    // -----------------------------------------------------------------------
    // Surfaces
    // -----------------------------------------------------------------------

    fn mushrooms(&mut self, world: &PhysicsWorld, f: &mut Frame, buf: &mut Vec<Entity>) -> Option<Entity> {
        world.candidates_into::<Mushroom>(self.state.position, self.config.movement.player_radius, buf);
        for &e in buf.iter() {
            let Some((transform, m)) = world.obstacle::<Mushroom>(e) else {
                continue;
            };
            if horizontal_distance(self.state.position, transform.position) >= m.cap_radius {
                continue;
            }
            let top = m.cap_top(transform.position);
            if !self.touches_top(top) {
                continue;
            }
            trace!("mushroom {e:?}: contact at top {top}");

            if m.trampoline {
                let kick = f.audio.kick();
                self.state.velocity.y = m.bounce_force + kick * self.config.collision.trampoline_kick_boost;
                self.state.is_grounded = false;
                if let Ok(mut shroom) = world.obstacles.get::<&mut Mushroom>(e) {
                    shroom.squash = 1.0;
                }
                f.consume_jump();
                f.report.push(PhysicsEvent::TrampolineBounce { mushroom: e, kick });
                return None;
            }

            self.land_on(top);
            return Some(e);
        }
        None
    }

    /// Only tier 1 clouds are solid.
    fn clouds(&mut self, world: &PhysicsWorld, buf: &mut Vec<Entity>) -> Option<Entity> {
        world.candidates_into::<Cloud>(self.state.position, 0.0, buf);
        for &e in buf.iter() {
            let Some((transform, cloud)) = world.obstacle::<Cloud>(e) else {
                continue;
            };
            if !cloud.is_solid() || horizontal_distance(self.state.position, transform.position) >= cloud.radius {
                continue;
            }
            let top = transform.position.y + cloud.top_offset;
            if self.touches_top(top) {
                self.land_on(top);
                return Some(e);
            }
        }
        None
    }

    /// Above the boost phase a pad launches the player; otherwise it is a
    /// platform at its current bob height.
    fn panning_pads(&mut self, world: &PhysicsWorld, f: &mut Frame, buf: &mut Vec<Entity>) -> Option<Entity> {
        let c = &self.config.collision;
        world.candidates_into::<PanningPad>(self.state.position, 0.0, buf);
        for &e in buf.iter() {
            let Some((transform, pad)) = world.obstacle::<PanningPad>(e) else {
                continue;
            };
            if horizontal_distance(self.state.position, transform.position) >= pad.radius {
                continue;
            }
            let top = pad.top(transform.position);
            if !self.touches_top(top) {
                continue;
            }
            if pad.bob_phase > c.pad_boost_phase {
                self.state.velocity.y = c.pad_boost;
                self.state.is_grounded = false;
                f.report.push(PhysicsEvent::PadBoost { pad: e });
                return None;
            }
            self.land_on(top);
            return Some(e);
        }
        None
    }

    // -----------------------------------------------------------------------
    // Geysers
    // -----------------------------------------------------------------------

    fn geysers(&mut self, world: &PhysicsWorld, f: &mut Frame, buf: &mut Vec<Entity>) {
        let c = &self.config.collision;
        let feet = self.state.position.y - self.config.movement.player_height;
        let mut riding = None;

        world.candidates_into::<Geyser>(self.state.position, 0.0, buf);
        for &e in buf.iter() {
            let Some((transform, g)) = world.obstacle::<Geyser>(e) else {
                continue;
            };
            let strength = g.eruption_strength.clamp(0.0, 1.0);
            if strength <= c.geyser_threshold || horizontal_distance(self.state.position, transform.position) >= g.radius {
                continue;
            }
            let base = transform.position.y;
            if feet < base - c.cap_band_below || feet > base + g.plume_height * strength {
                continue;
            }

            let target = c.geyser_lift * strength;
            let blend = (c.geyser_response * f.dt).min(1.0);
            self.state.velocity.y += (target - self.state.velocity.y) * blend;
            self.state.is_grounded = false;
            self.state.abilities.refill_air_jumps();
            riding = Some(e);
            break;
        }

        if let Some(e) = riding {
            if self.geyser != Some(e) {
                f.report.push(PhysicsEvent::GeyserLift { geyser: e });
            }
        }
        self.geyser = riding;
    }

    // -----------------------------------------------------------------------
    // Vines
    // -----------------------------------------------------------------------

    fn attach_vine(&mut self, world: &PhysicsWorld, f: &mut Frame, buf: &mut Vec<Entity>) {
        let c = &self.config.collision;
        if self.active_vine.is_some() || matches!(self.state.mode.state, PlayerMode::Dancing(_)) {
            return;
        }
        if let Some(t) = self.last_detach {
            if self.clock - t < c.vine_regrab_delay {
                return;
            }
        }

        let pos = self.state.position;
        world.candidates_into::<VineSwing>(pos, c.vine_search_radius, buf);
        for &e in buf.iter() {
            let Ok(mut vine) = world.obstacles.get::<&mut VineSwing>(e) else {
                continue;
            };
            let dist = horizontal_distance(pos, vine.anchor);
            if dist >= c.vine_search_radius || pos.y > vine.anchor.y || pos.y < vine.tip().y {
                continue;
            }
            if dist < c.vine_capture_radius {
                vine.attach(pos, self.state.velocity);
                self.active_vine = Some(e);
                f.report.push(PhysicsEvent::VineGrab { vine: e });
                return;
            }
        }
    }
}
