use glam::Vec3;
use hecs::Entity;
use log::warn;

use crate::components::*;
use crate::error::WorldError;
use crate::math::positive_or;
use crate::vine::VineSwing;
use crate::world::PhysicsWorld;

// ---------------------------------------------------------------------------
// Fallback dimensions for malformed obstacle records
// ---------------------------------------------------------------------------

const DEFAULT_CAP_RADIUS: f32 = 1.5;
const DEFAULT_CAP_HEIGHT: f32 = 2.0;
const DEFAULT_STEM_RADIUS: f32 = 0.3;
const DEFAULT_GEYSER_RADIUS: f32 = 1.0;
const DEFAULT_PLUME_HEIGHT: f32 = 8.0;
const DEFAULT_PAD_RADIUS: f32 = 1.2;
const DEFAULT_VINE_LENGTH: f32 = 4.0;

// ---------------------------------------------------------------------------
// Obstacle records as handed over by world generation
// ---------------------------------------------------------------------------

/// Any dimension may be missing or garbage; `spawn_*` substitutes defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct MushroomDef {
    pub position: Vec3,
    pub cap_radius: Option<f32>,
    pub cap_height: Option<f32>,
    pub stem_radius: Option<f32>,
    pub bounce_force: Option<f32>,
    pub trampoline: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct CloudDef {
    pub position: Vec3,
    pub scale: Vec3,
    pub tier: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct CaveDef {
    pub transform: LocalTransform,
    pub gate_position: Vec3,
    pub is_blocked: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GeyserDef {
    pub position: Vec3,
    pub radius: Option<f32>,
    pub plume_height: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PadDef {
    pub position: Vec3,
    pub radius: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VineDef {
    pub anchor: Vec3,
    pub length: Option<f32>,
}

// ---------------------------------------------------------------------------
// Spawn helpers
// ---------------------------------------------------------------------------

/// Resolve one dimension, warning when a default had to be substituted.
fn dimension(kind: &str, name: &str, value: Option<f32>, fallback: f32) -> f32 {
    let resolved = positive_or(value, fallback);
    if let Some(v) = value {
        if v != resolved {
            warn!("{kind}: invalid {name} {v}, using {fallback}");
        }
    }
    resolved
}

pub fn spawn_mushroom(world: &mut PhysicsWorld, def: MushroomDef) -> Result<Entity, WorldError> {
    let bounce_default = world.config().collision.trampoline_bounce;
    let cap_radius = dimension("mushroom", "cap radius", def.cap_radius, DEFAULT_CAP_RADIUS);
    // The stem never pokes out of the cap.
    let stem_radius = dimension("mushroom", "stem radius", def.stem_radius, DEFAULT_STEM_RADIUS).min(cap_radius);

    world.register(
        LocalTransform::new(def.position),
        Mushroom {
            cap_radius,
            cap_height: dimension("mushroom", "cap height", def.cap_height, DEFAULT_CAP_HEIGHT),
            stem_radius,
            bounce_force: dimension("mushroom", "bounce force", def.bounce_force, bounce_default),
            trampoline: def.trampoline,
            squash: 0.0,
        },
    )
}

/// Cloud footprint and top surface scale with the cloud's visual size.
pub fn spawn_cloud(world: &mut PhysicsWorld, def: CloudDef) -> Result<Entity, WorldError> {
    let collision = &world.config().collision;
    let (base_radius, base_top) = (collision.cloud_base_radius, collision.cloud_top_offset);
    let sx = dimension("cloud", "scale.x", Some(def.scale.x), 1.0);
    let sy = dimension("cloud", "scale.y", Some(def.scale.y), 1.0);

    world.register(
        LocalTransform::new(def.position).with_scale(Vec3::new(sx, sy, sx)),
        Cloud {
            tier: def.tier,
            radius: sx * base_radius,
            top_offset: sy * base_top,
        },
    )
}

/// Cave-registration callback: seeds the water-gate list.
pub fn register_cave(world: &mut PhysicsWorld, def: CaveDef) -> Result<Entity, WorldError> {
    world.register(
        def.transform,
        Cave {
            gate_position: def.gate_position,
            is_blocked: def.is_blocked,
        },
    )
}

pub fn spawn_geyser(world: &mut PhysicsWorld, def: GeyserDef) -> Result<Entity, WorldError> {
    world.register(
        LocalTransform::new(def.position),
        Geyser {
            radius: dimension("geyser", "radius", def.radius, DEFAULT_GEYSER_RADIUS),
            plume_height: dimension("geyser", "plume height", def.plume_height, DEFAULT_PLUME_HEIGHT),
            eruption_strength: 0.0,
        },
    )
}

pub fn spawn_panning_pad(world: &mut PhysicsWorld, def: PadDef) -> Result<Entity, WorldError> {
    world.register(
        LocalTransform::new(def.position),
        PanningPad {
            radius: dimension("panning pad", "radius", def.radius, DEFAULT_PAD_RADIUS),
            bob_phase: 0.0,
            bob_offset: 0.0,
        },
    )
}

pub fn spawn_vine(world: &mut PhysicsWorld, def: VineDef) -> Result<Entity, WorldError> {
    let length = dimension("vine", "length", def.length, DEFAULT_VINE_LENGTH);
    world.register(LocalTransform::new(def.anchor), VineSwing::new(def.anchor, length))
}
