use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::components::{Geyser, LocalTransform, PanningPad};
use crate::config::PhysicsConfig;
use crate::error::WorldError;
use crate::scene::prefabs::*;
use crate::terrain::{FlatGround, ProceduralTerrain, Terrain, TerrainZones};
use crate::world::PhysicsWorld;

/// Empty world over an infinite plane at y = 0, zones from `config`.
/// The spatial index is not built, so callers can keep registering.
pub fn flat_world(config: Arc<PhysicsConfig>) -> PhysicsWorld {
    let terrain = Terrain::new(FlatGround(0.0), TerrainZones::from_config(&config.zones));
    PhysicsWorld::new(config, terrain)
}

/// Build and populate the demo world on procedural terrain, then seal it.
pub fn load_demo_world(config: Arc<PhysicsConfig>) -> Result<PhysicsWorld, WorldError> {
    let terrain = Terrain::new(ProceduralTerrain, TerrainZones::from_config(&config.zones));
    let mut world = PhysicsWorld::new(config, terrain);

    // Mushroom ring around spawn; every third one is a trampoline.
    for i in 0..9 {
        let angle = i as f32 / 9.0 * TAU;
        let (x, z) = (angle.cos() * 14.0, angle.sin() * 14.0 - 10.0);
        let base = Vec3::new(x, world.terrain.height(x, z), z);
        spawn_mushroom(
            &mut world,
            MushroomDef {
                position: base,
                cap_radius: Some(1.5 + (i % 3) as f32 * 0.5),
                cap_height: Some(2.0 + (i % 4) as f32),
                stem_radius: Some(0.35),
                bounce_force: None,
                trampoline: i % 3 == 0,
            },
        )?;
    }

    // A record with missing dimensions, as world generation sometimes emits.
    let base = Vec3::new(-6.0, world.terrain.height(-6.0, -4.0), -4.0);
    spawn_mushroom(
        &mut world,
        MushroomDef {
            position: base,
            cap_radius: Some(f32::NAN),
            ..Default::default()
        },
    )?;

    for (i, &(x, y, z, tier)) in [
        (6.0, 9.0, -20.0, 1u8),
        (12.0, 13.0, -26.0, 1),
        (-8.0, 16.0, -30.0, 2),
        (0.0, 22.0, -40.0, 3),
    ]
    .iter()
    .enumerate()
    {
        spawn_cloud(
            &mut world,
            CloudDef {
                position: Vec3::new(x, y, z),
                scale: Vec3::new(1.5 + i as f32 * 0.25, 1.0, 1.5),
                tier,
            },
        )?;
    }

    // Flooded cave mouth near the lake, and a dry one.
    register_cave(
        &mut world,
        CaveDef {
            transform: LocalTransform::new(Vec3::new(55.0, 0.0, 40.0))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            gate_position: Vec3::new(0.0, 0.5, 6.0),
            is_blocked: true,
        },
    )?;
    register_cave(
        &mut world,
        CaveDef {
            transform: LocalTransform::new(Vec3::new(-60.0, 0.0, -20.0)),
            gate_position: Vec3::new(0.0, 0.5, 6.0),
            is_blocked: false,
        },
    )?;

    for &(x, z) in &[(20.0, 0.0), (24.0, 12.0)] {
        let base = Vec3::new(x, world.terrain.height(x, z), z);
        spawn_geyser(
            &mut world,
            GeyserDef {
                position: base,
                radius: Some(1.2),
                plume_height: Some(10.0),
            },
        )?;
    }

    for &(x, z) in &[(-18.0, 4.0), (-22.0, 10.0)] {
        let base = Vec3::new(x, world.terrain.height(x, z) + 0.4, z);
        spawn_panning_pad(
            &mut world,
            PadDef {
                position: base,
                radius: Some(1.5),
            },
        )?;
    }

    for &(x, z) in &[(0.0, -16.0), (3.0, -22.0)] {
        let anchor = Vec3::new(x, world.terrain.height(x, z) + 9.0, z);
        spawn_vine(
            &mut world,
            VineDef {
                anchor,
                length: Some(5.0),
            },
        )?;
    }

    world.build_spatial_index()?;
    Ok(world)
}

/// Stand-in for the world's own animation: pulses geysers and bobs pads.
pub fn animate_obstacles(world: &mut PhysicsWorld, time: f32) {
    for (_, geyser) in world.obstacles.query_mut::<&mut Geyser>() {
        geyser.eruption_strength = (time * 0.5).sin().max(0.0);
    }
    for (_, pad) in world.obstacles.query_mut::<&mut PanningPad>() {
        pad.bob_phase = (time * 0.25).rem_euclid(1.0);
        pad.bob_offset = (pad.bob_phase * TAU).sin() * 0.3;
    }
}
