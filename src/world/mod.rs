//! The world context passed into every controller step.
//!
//! Obstacles live in a hecs arena owned by [`PhysicsWorld`]; nothing about
//! the world is global, so tests and tools can run several worlds side by
//! side. Registration is append-only until the spatial index is built, after
//! which the obstacle set is sealed and read-only (component fields such as a
//! geyser's eruption strength may still be animated).

mod spatial;

pub use spatial::SpatialHashGrid;

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use hecs::{Component, Entity, World};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::components::{Cave, Cloud, Geyser, LocalTransform, Mushroom, PanningPad};
use crate::config::PhysicsConfig;
use crate::error::WorldError;
use crate::terrain::Terrain;
use crate::vine::VineSwing;

/// Obstacle categories; one spatial grid per category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Cave,
    Mushroom,
    Cloud,
    Vine,
    Geyser,
    PanningPad,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 6] = [
        Self::Cave,
        Self::Mushroom,
        Self::Cloud,
        Self::Vine,
        Self::Geyser,
        Self::PanningPad,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cave => "cave",
            Self::Mushroom => "mushroom",
            Self::Cloud => "cloud",
            Self::Vine => "vine",
            Self::Geyser => "geyser",
            Self::PanningPad => "panning pad",
        }
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A shape component that can be registered with the world.
pub trait Obstacle: Component {
    const KIND: ObstacleKind;

    /// Centre and radius of the XZ area in which this obstacle can interact
    /// with the player. The broad phase inserts the obstacle into every cell
    /// this circle touches.
    fn footprint(&self, transform: &LocalTransform, config: &PhysicsConfig) -> (Vec3, f32);
}

impl Obstacle for Mushroom {
    const KIND: ObstacleKind = ObstacleKind::Mushroom;

    fn footprint(&self, t: &LocalTransform, config: &PhysicsConfig) -> (Vec3, f32) {
        (t.position, self.cap_radius.max(self.stem_radius) + config.movement.player_radius)
    }
}

impl Obstacle for Cloud {
    const KIND: ObstacleKind = ObstacleKind::Cloud;

    fn footprint(&self, t: &LocalTransform, _config: &PhysicsConfig) -> (Vec3, f32) {
        (t.position, self.radius)
    }
}

impl Obstacle for Cave {
    const KIND: ObstacleKind = ObstacleKind::Cave;

    fn footprint(&self, t: &LocalTransform, config: &PhysicsConfig) -> (Vec3, f32) {
        let reach = config
            .collision
            .gate_radius
            .max(config.zones.gate_capture_radius);
        (t.transform_point(self.gate_position), reach)
    }
}

impl Obstacle for VineSwing {
    const KIND: ObstacleKind = ObstacleKind::Vine;

    fn footprint(&self, _t: &LocalTransform, config: &PhysicsConfig) -> (Vec3, f32) {
        (self.anchor, config.collision.vine_search_radius)
    }
}

impl Obstacle for Geyser {
    const KIND: ObstacleKind = ObstacleKind::Geyser;

    fn footprint(&self, t: &LocalTransform, _config: &PhysicsConfig) -> (Vec3, f32) {
        (t.position, self.radius)
    }
}

impl Obstacle for PanningPad {
    const KIND: ObstacleKind = ObstacleKind::PanningPad;

    fn footprint(&self, t: &LocalTransform, _config: &PhysicsConfig) -> (Vec3, f32) {
        (t.position, self.radius)
    }
}

/// A vertical cylinder handed to the fast path (mushroom stems).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineCollider {
    /// Base centre of the cylinder.
    pub base: Vec3,
    pub radius: f32,
    pub height: f32,
}

pub struct PhysicsWorld {
    pub obstacles: World,
    pub terrain: Terrain,
    config: Arc<PhysicsConfig>,
    grids: FxHashMap<ObstacleKind, SpatialHashGrid>,
    sealed: bool,
}

impl PhysicsWorld {
    pub fn new(config: Arc<PhysicsConfig>, terrain: Terrain) -> Self {
        Self {
            obstacles: World::new(),
            terrain,
            config,
            grids: FxHashMap::default(),
            sealed: false,
        }
    }

    pub fn config(&self) -> &Arc<PhysicsConfig> {
        &self.config
    }

    /// Register an obstacle. Fails once the spatial index has been built.
    pub fn register<C: Obstacle>(&mut self, transform: LocalTransform, shape: C) -> Result<Entity, WorldError> {
        if self.sealed {
            warn!("rejected {} registration: world is sealed", C::KIND);
            return Err(WorldError::Sealed {
                category: C::KIND.label(),
            });
        }
        Ok(self.obstacles.spawn((transform, shape)))
    }

    /// Build one grid per obstacle category. Call exactly once, after world
    /// generation has registered everything.
    pub fn build_spatial_index(&mut self) -> Result<(), WorldError> {
        if self.sealed {
            return Err(WorldError::IndexAlreadyBuilt);
        }

        let cell_size = self.config.grid.cell_size;
        let mut grids = FxHashMap::default();
        grids.insert(ObstacleKind::Cave, self.grid_for::<Cave>(cell_size));
        grids.insert(ObstacleKind::Mushroom, self.grid_for::<Mushroom>(cell_size));
        grids.insert(ObstacleKind::Cloud, self.grid_for::<Cloud>(cell_size));
        grids.insert(ObstacleKind::Vine, self.grid_for::<VineSwing>(cell_size));
        grids.insert(ObstacleKind::Geyser, self.grid_for::<Geyser>(cell_size));
        grids.insert(ObstacleKind::PanningPad, self.grid_for::<PanningPad>(cell_size));

        for kind in ObstacleKind::ALL {
            if let Some(grid) = grids.get(&kind) {
                debug!("{kind} grid: {} obstacles in {} cells", grid.len(), grid.cell_count());
            }
        }
        info!(
            "spatial index built ({} obstacles, cell size {cell_size})",
            grids.values().map(SpatialHashGrid::len).sum::<usize>()
        );

        self.grids = grids;
        self.sealed = true;
        Ok(())
    }

    fn grid_for<C: Obstacle>(&self, cell_size: f32) -> SpatialHashGrid {
        let mut grid = SpatialHashGrid::new(cell_size);
        for (entity, (transform, shape)) in self.obstacles.query::<(&LocalTransform, &C)>().iter() {
            let (center, radius) = shape.footprint(transform, &self.config);
            grid.insert(entity, center.x, center.z, radius);
        }
        grid
    }

    pub fn is_indexed(&self) -> bool {
        self.sealed
    }

    /// Broad phase: candidate obstacles of type `C` near `(x, z)`.
    ///
    /// Uses the category's grid when it is built and enabled, otherwise
    /// returns every registered obstacle of that type.
    pub fn candidates_into<C: Obstacle>(&self, position: Vec3, radius: f32, buf: &mut Vec<Entity>) {
        match self.grids.get(&C::KIND) {
            Some(grid) if self.config.grid.enabled => {
                grid.query_into(position.x, position.z, radius, buf);
            }
            _ => {
                buf.clear();
                buf.extend(self.obstacles.query::<&C>().iter().map(|(e, _)| e));
            }
        }
    }

    pub fn candidates<C: Obstacle>(&self, position: Vec3, radius: f32) -> Vec<Entity> {
        let mut buf = Vec::new();
        self.candidates_into::<C>(position, radius, &mut buf);
        buf
    }

    /// Copy out an obstacle's transform and shape.
    pub fn obstacle<C: Obstacle + Copy>(&self, entity: Entity) -> Option<(LocalTransform, C)> {
        let transform = *self.obstacles.get::<&LocalTransform>(entity).ok()?;
        let shape = *self.obstacles.get::<&C>(entity).ok()?;
        Some((transform, shape))
    }

    pub fn count<C: Obstacle>(&self) -> usize {
        self.obstacles.query::<&C>().iter().count()
    }

    /// Mushroom stems as vertical cylinders, for upload to the fast path.
    pub fn engine_colliders(&self) -> Vec<EngineCollider> {
        self.obstacles
            .query::<(&LocalTransform, &Mushroom)>()
            .iter()
            .map(|(_, (t, m))| EngineCollider {
                base: t.position,
                radius: m.stem_radius,
                height: m.cap_height,
            })
            .collect()
    }
}
