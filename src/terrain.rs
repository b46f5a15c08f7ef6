//! Ground height and terrain zones.
//!
//! The world-generation collaborator supplies raw terrain height through
//! [`GroundHeight`]. On top of that the lake basin is carved down and an
//! island raised back up inside it. [`TerrainZones`] is the only place the
//! basin and island footprints are defined; the unified ground function and
//! the fast-path routing predicate both ask it, so they always agree.

use glam::Vec2;

use crate::config::ZoneConfig;
use crate::math::smoothstep;

/// Raw terrain elevation at `(x, z)`.
pub trait GroundHeight {
    fn height(&self, x: f32, z: f32) -> f32;
}

/// Infinite flat plane. Used by tests and the flat demo scene.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatGround(pub f32);

impl GroundHeight for FlatGround {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Rolling sine hills matching the native terrain routine.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProceduralTerrain;

impl GroundHeight for ProceduralTerrain {
    fn height(&self, x: f32, z: f32) -> f32 {
        let mut h = (x * 0.05).sin() * 2.0 + (z * 0.05).cos() * 2.0;
        h += (x * 0.1).sin() * 0.8 + (z * 0.1).cos() * 0.8;
        h += (x * 0.2).sin() * 0.3 + (z * 0.2).cos() * 0.3;
        h
    }
}

#[derive(Clone, Copy, Debug)]
struct Island {
    center: Vec2,
    radius: f32,
    top_y: f32,
    edge_blend: f32,
}

/// Basin and island footprints plus the lake's surface and bed heights.
#[derive(Clone, Debug)]
pub struct TerrainZones {
    basin_min: Vec2,
    basin_max: Vec2,
    edge_blend: f32,
    pub lake_surface_y: f32,
    pub lake_bottom_y: f32,
    island: Option<Island>,
}

impl TerrainZones {
    pub fn from_config(cfg: &ZoneConfig) -> Self {
        Self {
            basin_min: cfg.basin_min.min(cfg.basin_max),
            basin_max: cfg.basin_min.max(cfg.basin_max),
            edge_blend: cfg.basin_edge_blend.max(0.0),
            lake_surface_y: cfg.lake_surface_y,
            lake_bottom_y: cfg.lake_bottom_y,
            island: cfg.island.as_ref().map(|i| Island {
                center: i.center,
                radius: i.radius.max(0.0),
                top_y: i.top_y,
                edge_blend: i.edge_blend.clamp(0.0, i.radius.max(0.0)),
            }),
        }
    }

    /// Whether `(x, z)` lies inside the lake basin's rectangular footprint.
    /// This is the routing predicate: the fast path never runs in here.
    pub fn in_basin(&self, x: f32, z: f32) -> bool {
        x >= self.basin_min.x && x <= self.basin_max.x && z >= self.basin_min.y && z <= self.basin_max.y
    }

    /// Apply the basin depression and island profile to a raw height.
    pub fn carve(&self, raw: f32, x: f32, z: f32) -> f32 {
        if !self.in_basin(x, z) {
            return raw;
        }

        let edge_dist = (x - self.basin_min.x)
            .min(self.basin_max.x - x)
            .min(z - self.basin_min.y)
            .min(self.basin_max.y - z);
        let depth = smoothstep(0.0, self.edge_blend, edge_dist);
        let bed = raw.min(self.lake_bottom_y);
        let mut h = raw + (bed - raw) * depth;

        if let Some(island) = self.island {
            let r = Vec2::new(x, z).distance(island.center);
            let rise = 1.0 - smoothstep(island.radius - island.edge_blend, island.radius, r);
            if rise > 0.0 {
                let top = h.max(island.top_y);
                h += (top - h) * rise;
            }
        }
        h
    }
}

/// Raw provider plus zones: everything the two engines need about the ground.
pub struct Terrain {
    provider: Box<dyn GroundHeight>,
    zones: TerrainZones,
}

impl Terrain {
    pub fn new(provider: impl GroundHeight + 'static, zones: TerrainZones) -> Self {
        Self {
            provider: Box::new(provider),
            zones,
        }
    }

    pub fn zones(&self) -> &TerrainZones {
        &self.zones
    }

    /// Height as the fast path sees it: no basin, no island.
    pub fn raw_height(&self, x: f32, z: f32) -> f32 {
        self.provider.height(x, z)
    }

    /// Unified ground height including basin and island carving.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.zones.carve(self.provider.height(x, z), x, z)
    }

    /// Lake surface height at `(x, z)`, if the point is open lake water:
    /// inside the basin with the carved ground below the surface. The island
    /// is dry only where its profile actually clears the water.
    pub fn lake_level(&self, x: f32, z: f32) -> Option<f32> {
        let surface = self.zones.lake_surface_y;
        (self.zones.in_basin(x, z) && self.height(x, z) < surface).then_some(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IslandConfig, ZoneConfig};

    fn zones() -> TerrainZones {
        TerrainZones::from_config(&ZoneConfig {
            basin_min: Vec2::new(0.0, 0.0),
            basin_max: Vec2::new(100.0, 100.0),
            basin_edge_blend: 10.0,
            lake_surface_y: 1.5,
            lake_bottom_y: -4.0,
            island: Some(IslandConfig {
                center: Vec2::new(50.0, 50.0),
                radius: 10.0,
                top_y: 3.0,
                edge_blend: 2.0,
            }),
            ..ZoneConfig::default()
        })
    }

    #[test]
    fn island_rim_below_the_surface_is_water() {
        let terrain = Terrain::new(FlatGround(0.0), zones());
        // Inside the island radius but low on its blend ring.
        let (x, z) = (50.0, 59.5);
        assert!(terrain.height(x, z) < 1.5);
        assert_eq!(terrain.lake_level(x, z), Some(1.5));
    }

    #[test]
    fn outside_basin_is_raw_terrain() {
        let terrain = Terrain::new(ProceduralTerrain, zones());
        let (x, z) = (-20.0, 37.0);
        assert_eq!(terrain.height(x, z), terrain.raw_height(x, z));
    }

    #[test]
    fn basin_interior_reaches_lake_bed() {
        let terrain = Terrain::new(FlatGround(0.0), zones());
        assert!((terrain.height(20.0, 20.0) - -4.0).abs() < 1e-5);
        // Halfway into the rim the carve is partial.
        let rim = terrain.height(5.0, 50.0);
        assert!(rim < 0.0 && rim > -4.0);
    }

    #[test]
    fn island_rises_above_the_lake() {
        let terrain = Terrain::new(FlatGround(0.0), zones());
        assert!((terrain.height(50.0, 50.0) - 3.0).abs() < 1e-5);
        assert_eq!(terrain.lake_level(52.0, 50.0), None);
        assert_eq!(terrain.lake_level(20.0, 20.0), Some(1.5));
        assert_eq!(terrain.lake_level(-1.0, 20.0), None);
    }

    #[test]
    fn inverted_basin_corners_are_normalised() {
        let cfg = ZoneConfig {
            basin_min: Vec2::new(10.0, 10.0),
            basin_max: Vec2::new(-10.0, -10.0),
            ..ZoneConfig::default()
        };
        let z = TerrainZones::from_config(&cfg);
        assert!(z.in_basin(0.0, 0.0));
    }
}
