//! Physics tuning configuration.
//!
//! Every constant the controller and resolver use lives here so a world can be
//! re-tuned from a JSON file without recompiling. `Default` returns the values
//! the game ships with; missing keys in a file fall back to those defaults.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Walking, jumping and ground-following parameters shared by both engines.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub sneak_speed: f32,
    pub jump_speed: f32,
    /// Base downward acceleration (units/s²) before environment modulation.
    pub gravity: f32,
    /// Distance from the feet to the tracked player position (eye height).
    pub player_height: f32,
    /// Horizontal velocity smoothing rate; the blend per frame is `min(1, rate * dt)`.
    pub smoothing_rate: f32,
    /// While grounded, drops smaller than this are snapped instead of becoming a fall.
    pub step_down: f32,
    /// Vertical speed below which a fast-path landing counts as an impact.
    pub landing_impact_speed: f32,
    /// Fraction of the wind vector applied per second while airborne.
    pub wind_response: f32,
    /// Horizontal radius of the player used against stems and cave walls.
    pub player_radius: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            sprint_speed: 10.0,
            sneak_speed: 2.5,
            jump_speed: 8.0,
            gravity: 20.0,
            player_height: 1.8,
            smoothing_rate: 15.0,
            step_down: 0.35,
            landing_impact_speed: -1.0,
            wind_response: 0.5,
            player_radius: 0.4,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SwimConfig {
    /// Residual sink rate while submerged; much smaller than normal gravity.
    pub gravity: f32,
    pub drag: f32,
    pub thrust_speed: f32,
    /// Upward speed granted when surfacing with the jump key held.
    pub exit_boost: f32,
    /// Velocity multiplier applied on the frame the player enters the water.
    pub entry_damping: f32,
}

impl Default for SwimConfig {
    fn default() -> Self {
        Self {
            gravity: 2.0,
            drag: 2.0,
            thrust_speed: 6.0,
            exit_boost: 8.0,
            entry_damping: 0.5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    pub air_jumps: u32,
    pub air_jump_speed: f32,
    pub dash_impulse: f32,
    pub dash_cooldown: f32,
    pub phase_duration: f32,
    /// Inventory item consumed by one phase shift.
    pub phase_item: String,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            air_jumps: 1,
            air_jump_speed: 9.0,
            dash_impulse: 18.0,
            dash_cooldown: 1.0,
            phase_duration: 5.0,
            phase_item: "rainbow_shard".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub gate_radius: f32,
    pub gate_push_force: f32,
    /// Feet may sit this far below a cap top and still land on it.
    pub cap_band_below: f32,
    /// Feet may sit this far above a cap top and still count as touching.
    pub cap_band_above: f32,
    pub trampoline_bounce: f32,
    /// Extra bounce speed per unit of audio kick intensity.
    pub trampoline_kick_boost: f32,
    /// Cloud footprint radius per unit of horizontal scale.
    pub cloud_base_radius: f32,
    /// Cloud top height above its centre per unit of vertical scale.
    pub cloud_top_offset: f32,
    pub geyser_threshold: f32,
    /// Target upward speed at full eruption strength.
    pub geyser_lift: f32,
    /// Rate at which vertical velocity approaches the geyser target.
    pub geyser_response: f32,
    pub pad_boost_phase: f32,
    pub pad_boost: f32,
    /// Horizontal distance within which vines are considered at all.
    pub vine_search_radius: f32,
    /// Horizontal distance within which the player grabs a vine.
    pub vine_capture_radius: f32,
    /// Seconds after a detach before any vine can be grabbed again.
    pub vine_regrab_delay: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            gate_radius: 2.5,
            gate_push_force: 12.0,
            cap_band_below: 0.6,
            cap_band_above: 0.5,
            trampoline_bounce: 15.0,
            trampoline_kick_boost: 5.0,
            cloud_base_radius: 2.0,
            cloud_top_offset: 0.5,
            geyser_threshold: 0.1,
            geyser_lift: 12.0,
            geyser_response: 5.0,
            pad_boost_phase: 0.8,
            pad_boost: 14.0,
            vine_search_radius: 2.0,
            vine_capture_radius: 1.0,
            vine_regrab_delay: 0.5,
        }
    }
}

/// Circular island carved back up inside the lake basin.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IslandConfig {
    /// Island centre on the XZ plane.
    pub center: Vec2,
    pub radius: f32,
    /// Height of the island plateau.
    pub top_y: f32,
    /// Width of the rim over which the island blends into the lake bed.
    pub edge_blend: f32,
}

/// Terrain zones: the single authority for where the lake basin is.
///
/// Both the unified ground function and the engine-routing predicate read
/// these values, so they can never drift apart.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub basin_min: Vec2,
    pub basin_max: Vec2,
    /// Width of the basin rim over which the terrain blends down to the lake bed.
    pub basin_edge_blend: f32,
    pub lake_surface_y: f32,
    pub lake_bottom_y: f32,
    pub island: Option<IslandConfig>,
    /// Water surface height above a blocked cave gate.
    pub gate_water_height: f32,
    /// Horizontal distance around a blocked gate that counts as flooded.
    pub gate_capture_radius: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            basin_min: Vec2::new(-40.0, 20.0),
            basin_max: Vec2::new(40.0, 90.0),
            basin_edge_blend: 8.0,
            lake_surface_y: 1.5,
            lake_bottom_y: -4.0,
            island: Some(IslandConfig {
                center: Vec2::new(0.0, 55.0),
                radius: 8.0,
                top_y: 3.0,
                edge_blend: 3.0,
            }),
            gate_water_height: 1.0,
            gate_capture_radius: 4.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: f32,
    /// When false every query scans the full registry (debug / comparison).
    pub enabled: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 16.0,
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub movement: MovementConfig,
    pub swim: SwimConfig,
    pub abilities: AbilityConfig,
    pub collision: CollisionConfig,
    pub zones: ZoneConfig,
    pub grid: GridConfig,
}

impl PhysicsConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Spawn height used by the demo scene and tests: well above any terrain.
    pub fn spawn_point(&self) -> Vec3 {
        Vec3::new(0.0, 10.0, 0.0)
    }
}
