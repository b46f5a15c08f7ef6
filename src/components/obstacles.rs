//! Obstacle components stored in the world's hecs arena.
//!
//! Each obstacle entity carries a [`LocalTransform`](super::LocalTransform)
//! plus one of the shape components below. Dimensions are sanitized when the
//! obstacle is registered (see `scene::prefabs`), so collision math can use
//! them directly.

use glam::Vec3;

/// A mushroom: solid cap platform, or a trampoline when `trampoline` is set.
#[derive(Clone, Copy, Debug)]
pub struct Mushroom {
    pub cap_radius: f32,
    /// Height of the cap's top surface above the mushroom's base position.
    pub cap_height: f32,
    pub stem_radius: f32,
    /// Base upward speed of a trampoline bounce.
    pub bounce_force: f32,
    pub trampoline: bool,
    /// Visual squash amount, set to 1.0 on a bounce. The renderer decays it.
    pub squash: f32,
}

impl Mushroom {
    pub fn cap_top(&self, base: Vec3) -> f32 {
        base.y + self.cap_height
    }
}

/// A cloud. Only tier 1 clouds are solid.
///
/// `radius` and `top_offset` are derived from the transform scale when the
/// cloud is registered.
#[derive(Clone, Copy, Debug)]
pub struct Cloud {
    pub tier: u8,
    pub radius: f32,
    /// Height of the top surface above the cloud's centre.
    pub top_offset: f32,
}

impl Cloud {
    pub fn is_solid(&self) -> bool {
        self.tier == 1
    }
}

/// A cave whose mouth may be flooded.
#[derive(Clone, Copy, Debug)]
pub struct Cave {
    /// Gate point in the cave's local space.
    pub gate_position: Vec3,
    /// A blocked gate holds water: walkers are pushed back, swimmers pass.
    pub is_blocked: bool,
}

/// A geyser with a cylindrical plume.
#[derive(Clone, Copy, Debug)]
pub struct Geyser {
    pub radius: f32,
    /// Plume height at full eruption strength.
    pub plume_height: f32,
    /// Current eruption strength, 0..1, driven by the world's animation.
    pub eruption_strength: f32,
}

/// A bobbing panning pad.
#[derive(Clone, Copy, Debug)]
pub struct PanningPad {
    pub radius: f32,
    /// Bob cycle position, 0..1, driven by the world's animation.
    pub bob_phase: f32,
    /// Current visual height offset of the pad top from its transform.
    pub bob_offset: f32,
}

impl PanningPad {
    pub fn top(&self, base: Vec3) -> f32 {
        base.y + self.bob_offset
    }
}
