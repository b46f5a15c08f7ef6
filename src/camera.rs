use glam::Vec3;

/// The camera pose the controller reads each frame.
///
/// The controller only needs where the camera looks (movement is
/// camera-relative), where it is (the vine swing moves it and the player
/// follows), and its roll (dance mode tilts it).
#[derive(Clone, Copy, Debug)]
pub struct CameraPose {
    pub position: Vec3,
    pub forward: Vec3,
    /// Roll around the view axis in radians.
    pub roll: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward,
            roll: 0.0,
        }
    }

    /// Build a pose from yaw/pitch in degrees (yaw -90 looks down -Z).
    pub fn from_yaw_pitch(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let yaw_rad = yaw.to_radians();
        let pitch_rad = pitch.to_radians();
        let forward = Vec3::new(
            yaw_rad.cos() * pitch_rad.cos(),
            pitch_rad.sin(),
            yaw_rad.sin() * pitch_rad.cos(),
        );
        Self::new(position, forward)
    }

    /// Camera forward projected onto the XZ plane and normalized.
    /// Looking straight up or down has no horizontal heading; fall back to -Z.
    pub fn flat_forward(&self) -> Vec3 {
        let flat = Vec3::new(self.forward.x, 0.0, self.forward.z);
        flat.try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// Horizontal right vector, perpendicular to [`flat_forward`](Self::flat_forward).
    pub fn flat_right(&self) -> Vec3 {
        self.flat_forward().cross(Vec3::Y).normalize()
    }

    /// Yaw of the flat heading in radians (0 = -Z).
    pub fn heading(&self) -> f32 {
        let f = self.flat_forward();
        f.x.atan2(-f.z)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}
