use glam::Vec3;

/// Per-frame snapshot from the audio/environment collaborator.
#[derive(Clone, Copy, Debug)]
pub struct AudioSnapshot {
    /// Kick drum intensity, 0..1, peaks on the beat.
    pub kick_trigger: f32,
    /// How "groovy" the current section is, 0..1.
    pub groove_amount: f32,
    pub bpm: f32,
    /// Position inside the current beat, 0..1.
    pub beat_phase: f32,
    /// Weather wind in world units per second.
    pub wind: Vec3,
}

impl Default for AudioSnapshot {
    fn default() -> Self {
        Self {
            kick_trigger: 0.0,
            groove_amount: 0.0,
            bpm: 120.0,
            beat_phase: 0.0,
            wind: Vec3::ZERO,
        }
    }
}

/// Modifiers derived from the snapshot before any mode handler runs.
#[derive(Clone, Copy, Debug)]
pub struct EnvironmentModifiers {
    pub gravity_multiplier: f32,
    pub wind: Vec3,
}

/// Groove lightens gravity by up to this fraction.
const GROOVE_GRAVITY_RELIEF: f32 = 0.3;

impl AudioSnapshot {
    pub fn modifiers(&self) -> EnvironmentModifiers {
        let groove = sanitize_unit(self.groove_amount);
        let wind = if self.wind.is_finite() { self.wind } else { Vec3::ZERO };
        EnvironmentModifiers {
            gravity_multiplier: 1.0 - GROOVE_GRAVITY_RELIEF * groove,
            wind: Vec3::new(wind.x, 0.0, wind.z),
        }
    }

    /// Kick intensity clamped to 0..1 (NaN reads as silence).
    pub fn kick(&self) -> f32 {
        sanitize_unit(self.kick_trigger)
    }

    /// Position inside the beat, 0..1 (garbage reads as the downbeat).
    pub fn phase(&self) -> f32 {
        if self.beat_phase.is_finite() {
            self.beat_phase.rem_euclid(1.0)
        } else {
            0.0
        }
    }

    /// Beats per second, never zero.
    pub fn beats_per_second(&self) -> f32 {
        if self.bpm.is_finite() && self.bpm > 1.0 {
            self.bpm / 60.0
        } else {
            2.0
        }
    }
}

fn sanitize_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
