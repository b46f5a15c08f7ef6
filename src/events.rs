use glam::Vec3;
use hecs::Entity;

/// Discrete things that happened during one controller step, for VFX,
/// audio and discovery collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsEvent {
    /// Grounded jump or air jump. `air` is true for the ability double jump.
    Jump { air: bool },
    Dash { direction: Vec3 },
    /// Ground contact after being airborne; `impact` is the vertical speed at contact.
    Land { impact: f32 },
    TrampolineBounce { mushroom: Entity, kick: f32 },
    MushroomLanding { mushroom: Entity },
    CloudPlatform { cloud: Entity },
    VineGrab { vine: Entity },
    VineRelease { vine: Entity },
    Splash,
    GeyserLift { geyser: Entity },
    PadBoost { pad: Entity },
    WaterGatePush { cave: Entity },
    PhaseStarted,
    PhaseEnded,
    PhaseDenied,
}

impl PhysicsEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Jump { air: false } => "jump",
            Self::Jump { air: true } => "air_jump",
            Self::Dash { .. } => "dash",
            Self::Land { .. } => "land",
            Self::TrampolineBounce { .. } => "trampoline_bounce",
            Self::MushroomLanding { .. } => "mushroom_landing",
            Self::CloudPlatform { .. } => "cloud_platform",
            Self::VineGrab { .. } => "vine_grab",
            Self::VineRelease { .. } => "vine_release",
            Self::Splash => "splash",
            Self::GeyserLift { .. } => "geyser_lift",
            Self::PadBoost { .. } => "pad_boost",
            Self::WaterGatePush { .. } => "water_gate_push",
            Self::PhaseStarted => "phase_started",
            Self::PhaseEnded => "phase_ended",
            Self::PhaseDenied => "phase_denied",
        }
    }
}

/// Everything a step produced besides the mutated player state.
#[derive(Clone, Debug, Default)]
pub struct StepReport {
    pub events: Vec<PhysicsEvent>,
    /// The compiled engine was authoritative this frame.
    pub used_fast_path: bool,
}

impl StepReport {
    pub fn push(&mut self, event: PhysicsEvent) {
        self.events.push(event);
    }

    pub fn contains(&self, pred: impl Fn(&PhysicsEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}
