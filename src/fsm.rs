/// Holds the player's current movement mode plus the one it replaced.
///
/// Variants are compared by discriminant, so a mode carrying data (like
/// `Dancing`) counts as the same mode whatever its payload. Which transitions
/// are allowed is decided by `systems::player`.
#[derive(Clone, Debug)]
pub struct StateMachine<S: Clone> {
    pub state: S,
    pub previous: S,
    /// Seconds since the last transition.
    pub elapsed: f32,
}

impl<S: Clone> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            previous: initial.clone(),
            state: initial,
            elapsed: 0.0,
        }
    }

    /// Switch to `next` unless already in that variant. Returns whether the
    /// mode changed; the old variant's payload is dropped on the way out.
    pub fn go(&mut self, next: S) -> bool {
        if self.is(&next) {
            return false;
        }
        self.previous = std::mem::replace(&mut self.state, next);
        self.elapsed = 0.0;
        true
    }

    pub fn is(&self, other: &S) -> bool {
        std::mem::discriminant(&self.state) == std::mem::discriminant(other)
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Gait {
        Idle,
        Hop { height: f32 },
    }

    #[test]
    fn same_variant_is_not_a_transition() {
        let mut fsm = StateMachine::new(Gait::Hop { height: 1.0 });
        fsm.tick(0.25);
        assert!(!fsm.go(Gait::Hop { height: 3.0 }));
        assert_eq!(fsm.state, Gait::Hop { height: 1.0 });
        assert_eq!(fsm.elapsed, 0.25);
    }

    #[test]
    fn transition_keeps_the_old_state() {
        let mut fsm = StateMachine::new(Gait::Idle);
        fsm.tick(2.0);
        assert!(fsm.go(Gait::Hop { height: 0.5 }));
        assert_eq!(fsm.previous, Gait::Idle);
        assert_eq!(fsm.elapsed, 0.0);
        assert!(fsm.is(&Gait::Hop { height: 9.0 }));
    }
}
