use std::collections::HashSet;

/// Logical player actions, already mapped from whatever device produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Sprint,
    Sneak,
    Dash,
    Phase,
    Dance,
}

/// Actions held down this frame.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    pub keys: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(actions: &[Action]) -> Self {
        Self {
            keys: actions.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, action: Action) {
        self.keys.insert(action);
    }

    /// Release an action. Also used to "consume" jump after a bounce so a held
    /// key does not fire again on the same frame.
    pub fn release(&mut self, action: Action) {
        self.keys.remove(&action);
    }

    pub fn is_key_held(&self, action: Action) -> bool {
        self.keys.contains(&action)
    }
}

/// One-frame-delayed copy of the held actions, for edge-triggered abilities.
///
/// `latch` is called at the end of every step regardless of the active mode,
/// so a press that lands on a mode switch is never missed or double-counted.
#[derive(Clone, Debug, Default)]
pub struct InputEdges {
    previous: HashSet<Action>,
}

impl InputEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `action` is held now but was not held at the last latch.
    pub fn was_pressed(&self, action: Action, input: &InputState) -> bool {
        input.is_key_held(action) && !self.previous.contains(&action)
    }

    /// Record the current input as "last frame".
    pub fn latch(&mut self, input: &InputState) {
        self.previous.clone_from(&input.keys);
    }

    /// Record `action` as held last frame even if it was consumed (released)
    /// this frame, so holding the key does not fire it again.
    pub fn mark_held(&mut self, action: Action) {
        self.previous.insert(action);
    }

    /// Treat everything currently held as already seen, discarding pending edges.
    pub fn suppress(&mut self, input: &InputState) {
        self.previous.extend(input.keys.iter().copied());
    }
}
