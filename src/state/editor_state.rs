/// Drawing-session state machine for the canvas.
///
/// A stroke starts with a pointer press and lasts until the pointer is
/// released or leaves the canvas:
///
/// ```text
///  ┌──────────┐   press    ┌─────────────┐
///  │          ├────────────►             │
///  │   Idle   │            │   Drawing   ├──┐ move: stamp brush,
///  │          ◄────────────┤             ◄──┘ record sample
///  └──────────┘ release /  └─────────────┘
///                 leave
/// ```
///
/// Leaving `Drawing` clears the brush motion history so speed is never
/// computed against a point from a previous stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// No pointer button held over the canvas
    #[default]
    Idle,
    /// A stroke is in progress
    Drawing,
}

impl EditorState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &EditorState) -> bool {
        matches!(
            (self, new_state),
            (EditorState::Idle, EditorState::Drawing) | (EditorState::Drawing, EditorState::Idle)
        )
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, EditorState::Drawing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Drawing => "Drawing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_drawing_toggles_are_valid() {
        assert!(EditorState::Idle.can_transition_to(&EditorState::Drawing));
        assert!(EditorState::Drawing.can_transition_to(&EditorState::Idle));
        assert!(!EditorState::Idle.can_transition_to(&EditorState::Idle));
        assert!(!EditorState::Drawing.can_transition_to(&EditorState::Drawing));
    }
}
