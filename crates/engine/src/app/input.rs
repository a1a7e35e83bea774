use winit::keyboard::KeyCode;

/// Keys whose held state matters between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Raise,
    Lower,
    Quit,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Raise,
        InputAction::Lower,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Raise => 4,
            InputAction::Lower => 5,
            InputAction::Quit => 6,
        }
    }

    pub(crate) fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowUp => Some(InputAction::MoveUp),
            KeyCode::ArrowDown => Some(InputAction::MoveDown),
            KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
            KeyCode::ArrowRight => Some(InputAction::MoveRight),
            KeyCode::PageUp => Some(InputAction::Raise),
            KeyCode::PageDown => Some(InputAction::Lower),
            KeyCode::Escape => Some(InputAction::Quit),
            _ => None,
        }
    }
}

/// Keys that act once per press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEdge {
    Place,
    Rotate,
    NextAsset,
    PrevAsset,
    Deselect,
    CycleFloorSkin,
    CycleWallSkin,
    Save,
    Load,
    NewRoom,
}

const EDGE_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeyEdges {
    pressed: [bool; EDGE_COUNT],
}

impl KeyEdges {
    pub(crate) fn set(&mut self, edge: KeyEdge, pressed: bool) {
        self.pressed[edge.index()] = pressed;
    }

    pub(crate) fn is_pressed(&self, edge: KeyEdge) -> bool {
        self.pressed[edge.index()]
    }
}

impl KeyEdge {
    const fn index(self) -> usize {
        match self {
            KeyEdge::Place => 0,
            KeyEdge::Rotate => 1,
            KeyEdge::NextAsset => 2,
            KeyEdge::PrevAsset => 3,
            KeyEdge::Deselect => 4,
            KeyEdge::CycleFloorSkin => 5,
            KeyEdge::CycleWallSkin => 6,
            KeyEdge::Save => 7,
            KeyEdge::Load => 8,
            KeyEdge::NewRoom => 9,
        }
    }

    pub(crate) fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Enter | KeyCode::NumpadEnter => Some(KeyEdge::Place),
            KeyCode::KeyR => Some(KeyEdge::Rotate),
            KeyCode::BracketRight => Some(KeyEdge::NextAsset),
            KeyCode::BracketLeft => Some(KeyEdge::PrevAsset),
            KeyCode::Backspace => Some(KeyEdge::Deselect),
            KeyCode::KeyF => Some(KeyEdge::CycleFloorSkin),
            KeyCode::KeyG => Some(KeyEdge::CycleWallSkin),
            KeyCode::F5 => Some(KeyEdge::Save),
            KeyCode::F9 => Some(KeyEdge::Load),
            KeyCode::KeyN => Some(KeyEdge::NewRoom),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_indices_are_distinct() {
        let mut states = ActionStates::default();
        for action in InputAction::ALL {
            states.set(action, true);
            for other in InputAction::ALL {
                assert_eq!(states.is_down(other), other == action);
            }
            states.set(action, false);
        }
    }

    #[test]
    fn arrows_and_page_keys_map_to_held_actions() {
        assert_eq!(InputAction::from_key(KeyCode::ArrowLeft), Some(InputAction::MoveLeft));
        assert_eq!(InputAction::from_key(KeyCode::PageUp), Some(InputAction::Raise));
        assert_eq!(InputAction::from_key(KeyCode::PageDown), Some(InputAction::Lower));
        assert_eq!(InputAction::from_key(KeyCode::KeyR), None);
    }

    #[test]
    fn edge_keys_do_not_overlap_held_actions() {
        let keys = [
            KeyCode::Enter,
            KeyCode::KeyR,
            KeyCode::BracketLeft,
            KeyCode::BracketRight,
            KeyCode::Backspace,
            KeyCode::KeyF,
            KeyCode::KeyG,
            KeyCode::F5,
            KeyCode::F9,
            KeyCode::KeyN,
        ];
        let mut edges = KeyEdges::default();
        for key in keys {
            let edge = KeyEdge::from_key(key).expect("edge key");
            assert!(InputAction::from_key(key).is_none());
            assert!(!edges.is_pressed(edge), "{key:?} maps to a shared edge");
            edges.set(edge, true);
        }
    }
}
