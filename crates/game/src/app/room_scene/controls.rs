use engine::{InputAction, InputSnapshot};

pub(crate) const MOVE_REPEAT_TICKS: u32 = 2;
pub(crate) const BLINK_PERIOD_TICKS: u64 = 4;

/// Held keys in priority order; only the first one down moves the ghost.
const MOVE_BINDINGS: [(InputAction, (i32, i32, i32)); 6] = [
    (InputAction::MoveLeft, (-1, 0, 0)),
    (InputAction::MoveRight, (1, 0, 0)),
    (InputAction::MoveUp, (0, -1, 0)),
    (InputAction::MoveDown, (0, 1, 0)),
    (InputAction::Raise, (0, 0, 1)),
    (InputAction::Lower, (0, 0, -1)),
];

#[derive(Debug, Default)]
pub(crate) struct MoveRepeat {
    active: Option<InputAction>,
    held_ticks: u32,
}

impl MoveRepeat {
    /// Delta to attempt this tick. Fires on the press tick, then every `MOVE_REPEAT_TICKS`.
    pub(crate) fn step(&mut self, input: &InputSnapshot) -> Option<(i32, i32, i32)> {
        let Some((action, delta)) = MOVE_BINDINGS
            .iter()
            .copied()
            .find(|(action, _)| input.is_down(*action))
        else {
            self.active = None;
            self.held_ticks = 0;
            return None;
        };

        if self.active != Some(action) {
            self.active = Some(action);
            self.held_ticks = 0;
            return Some(delta);
        }
        self.held_ticks = self.held_ticks.saturating_add(1);
        (self.held_ticks % MOVE_REPEAT_TICKS == 0).then_some(delta)
    }
}

pub(crate) fn ghost_blink_visible(tick: u64) -> bool {
    (tick / BLINK_PERIOD_TICKS) % 2 == 0
}
