// Escape long-press: the Down is held back until the Up (plain Escape tap)
// or the hold threshold (F24 signal, and nothing else for that press).

use super::state::EscapeState;
use super::{KeyEventProcessor, LONG_PRESS_ESCAPE_KEY};
use crate::event::OutputEvent;
use crate::{Action, Key};

impl KeyEventProcessor {
    pub(super) fn handle_escape(&mut self, action: Action, now: f64) -> Vec<OutputEvent> {
        match action {
            Action::Press => {
                self.state.escape = EscapeState::Buffered { pressed_at: now };
                Vec::new()
            }
            Action::Release => {
                let output = match self.state.escape {
                    EscapeState::Buffered { .. } => {
                        vec![OutputEvent::press(Key::ESC), OutputEvent::release(Key::ESC)]
                    }
                    EscapeState::LongPressFired { .. } | EscapeState::Idle => Vec::new(),
                };
                self.state.escape = EscapeState::Idle;
                output
            }
            Action::Repeat => self.check_escape_long_press(now),
        }
    }

    pub(super) fn check_escape_long_press(&mut self, now: f64) -> Vec<OutputEvent> {
        match self.state.escape {
            EscapeState::Buffered { pressed_at }
                if now - pressed_at >= self.config.timings.escape_hold =>
            {
                log::debug!("escape long-press after {:.3}s", now - pressed_at);
                self.state.escape = EscapeState::LongPressFired { pressed_at };
                vec![
                    OutputEvent::press(LONG_PRESS_ESCAPE_KEY),
                    OutputEvent::release(LONG_PRESS_ESCAPE_KEY),
                ]
            }
            _ => Vec::new(),
        }
    }
}
