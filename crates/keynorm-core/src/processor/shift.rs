// Shift tap/hold: held Shift behaves like plain Shift, a quick lone tap
// latches sticky shift for the next shiftable key.

use super::state::ShiftTracking;
use super::KeyEventProcessor;
use crate::event::OutputEvent;
use crate::{Action, Key};

impl KeyEventProcessor {
    pub(super) fn handle_shift(&mut self, key: Key, action: Action, now: f64) -> Vec<OutputEvent> {
        match action {
            Action::Press => {
                self.state.shift = ShiftTracking::Timing {
                    key,
                    pressed_at: now,
                    interrupted: false,
                };
            }
            Action::Release => {
                if let ShiftTracking::Timing {
                    key: timed,
                    pressed_at,
                    interrupted,
                } = self.state.shift
                {
                    if timed == key {
                        let held_for = now - pressed_at;
                        if held_for < self.config.timings.shift_tap && !interrupted {
                            log::debug!("sticky shift latched ({} tapped {:.3}s)", key, held_for);
                            self.state.sticky_shift = true;
                        }
                        self.state.shift = ShiftTracking::Idle;
                    }
                }
            }
            Action::Repeat => {}
        }

        vec![OutputEvent::key(key, action)]
    }

    /// Another key went down while Shift is timed: that Shift is a hold
    pub(super) fn note_key_during_shift(&mut self) {
        if let ShiftTracking::Timing { interrupted, .. } = &mut self.state.shift {
            *interrupted = true;
        }
    }
}
