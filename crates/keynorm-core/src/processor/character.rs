// Character tap/hold for shiftable keys (letters, digits, punctuation).
//
// The Down is held back. A quick release emits a tap, shifted when sticky
// shift or caps lock call for it; holding past the threshold emits Shift+key
// and keeps both down until the key is released. Only one key is buffered at
// a time; other shiftable keys pressed meanwhile are forwarded untouched.

use super::state::CharState;
use super::{KeyEventProcessor, SYNTHETIC_SHIFT};
use crate::classify::is_letter;
use crate::event::OutputEvent;
use crate::{Action, Key};

impl KeyEventProcessor {
    pub(super) fn handle_character(&mut self, key: Key, action: Action, now: f64) -> Vec<OutputEvent> {
        let is_buffered = self.state.chars.key() == Some(key);

        // Real Shift is down: type normally. A release of the buffered key
        // still has to close out its buffer.
        if self.state.physical_shift_held() && (action == Action::Press || !is_buffered) {
            if action == Action::Press && self.state.sticky_shift {
                log::debug!("sticky shift consumed by physical shift + {}", key);
                self.state.sticky_shift = false;
            }
            return vec![OutputEvent::key(key, action)];
        }

        match action {
            Action::Press => match self.state.chars {
                CharState::Idle => {
                    self.state.chars = CharState::Buffered {
                        key,
                        pressed_at: now,
                    };
                    Vec::new()
                }
                // Already buffered, the key is down in our books
                _ if is_buffered => Vec::new(),
                _ => vec![OutputEvent::key(key, action)],
            },
            Action::Release if is_buffered => {
                let output = match self.state.chars {
                    CharState::LongPressed { .. } => {
                        vec![OutputEvent::release(key), OutputEvent::release(SYNTHETIC_SHIFT)]
                    }
                    _ => self.tap(key),
                };
                self.state.chars = CharState::Idle;
                output
            }
            Action::Repeat if is_buffered => match self.state.chars {
                CharState::LongPressed { .. } => vec![OutputEvent::repeat(key)],
                _ => self.check_char_long_press(now),
            },
            Action::Release | Action::Repeat => vec![OutputEvent::key(key, action)],
        }
    }

    pub(super) fn check_char_long_press(&mut self, now: f64) -> Vec<OutputEvent> {
        match self.state.chars {
            CharState::Buffered { key, pressed_at }
                if now - pressed_at >= self.config.timings.key_long_press =>
            {
                log::debug!("long-press {} after {:.3}s", key, now - pressed_at);
                self.state.chars = CharState::LongPressed { key, pressed_at };
                vec![OutputEvent::press(SYNTHETIC_SHIFT), OutputEvent::press(key)]
            }
            _ => Vec::new(),
        }
    }

    fn tap(&mut self, key: Key) -> Vec<OutputEvent> {
        if self.take_shift_for(key) {
            vec![
                OutputEvent::press(SYNTHETIC_SHIFT),
                OutputEvent::press(key),
                OutputEvent::release(key),
                OutputEvent::release(SYNTHETIC_SHIFT),
            ]
        } else {
            vec![OutputEvent::press(key), OutputEvent::release(key)]
        }
    }

    /// Decide whether a tap of `key` is shifted, consuming sticky shift.
    ///
    /// Letters follow `caps_lock XOR sticky_shift`; other shiftable keys
    /// only follow sticky shift.
    fn take_shift_for(&mut self, key: Key) -> bool {
        let sticky = std::mem::take(&mut self.state.sticky_shift);
        if is_letter(key) {
            self.state.caps_lock ^ sticky
        } else {
            sticky
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::event::{EventKind, OutputEvent};
    use crate::processor::{KeyEventProcessor, SYNTHETIC_SHIFT};
    use crate::{Action, Key};

    fn send(p: &mut KeyEventProcessor, key: Key, action: Action, t: f64) -> Vec<OutputEvent> {
        p.process_event(EventKind::Key, key, action, Some(t))
    }

    fn plain_tap(key: Key) -> Vec<OutputEvent> {
        vec![OutputEvent::press(key), OutputEvent::release(key)]
    }

    fn shifted_tap(key: Key) -> Vec<OutputEvent> {
        vec![
            OutputEvent::press(SYNTHETIC_SHIFT),
            OutputEvent::press(key),
            OutputEvent::release(key),
            OutputEvent::release(SYNTHETIC_SHIFT),
        ]
    }

    fn latch_sticky(p: &mut KeyEventProcessor, t: f64) {
        send(p, Key::LEFT_SHIFT, Action::Press, t);
        send(p, Key::LEFT_SHIFT, Action::Release, t + 0.05);
        assert!(p.sticky_shift());
    }

    #[test]
    fn test_quick_tap_is_buffered_until_release() {
        let mut p = KeyEventProcessor::default();
        assert!(send(&mut p, Key::A, Action::Press, 0.0).is_empty());
        assert_eq!(p.snapshot().char_buffered_key, Some(Key::A));
        assert_eq!(send(&mut p, Key::A, Action::Release, 0.1), plain_tap(Key::A));
        assert_eq!(p.snapshot().char_buffered_key, None);
    }

    #[test]
    fn test_long_press_via_repeat() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::KEY_1, Action::Press, 0.0);
        assert!(send(&mut p, Key::KEY_1, Action::Repeat, 0.3).is_empty());

        // The opportunistic pending check fires first, then the repeat itself
        assert_eq!(
            send(&mut p, Key::KEY_1, Action::Repeat, 0.45),
            vec![
                OutputEvent::press(SYNTHETIC_SHIFT),
                OutputEvent::press(Key::KEY_1),
                OutputEvent::repeat(Key::KEY_1),
            ]
        );
        assert_eq!(
            send(&mut p, Key::KEY_1, Action::Repeat, 0.5),
            vec![OutputEvent::repeat(Key::KEY_1)]
        );
        assert_eq!(
            send(&mut p, Key::KEY_1, Action::Release, 0.6),
            vec![OutputEvent::release(Key::KEY_1), OutputEvent::release(SYNTHETIC_SHIFT)]
        );
    }

    #[test]
    fn test_long_press_does_not_consume_sticky_shift() {
        let mut p = KeyEventProcessor::default();
        latch_sticky(&mut p, 0.0);
        send(&mut p, Key::A, Action::Press, 1.0);
        p.check_pending_events(Some(1.5));
        send(&mut p, Key::A, Action::Release, 1.6);
        assert!(p.sticky_shift());
    }

    #[test]
    fn test_sticky_shift_applies_to_punctuation_once() {
        let mut p = KeyEventProcessor::default();
        latch_sticky(&mut p, 0.0);
        send(&mut p, Key::SLASH, Action::Press, 0.2);
        assert_eq!(send(&mut p, Key::SLASH, Action::Release, 0.25), shifted_tap(Key::SLASH));
        assert!(!p.sticky_shift());

        send(&mut p, Key::SLASH, Action::Press, 0.4);
        assert_eq!(send(&mut p, Key::SLASH, Action::Release, 0.45), plain_tap(Key::SLASH));
    }

    #[test]
    fn test_caps_lock_shifts_letters_only() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::CAPSLOCK, Action::Press, 0.0);
        send(&mut p, Key::CAPSLOCK, Action::Release, 0.05);

        send(&mut p, Key::B, Action::Press, 0.1);
        assert_eq!(send(&mut p, Key::B, Action::Release, 0.15), shifted_tap(Key::B));

        send(&mut p, Key::KEY_2, Action::Press, 0.2);
        assert_eq!(send(&mut p, Key::KEY_2, Action::Release, 0.25), plain_tap(Key::KEY_2));
    }

    #[test]
    fn test_caps_lock_and_sticky_cancel_out_for_letters() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::CAPSLOCK, Action::Press, 0.0);
        latch_sticky(&mut p, 0.1);

        send(&mut p, Key::C, Action::Press, 0.3);
        assert_eq!(send(&mut p, Key::C, Action::Release, 0.35), plain_tap(Key::C));
        assert!(!p.sticky_shift());
    }

    #[test]
    fn test_caps_lock_and_sticky_shift_digit() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::CAPSLOCK, Action::Press, 0.0);
        latch_sticky(&mut p, 0.1);

        send(&mut p, Key::KEY_3, Action::Press, 0.3);
        assert_eq!(send(&mut p, Key::KEY_3, Action::Release, 0.35), shifted_tap(Key::KEY_3));
    }

    #[test]
    fn test_physical_shift_bypasses_buffering() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::LEFT_SHIFT, Action::Press, 0.0);
        assert_eq!(
            send(&mut p, Key::A, Action::Press, 0.1),
            vec![OutputEvent::press(Key::A)]
        );
        assert_eq!(
            send(&mut p, Key::A, Action::Repeat, 0.6),
            vec![OutputEvent::repeat(Key::A)]
        );
        assert_eq!(
            send(&mut p, Key::A, Action::Release, 0.7),
            vec![OutputEvent::release(Key::A)]
        );
        assert_eq!(p.snapshot().char_buffered_key, None);
    }

    #[test]
    fn test_physical_shift_consumes_sticky_shift() {
        let mut p = KeyEventProcessor::default();
        latch_sticky(&mut p, 0.0);
        send(&mut p, Key::RIGHT_SHIFT, Action::Press, 1.0);
        send(&mut p, Key::A, Action::Press, 1.1);
        assert!(!p.sticky_shift());
    }

    #[test]
    fn test_release_of_buffered_key_while_shift_held_closes_buffer() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::A, Action::Press, 0.0);
        send(&mut p, Key::LEFT_SHIFT, Action::Press, 0.1);
        assert_eq!(send(&mut p, Key::A, Action::Release, 0.2), plain_tap(Key::A));
        assert_eq!(p.snapshot().char_buffered_key, None);
        assert!(p.check_pending_events(Some(5.0)).is_empty());
    }

    #[test]
    fn test_second_key_while_buffered_is_forwarded() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::A, Action::Press, 0.0);
        assert_eq!(
            send(&mut p, Key::S, Action::Press, 0.05),
            vec![OutputEvent::press(Key::S)]
        );
        assert_eq!(p.snapshot().char_buffered_key, Some(Key::A));
        assert_eq!(
            send(&mut p, Key::S, Action::Release, 0.1),
            vec![OutputEvent::release(Key::S)]
        );
        assert_eq!(p.snapshot().char_buffered_key, Some(Key::A));
        assert_eq!(send(&mut p, Key::A, Action::Release, 0.15), plain_tap(Key::A));
    }

    #[test]
    fn test_second_key_does_not_consume_sticky_shift() {
        let mut p = KeyEventProcessor::default();
        latch_sticky(&mut p, 0.0);
        send(&mut p, Key::A, Action::Press, 0.2);
        send(&mut p, Key::S, Action::Press, 0.25);
        send(&mut p, Key::S, Action::Release, 0.3);
        assert!(p.sticky_shift());
        assert_eq!(send(&mut p, Key::A, Action::Release, 0.35), shifted_tap(Key::A));
    }

    #[test]
    fn test_duplicate_press_of_buffered_key_keeps_buffer() {
        let mut p = KeyEventProcessor::default();
        send(&mut p, Key::A, Action::Press, 0.0);
        assert!(send(&mut p, Key::A, Action::Press, 0.1).is_empty());
        assert_eq!(p.snapshot().char_press_time, Some(0.0));
    }
}
