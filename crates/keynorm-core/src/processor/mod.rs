// Keynorm Key Event Processor
// Deterministic state machine from raw key transitions to normalized output
//
// One raw event goes in, zero or more output events come out. All timing
// decisions compare the injected timestamp with recorded press times, so the
// same input sequence always produces the same output.
//
// Mechanisms:
// - Shift tap/hold: a quick lone tap of Shift latches sticky shift
// - Escape long-press: tap emits Escape, hold emits the F24 signal instead
// - Character tap/hold: tap emits the key (shifted by sticky/caps state),
//   hold emits Shift+key
// - Caps lock toggle and extra-key remapping

mod character;
mod escape;
mod shift;
pub mod state;

use crate::classify::{is_shift, is_shiftable};
use crate::event::{now_seconds, EventKind, OutputEvent, RawKeyEvent};
use crate::extra_keys::ExtraKeyMap;
use crate::{Action, Key};

pub use state::{ProcessorSnapshot, Timings, ESCAPE_HOLD, KEY_LONG_PRESS, SHIFT_TAP};

use state::{CharState, EscapeState, ProcessorState};

/// Virtual key emitted (as a Down/Up pair) when Escape is long-pressed
pub const LONG_PRESS_ESCAPE_KEY: Key = Key::F24;

/// Shift key used for synthesized shifted output
pub const SYNTHETIC_SHIFT: Key = Key::LEFT_SHIFT;

/// Construction parameters for a processor
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Remap table for extra device keys
    pub extra_keys: ExtraKeyMap,
    /// Key whose press toggles caps lock
    pub caps_lock_key: Key,
    pub timings: Timings,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            extra_keys: ExtraKeyMap::new(),
            caps_lock_key: Key::CAPSLOCK,
            timings: Timings::default(),
        }
    }
}

/// Keyboard event normalization engine.
///
/// Owns its state exclusively. Not thread-safe by design; the host feeds
/// events in hardware order from a single loop.
#[derive(Debug, Clone)]
pub struct KeyEventProcessor {
    config: ProcessorConfig,
    state: ProcessorState,
}

impl KeyEventProcessor {
    /// Create a processor with default timings. No I/O happens here.
    pub fn new(extra_keys: ExtraKeyMap, caps_lock_key: Key) -> Self {
        Self::with_config(ProcessorConfig {
            extra_keys,
            caps_lock_key,
            ..ProcessorConfig::default()
        })
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            state: ProcessorState::default(),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process one raw event.
    ///
    /// `timestamp` is in seconds; `None` uses the wall clock. Tests pass
    /// explicit timestamps to drive the timing logic deterministically.
    pub fn process_event(
        &mut self,
        kind: EventKind,
        key: Key,
        action: Action,
        timestamp: Option<f64>,
    ) -> Vec<OutputEvent> {
        if !kind.is_key() {
            return vec![OutputEvent::new(kind, key, action)];
        }

        let now = timestamp.unwrap_or_else(now_seconds);
        log::trace!("in: {} {} @ {:.3}", key, action, now);

        self.state.track_held(key, action);

        if is_shift(key) {
            return self.handle_shift(key, action, now);
        }

        if action == Action::Press && key != Key::ESC {
            self.note_key_during_shift();
        }

        if key == Key::ESC {
            return self.handle_escape(action, now);
        }

        // A held key may cross its threshold exactly when another event
        // (often its own auto-repeat) arrives.
        let mut output = self.pending_long_presses(now);

        if key == self.config.caps_lock_key && action == Action::Press {
            self.state.caps_lock = !self.state.caps_lock;
            log::debug!("caps lock {}", if self.state.caps_lock { "on" } else { "off" });
            output.push(OutputEvent::key(key, action));
            return output;
        }

        let key = match self.config.extra_keys.get(key) {
            Some(mapped) => {
                log::trace!("extra key {} -> {}", key, mapped);
                mapped
            }
            None => key,
        };

        if is_shiftable(key) {
            output.extend(self.handle_character(key, action, now));
        } else {
            output.push(OutputEvent::key(key, action));
        }
        output
    }

    /// Process a [`RawKeyEvent`] using its own timestamp
    pub fn process_raw(&mut self, event: &RawKeyEvent) -> Vec<OutputEvent> {
        self.process_event(event.kind, event.key, event.action, Some(event.timestamp))
    }

    /// Fire any long-press whose threshold has passed.
    ///
    /// The host must call this at a bounded interval while no raw events
    /// arrive, so keys without hardware auto-repeat still long-press on time.
    pub fn check_pending_events(&mut self, timestamp: Option<f64>) -> Vec<OutputEvent> {
        let now = timestamp.unwrap_or_else(now_seconds);
        self.pending_long_presses(now)
    }

    fn pending_long_presses(&mut self, now: f64) -> Vec<OutputEvent> {
        let mut output = self.check_escape_long_press(now);
        output.extend(self.check_char_long_press(now));
        output
    }

    /// Settle every in-flight buffer before the processor stops seeing events.
    ///
    /// Keys still physically down are handed over as plain Downs (their Up
    /// follows unprocessed), and a synthetic Shift from a long-press is
    /// released. Latched flags are left alone; see [`reset`](Self::reset).
    pub fn flush_pending(&mut self) -> Vec<OutputEvent> {
        let mut output = Vec::new();

        if let EscapeState::Buffered { .. } = self.state.escape {
            output.push(OutputEvent::press(Key::ESC));
        }
        match self.state.chars {
            CharState::Buffered { key, .. } => output.push(OutputEvent::press(key)),
            CharState::LongPressed { .. } => output.push(OutputEvent::release(SYNTHETIC_SHIFT)),
            CharState::Idle => {}
        }

        self.state.escape = EscapeState::Idle;
        self.state.chars = CharState::Idle;
        if !output.is_empty() {
            log::debug!("flushed pending: {:?}", output);
        }
        output
    }

    /// Drop all state, as on session teardown or suspend/resume
    pub fn reset(&mut self) {
        log::debug!("processor state reset");
        self.state = ProcessorState::default();
    }

    pub fn snapshot(&self) -> ProcessorSnapshot {
        self.state.snapshot()
    }

    pub fn sticky_shift(&self) -> bool {
        self.state.sticky_shift
    }

    pub fn caps_lock(&self) -> bool {
        self.state.caps_lock
    }
}

impl Default for KeyEventProcessor {
    fn default() -> Self {
        Self::with_config(ProcessorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(p: &mut KeyEventProcessor, key: Key, t: f64) -> Vec<OutputEvent> {
        p.process_event(EventKind::Key, key, Action::Press, Some(t))
    }

    fn release(p: &mut KeyEventProcessor, key: Key, t: f64) -> Vec<OutputEvent> {
        p.process_event(EventKind::Key, key, Action::Release, Some(t))
    }

    fn repeat(p: &mut KeyEventProcessor, key: Key, t: f64) -> Vec<OutputEvent> {
        p.process_event(EventKind::Key, key, Action::Repeat, Some(t))
    }

    #[test]
    fn test_other_events_pass_through() {
        let mut p = KeyEventProcessor::default();
        let out = p.process_event(EventKind::Other(0x04), Key::from(4), Action::Repeat, Some(0.0));
        assert_eq!(
            out,
            vec![OutputEvent::new(EventKind::Other(0x04), Key::from(4), Action::Repeat)]
        );
        assert_eq!(p.snapshot(), ProcessorSnapshot::default());
    }

    #[test]
    fn test_non_shiftable_keys_forward_immediately() {
        let mut p = KeyEventProcessor::default();
        assert_eq!(press(&mut p, Key::SPACE, 0.0), vec![OutputEvent::press(Key::SPACE)]);
        assert_eq!(repeat(&mut p, Key::SPACE, 0.5), vec![OutputEvent::repeat(Key::SPACE)]);
        assert_eq!(release(&mut p, Key::SPACE, 0.6), vec![OutputEvent::release(Key::SPACE)]);
        assert_eq!(press(&mut p, Key::LEFT_CTRL, 1.0), vec![OutputEvent::press(Key::LEFT_CTRL)]);
    }

    #[test]
    fn test_held_keys_tracked_for_every_key_event() {
        let mut p = KeyEventProcessor::default();
        press(&mut p, Key::ESC, 0.0);
        press(&mut p, Key::A, 0.1);
        press(&mut p, Key::LEFT_SHIFT, 0.2);
        let held: Vec<Key> = p.snapshot().held_keys.into_iter().collect();
        assert_eq!(held, vec![Key::ESC, Key::A, Key::LEFT_SHIFT]);

        release(&mut p, Key::A, 0.3);
        assert!(!p.snapshot().held_keys.contains(&Key::A));
    }

    #[test]
    fn test_caps_lock_toggles_and_forwards() {
        let mut p = KeyEventProcessor::default();
        assert_eq!(press(&mut p, Key::CAPSLOCK, 0.0), vec![OutputEvent::press(Key::CAPSLOCK)]);
        assert!(p.caps_lock());
        assert_eq!(release(&mut p, Key::CAPSLOCK, 0.1), vec![OutputEvent::release(Key::CAPSLOCK)]);
        assert!(p.caps_lock());
        press(&mut p, Key::CAPSLOCK, 0.2);
        assert!(!p.caps_lock());
    }

    #[test]
    fn test_custom_caps_lock_key() {
        let mut p = KeyEventProcessor::new(ExtraKeyMap::new(), Key::RIGHT_ALT);
        press(&mut p, Key::CAPSLOCK, 0.0);
        assert!(!p.caps_lock());
        press(&mut p, Key::RIGHT_ALT, 0.1);
        assert!(p.caps_lock());
    }

    #[test]
    fn test_extra_key_is_remapped() {
        let extra = ExtraKeyMap::from_pairs([(Key::MUTE, Key::F1)]);
        let mut p = KeyEventProcessor::new(extra, Key::CAPSLOCK);
        assert_eq!(press(&mut p, Key::MUTE, 0.0), vec![OutputEvent::press(Key::F1)]);
        assert_eq!(release(&mut p, Key::MUTE, 0.1), vec![OutputEvent::release(Key::F1)]);
        // Unmapped unknown codes are forwarded as they are
        assert_eq!(
            press(&mut p, Key::VOLUMEUP, 0.2),
            vec![OutputEvent::press(Key::VOLUMEUP)]
        );
    }

    #[test]
    fn test_remap_onto_shiftable_key_is_buffered() {
        let extra = ExtraKeyMap::from_pairs([(Key::MUTE, Key::A)]);
        let mut p = KeyEventProcessor::new(extra, Key::CAPSLOCK);
        assert!(press(&mut p, Key::MUTE, 0.0).is_empty());
        assert_eq!(
            release(&mut p, Key::MUTE, 0.1),
            vec![OutputEvent::press(Key::A), OutputEvent::release(Key::A)]
        );
    }

    #[test]
    fn test_pending_check_runs_on_other_key_events() {
        let mut p = KeyEventProcessor::default();
        assert!(press(&mut p, Key::ESC, 0.0).is_empty());
        let out = press(&mut p, Key::SPACE, 1.5);
        assert_eq!(
            out,
            vec![
                OutputEvent::press(LONG_PRESS_ESCAPE_KEY),
                OutputEvent::release(LONG_PRESS_ESCAPE_KEY),
                OutputEvent::press(Key::SPACE),
            ]
        );
    }

    #[test]
    fn test_custom_timings() {
        let mut p = KeyEventProcessor::with_config(ProcessorConfig {
            timings: Timings {
                key_long_press: 1.0,
                ..Timings::default()
            },
            ..ProcessorConfig::default()
        });
        press(&mut p, Key::A, 0.0);
        assert!(p.check_pending_events(Some(0.5)).is_empty());
        assert_eq!(
            p.check_pending_events(Some(1.0)),
            vec![OutputEvent::press(SYNTHETIC_SHIFT), OutputEvent::press(Key::A)]
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut p = KeyEventProcessor::default();
        press(&mut p, Key::CAPSLOCK, 0.0);
        press(&mut p, Key::LEFT_SHIFT, 0.1);
        release(&mut p, Key::LEFT_SHIFT, 0.15);
        press(&mut p, Key::ESC, 0.2);
        press(&mut p, Key::A, 0.3);
        assert_ne!(p.snapshot(), ProcessorSnapshot::default());

        p.reset();
        assert_eq!(p.snapshot(), ProcessorSnapshot::default());
        assert!(p.check_pending_events(Some(10.0)).is_empty());
    }

    #[test]
    fn test_flush_pending_releases_synthetic_shift() {
        let mut p = KeyEventProcessor::default();
        press(&mut p, Key::A, 0.0);
        p.check_pending_events(Some(0.5));
        assert_eq!(p.flush_pending(), vec![OutputEvent::release(SYNTHETIC_SHIFT)]);
        assert_eq!(p.snapshot().char_buffered_key, None);
        assert!(p.flush_pending().is_empty());
    }

    #[test]
    fn test_flush_pending_hands_over_buffered_downs() {
        let mut p = KeyEventProcessor::default();
        press(&mut p, Key::ESC, 0.0);
        press(&mut p, Key::A, 0.1);
        assert_eq!(
            p.flush_pending(),
            vec![OutputEvent::press(Key::ESC), OutputEvent::press(Key::A)]
        );
        assert!(!p.snapshot().escape_buffered);
        assert!(p.check_pending_events(Some(5.0)).is_empty());
    }

    #[test]
    fn test_flush_pending_after_escape_signal_emits_nothing() {
        let mut p = KeyEventProcessor::default();
        press(&mut p, Key::ESC, 0.0);
        p.check_pending_events(Some(1.5));
        assert!(p.flush_pending().is_empty());
    }

    #[test]
    fn test_process_raw_uses_event_timestamp() {
        let mut p = KeyEventProcessor::default();
        p.process_raw(&RawKeyEvent::key(Key::ESC, Action::Press, 100.0));
        assert_eq!(p.snapshot().escape_press_time, Some(100.0));
    }
}
