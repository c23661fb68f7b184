// Keynorm Processor State
// Latched flags and per-mechanism tracking owned by one processor

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::classify::is_shift;
use crate::{Action, Key};

/// Tap of a Shift key shorter than this latches sticky shift
pub const SHIFT_TAP: f64 = 0.3;
/// Escape held at least this long fires the long-press signal
pub const ESCAPE_HOLD: f64 = 1.0;
/// Shiftable key held at least this long emits its shifted form
pub const KEY_LONG_PRESS: f64 = 0.4;

/// Tap/hold thresholds in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub shift_tap: f64,
    pub escape_hold: f64,
    pub key_long_press: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            shift_tap: SHIFT_TAP,
            escape_hold: ESCAPE_HOLD,
            key_long_press: KEY_LONG_PRESS,
        }
    }
}

/// Shift tap-vs-hold timing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum ShiftTracking {
    #[default]
    Idle,
    /// A Shift key is down; `interrupted` is set once any other key goes down
    Timing {
        key: Key,
        pressed_at: f64,
        interrupted: bool,
    },
}

/// Escape tap-vs-hold decision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum EscapeState {
    #[default]
    Idle,
    /// Down seen, nothing emitted yet
    Buffered { pressed_at: f64 },
    /// Long-press signal emitted; the matching Up emits nothing
    LongPressFired { pressed_at: f64 },
}

/// Character key tap-vs-hold decision. At most one key is buffered.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum CharState {
    #[default]
    Idle,
    /// Down seen, nothing emitted yet
    Buffered { key: Key, pressed_at: f64 },
    /// Shift+key down emitted, waiting for the Up
    LongPressed { key: Key, pressed_at: f64 },
}

impl CharState {
    pub(crate) fn key(&self) -> Option<Key> {
        match *self {
            CharState::Idle => None,
            CharState::Buffered { key, .. } | CharState::LongPressed { key, .. } => Some(key),
        }
    }
}

/// All mutable state of a processor. Reset as a whole, never partially.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ProcessorState {
    pub(crate) sticky_shift: bool,
    pub(crate) caps_lock: bool,
    pub(crate) held_keys: SmallVec<[Key; 8]>,
    pub(crate) shift: ShiftTracking,
    pub(crate) escape: EscapeState,
    pub(crate) chars: CharState,
}

impl ProcessorState {
    /// Keep `held_keys` in step with the physical key state
    pub(crate) fn track_held(&mut self, key: Key, action: Action) {
        match action {
            Action::Press => {
                if !self.held_keys.contains(&key) {
                    self.held_keys.push(key);
                }
            }
            Action::Release => self.held_keys.retain(|held| *held != key),
            Action::Repeat => {}
        }
    }

    pub(crate) fn physical_shift_held(&self) -> bool {
        self.held_keys.iter().any(|key| is_shift(*key))
    }

    pub(crate) fn snapshot(&self) -> ProcessorSnapshot {
        let (shift_press_time, shift_key_held, key_pressed_during_shift) = match self.shift {
            ShiftTracking::Idle => (None, None, false),
            ShiftTracking::Timing {
                key,
                pressed_at,
                interrupted,
            } => (Some(pressed_at), Some(key), interrupted),
        };

        let (escape_press_time, escape_buffered, escape_long_press_fired) = match self.escape {
            EscapeState::Idle => (None, false, false),
            EscapeState::Buffered { pressed_at } => (Some(pressed_at), true, false),
            EscapeState::LongPressFired { pressed_at } => (Some(pressed_at), false, true),
        };

        let (char_press_time, char_long_press_fired) = match self.chars {
            CharState::Idle => (None, false),
            CharState::Buffered { pressed_at, .. } => (Some(pressed_at), false),
            CharState::LongPressed { pressed_at, .. } => (Some(pressed_at), true),
        };

        ProcessorSnapshot {
            sticky_shift: self.sticky_shift,
            caps_lock: self.caps_lock,
            held_keys: self.held_keys.iter().copied().collect(),
            shift_press_time,
            shift_key_held,
            key_pressed_during_shift,
            escape_press_time,
            escape_buffered,
            escape_long_press_fired,
            char_press_time,
            char_buffered_key: self.chars.key(),
            char_long_press_fired,
        }
    }
}

/// Read-only copy of the processor state, for diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessorSnapshot {
    pub sticky_shift: bool,
    pub caps_lock: bool,
    pub held_keys: BTreeSet<Key>,
    pub shift_press_time: Option<f64>,
    pub shift_key_held: Option<Key>,
    pub key_pressed_during_shift: bool,
    pub escape_press_time: Option<f64>,
    pub escape_buffered: bool,
    pub escape_long_press_fired: bool,
    pub char_press_time: Option<f64>,
    pub char_buffered_key: Option<Key>,
    pub char_long_press_fired: bool,
}
