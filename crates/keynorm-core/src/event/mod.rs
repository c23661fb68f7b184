// Keynorm Event Types
// Raw hardware transitions in, normalized transitions out

#[cfg(feature = "pure-rust")]
pub mod r#loop;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::{Action, Key};

#[cfg(feature = "pure-rust")]
pub use r#loop::{DeviceInfo, EvdevSource};

/// evdev event type code for sync boundaries (EV_SYN)
pub const EV_SYN: u16 = 0x00;

/// evdev event type code for key events (EV_KEY)
pub const EV_KEY: u16 = 0x01;

/// Kind of an input event.
///
/// Only `Key` events are interpreted. `Other` keeps the evdev type code so
/// the event can be forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Key,
    Other(u16),
}

impl EventKind {
    /// Classify an evdev event type code
    pub fn from_type_code(type_code: u16) -> Self {
        if type_code == EV_KEY {
            EventKind::Key
        } else {
            EventKind::Other(type_code)
        }
    }

    pub fn type_code(self) -> u16 {
        match self {
            EventKind::Key => EV_KEY,
            EventKind::Other(code) => code,
        }
    }

    pub fn is_key(self) -> bool {
        matches!(self, EventKind::Key)
    }
}

/// A transition read from the hardware, with its timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKeyEvent {
    pub kind: EventKind,
    pub key: Key,
    pub action: Action,
    pub timestamp: f64,
}

impl RawKeyEvent {
    pub fn new(kind: EventKind, key: Key, action: Action, timestamp: f64) -> Self {
        Self {
            kind,
            key,
            action,
            timestamp,
        }
    }

    /// Shorthand for a key event
    pub fn key(key: Key, action: Action, timestamp: f64) -> Self {
        Self::new(EventKind::Key, key, action, timestamp)
    }
}

/// A normalized transition for the downstream sink.
///
/// No timestamp is carried: consumers only rely on the order of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputEvent {
    pub kind: EventKind,
    pub key: Key,
    pub action: Action,
}

impl OutputEvent {
    pub fn new(kind: EventKind, key: Key, action: Action) -> Self {
        Self { kind, key, action }
    }

    pub fn key(key: Key, action: Action) -> Self {
        Self::new(EventKind::Key, key, action)
    }

    pub fn press(key: Key) -> Self {
        Self::key(key, Action::Press)
    }

    pub fn release(key: Key) -> Self {
        Self::key(key, Action::Release)
    }

    pub fn repeat(key: Key) -> Self {
        Self::key(key, Action::Repeat)
    }
}

impl From<RawKeyEvent> for OutputEvent {
    fn from(raw: RawKeyEvent) -> Self {
        Self::new(raw.kind, raw.key, raw.action)
    }
}

/// Build a raw event from the fields of a kernel input event.
///
/// Sync boundaries are dropped (the sink writes its own), as are events
/// whose value is not a key transition.
pub fn raw_event_from_parts(type_code: u16, code: u16, value: i32, timestamp: f64) -> Option<RawKeyEvent> {
    if type_code == EV_SYN {
        return None;
    }
    let action = Action::from_i32(value)?;
    Some(RawKeyEvent::new(
        EventKind::from_type_code(type_code),
        Key::from(code),
        action,
        timestamp,
    ))
}

/// Interleave per-device event runs into one timeline.
///
/// Each run is already chronological; the merge is a stable sort on the
/// timestamp, so events of one device keep their relative order even when
/// timestamps tie.
pub fn merge_chronological(runs: impl IntoIterator<Item = Vec<RawKeyEvent>>) -> Vec<RawKeyEvent> {
    let mut events: Vec<RawKeyEvent> = runs.into_iter().flatten().collect();
    events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    events
}

/// Wall clock as seconds since the UNIX epoch.
///
/// This is the time base of evdev event timestamps, so raw events and
/// host-side pending checks can be compared directly.
pub fn now_seconds() -> f64 {
    seconds_since_epoch(SystemTime::now())
}

/// Convert a `SystemTime` to seconds since the UNIX epoch (0 before the epoch)
pub fn seconds_since_epoch(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_event_kind_from_type_code() {
        assert_eq!(EventKind::from_type_code(0x01), EventKind::Key);
        assert_eq!(EventKind::from_type_code(0x04), EventKind::Other(0x04));
        assert!(EventKind::Key.is_key());
        assert!(!EventKind::Other(0x02).is_key());
        assert_eq!(EventKind::Other(0x11).type_code(), 0x11);
        assert_eq!(EventKind::Key.type_code(), EV_KEY);
    }

    #[test]
    fn test_output_from_raw_drops_timestamp() {
        let raw = RawKeyEvent::key(Key::A, Action::Press, 12.5);
        let out = OutputEvent::from(raw);
        assert_eq!(out, OutputEvent::press(Key::A));
    }

    #[test]
    fn test_seconds_since_epoch() {
        let t = UNIX_EPOCH + Duration::from_millis(1500);
        assert_eq!(seconds_since_epoch(t), 1.5);
        assert!(now_seconds() > 1_600_000_000.0);
    }

    #[test]
    fn test_raw_event_from_parts() {
        assert_eq!(
            raw_event_from_parts(EV_KEY, 30, 1, 2.0),
            Some(RawKeyEvent::key(Key::A, Action::Press, 2.0))
        );
        assert_eq!(
            raw_event_from_parts(EV_KEY, 30, 2, 2.5).map(|e| e.action),
            Some(Action::Repeat)
        );
        assert_eq!(raw_event_from_parts(EV_SYN, 0, 0, 2.0), None);
        // MSC_SCAN carries a scan code, not a transition
        assert_eq!(raw_event_from_parts(0x04, 4, 0x70004, 2.0), None);
        assert_eq!(
            raw_event_from_parts(0x04, 4, 0, 2.0).map(|e| e.kind),
            Some(EventKind::Other(0x04))
        );
    }

    #[test]
    fn test_merge_chronological_interleaves_devices() {
        let keyboard = vec![
            RawKeyEvent::key(Key::LEFT_SHIFT, Action::Press, 0.0),
            RawKeyEvent::key(Key::LEFT_SHIFT, Action::Release, 0.2),
        ];
        let keypad = vec![RawKeyEvent::key(Key::A, Action::Press, 0.1)];

        let merged = merge_chronological([keyboard, keypad]);
        let keys: Vec<(Key, Action)> = merged.iter().map(|e| (e.key, e.action)).collect();
        assert_eq!(
            keys,
            vec![
                (Key::LEFT_SHIFT, Action::Press),
                (Key::A, Action::Press),
                (Key::LEFT_SHIFT, Action::Release),
            ]
        );
    }

    #[test]
    fn test_merge_chronological_keeps_device_order_on_ties() {
        let first = vec![
            RawKeyEvent::key(Key::A, Action::Release, 1.0),
            RawKeyEvent::key(Key::A, Action::Press, 1.0),
        ];
        let second = vec![RawKeyEvent::key(Key::B, Action::Press, 1.0)];

        let merged = merge_chronological([first, second]);
        let keys: Vec<(Key, Action)> = merged.iter().map(|e| (e.key, e.action)).collect();
        assert_eq!(
            keys,
            vec![(Key::A, Action::Release), (Key::A, Action::Press), (Key::B, Action::Press)]
        );
    }
}
