// Keynorm Double-Tap Detection
// Timing primitive for "same key pressed twice quickly"

use std::collections::HashSet;
use std::hash::Hash;

use crate::Key;

/// Detects the second of two rapid presses of the same key.
///
/// Timestamps are seconds on any monotonic-enough time base; only the
/// difference between two calls matters.
#[derive(Debug, Clone)]
pub struct DoubleTapDetector<K = Key> {
    threshold: f64,
    allowed_keys: Option<HashSet<K>>,
    last: Option<(K, f64)>,
}

impl<K: Eq + Hash + Clone> DoubleTapDetector<K> {
    /// Create a detector.
    ///
    /// # Arguments
    /// * `threshold` - Maximum gap in seconds between the two presses (exclusive)
    /// * `allowed_keys` - Restrict detection to these keys, `None` for any key
    pub fn new(threshold: f64, allowed_keys: Option<HashSet<K>>) -> Self {
        Self {
            threshold,
            allowed_keys,
            last: None,
        }
    }

    /// Record a press and report whether it completes a double tap.
    ///
    /// A detected double tap consumes the remembered press, so a third quick
    /// press starts a new sequence instead of triggering again. A press of a
    /// key outside `allowed_keys` interrupts any pending sequence.
    pub fn check(&mut self, key: K, timestamp: f64) -> bool {
        if let Some(allowed) = &self.allowed_keys {
            if !allowed.contains(&key) {
                self.last = None;
                return false;
            }
        }

        if let Some((last_key, last_time)) = &self.last {
            if *last_key == key && timestamp - *last_time < self.threshold {
                self.last = None;
                return true;
            }
        }

        self.last = Some((key, timestamp));
        false
    }

    /// Forget any remembered press
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
