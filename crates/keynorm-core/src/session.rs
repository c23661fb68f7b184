// Keynorm Session
// The host polling loop: raw events in, normalized batches out
//
// Contract with the processor:
// - raw events are fed in the order the source delivers them
// - every batch is flushed to the sink in the order it was returned
// - pending long-presses are checked after every poll, even an empty one,
//   and polls never wait longer than MAX_POLL_INTERVAL

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::double_tap::DoubleTapDetector;
use crate::event::{now_seconds, OutputEvent, RawKeyEvent};
use crate::processor::KeyEventProcessor;
use crate::{Action, Key};

/// Upper bound on how long a poll may block before pending checks run
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Default poll timeout
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default gap for the suspend double-tap
pub const DEFAULT_SUSPEND_DOUBLE_TAP: f64 = 0.4;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures reported by the collaborators around the processor
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Input source error: {0}")]
    Source(String),

    #[error("Output sink error: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chronological supplier of raw key events (a hardware keyboard).
pub trait KeySource {
    /// Wait up to `timeout` and return whatever events are available,
    /// oldest first. An empty vector means the timeout elapsed.
    fn poll(&mut self, timeout: Duration) -> SessionResult<Vec<RawKeyEvent>>;

    /// Current time on the same base as the event timestamps
    fn now(&self) -> f64 {
        now_seconds()
    }
}

/// Receiver of normalized events (a virtual keyboard).
pub trait KeySink {
    /// Inject one batch, followed by a sync boundary
    fn emit(&mut self, events: &[OutputEvent]) -> SessionResult<()>;
}

/// Double-tap of a key toggles raw pass-through
#[derive(Debug, Clone)]
struct SuspendToggle {
    key: Key,
    detector: DoubleTapDetector,
}

/// One logical keyboard session: a source, a sink and the processor between them.
pub struct Session<S, K> {
    source: S,
    sink: K,
    processor: KeyEventProcessor,
    poll_interval: Duration,
    suspend: Option<SuspendToggle>,
    suspended: bool,
}

impl<S: KeySource, K: KeySink> Session<S, K> {
    pub fn new(source: S, sink: K, processor: KeyEventProcessor) -> Self {
        Self {
            source,
            sink,
            processor,
            poll_interval: DEFAULT_POLL_INTERVAL,
            suspend: None,
            suspended: false,
        }
    }

    /// Set the poll timeout, clamped to [`MAX_POLL_INTERVAL`]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if interval > MAX_POLL_INTERVAL {
            log::warn!(
                "poll interval {:?} exceeds {:?}, clamping",
                interval,
                MAX_POLL_INTERVAL
            );
        }
        self.poll_interval = interval.min(MAX_POLL_INTERVAL);
        self
    }

    /// Let a double-tap of `key` toggle suspension.
    ///
    /// While suspended, raw events go to the sink untouched. Entering and
    /// leaving suspension flush the processor's pending buffers to the sink
    /// and then reset it.
    pub fn with_suspend_key(mut self, key: Key, double_tap_gap: f64) -> Self {
        let allowed: HashSet<Key> = [key].into_iter().collect();
        self.suspend = Some(SuspendToggle {
            key,
            detector: DoubleTapDetector::new(double_tap_gap, Some(allowed)),
        });
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn processor(&self) -> &KeyEventProcessor {
        &self.processor
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Poll once, process what arrived, then run the pending check.
    ///
    /// Returns the number of output events flushed.
    pub fn run_once(&mut self) -> SessionResult<usize> {
        let events = self.source.poll(self.poll_interval)?;
        let mut flushed = 0;

        for event in &events {
            if self.is_suspend_toggle(event) {
                let closing = self.processor.flush_pending();
                flushed += self.flush(&closing)?;
                self.toggle_suspend();
            }
            let batch = if self.suspended {
                vec![OutputEvent::from(*event)]
            } else {
                self.processor.process_raw(event)
            };
            flushed += self.flush(&batch)?;
        }

        if !self.suspended {
            let now = self.source.now();
            let pending = self.processor.check_pending_events(Some(now));
            flushed += self.flush(&pending)?;
        }

        Ok(flushed)
    }

    /// Loop until `running` is cleared or a collaborator fails
    pub fn run(&mut self, running: &AtomicBool) -> SessionResult<()> {
        log::info!("session started (poll interval {:?})", self.poll_interval);
        while running.load(Ordering::SeqCst) {
            self.run_once()?;
        }
        log::info!("session stopped");
        Ok(())
    }

    /// Tear down into the collaborators; the processor state is discarded
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    fn flush(&mut self, batch: &[OutputEvent]) -> SessionResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        log::trace!("out: {:?}", batch);
        self.sink.emit(batch)?;
        Ok(batch.len())
    }

    fn is_suspend_toggle(&mut self, event: &RawKeyEvent) -> bool {
        let Some(toggle) = self.suspend.as_mut() else {
            return false;
        };
        event.kind.is_key()
            && event.action == Action::Press
            && toggle.detector.check(event.key, event.timestamp)
    }

    fn toggle_suspend(&mut self) {
        self.suspended = !self.suspended;
        self.processor.reset();
        if let Some(toggle) = &self.suspend {
            log::info!(
                "{} double-tapped: {}",
                toggle.key,
                if self.suspended { "suspended" } else { "resumed" }
            );
        }
    }
}
