//! Recording sink for tests and dry runs.
//!
//! `RecordingSink` performs no OS calls.  Every delivered event is pushed into
//! a `Mutex<Vec<...>>` so assertions can inspect exactly what reached the
//! sink and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let sink = Arc::new(RecordingSink::new());
//! registry.attach(sink.clone());
//!
//! dispatcher.dispatch(request)?;
//!
//! assert_eq!(sink.events.lock().unwrap().len(), 2);
//! ```
//!
//! # Failure knobs
//!
//! - `should_fail`: every `deliver` returns [`SinkError::Platform`].
//! - `consume_limit`: at most this many events per call are recorded and
//!   reported as consumed.

use std::sync::{Mutex, PoisonError};

use aik_core::ScancodeEvent;

use crate::application::forward::{DownstreamSink, SinkError};

/// A sink that records deliveries in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Every consumed event, in delivery order.
    pub events: Mutex<Vec<ScancodeEvent>>,
    /// Length of each `deliver` call's slice.
    pub batch_sizes: Mutex<Vec<usize>>,
    pub should_fail: bool,
    pub consume_limit: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// A sink that consumes at most `limit` events per delivery.
    pub fn with_consume_limit(limit: usize) -> Self {
        Self {
            consume_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Copy of the recorded events.
    pub fn recorded(&self) -> Vec<ScancodeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DownstreamSink for RecordingSink {
    fn deliver(&self, events: &[ScancodeEvent]) -> Result<usize, SinkError> {
        if self.should_fail {
            return Err(SinkError::Platform("mock failure".into()));
        }
        let taken = self
            .consume_limit
            .map_or(events.len(), |limit| limit.min(events.len()));
        self.batch_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(events.len());
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&events[..taken]);
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_records_in_order() {
        let sink = RecordingSink::new();
        let events = [
            ScancodeEvent::key_down(0x1E, false),
            ScancodeEvent::key_up(0x1E, false),
        ];

        assert_eq!(sink.deliver(&events).unwrap(), 2);
        assert_eq!(sink.recorded(), events.to_vec());
        assert_eq!(*sink.batch_sizes.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_failing_sink_records_nothing() {
        let sink = RecordingSink::failing();
        let result = sink.deliver(&[ScancodeEvent::key_down(0x1E, false)]);
        assert!(matches!(result, Err(SinkError::Platform(_))));
        assert!(sink.recorded().is_empty());
    }

    #[test]
    fn test_consume_limit_truncates() {
        let sink = RecordingSink::with_consume_limit(1);
        let events = [ScancodeEvent::key_down(0x10, false); 3];

        assert_eq!(sink.deliver(&events).unwrap(), 1);
        assert_eq!(sink.recorded().len(), 1);
        assert_eq!(*sink.batch_sizes.lock().unwrap(), vec![3]);
    }
}
