//! Scancode events and bounded injection batches.
//!
//! A [`ScancodeEvent`] is one key transition expressed as a PS/2 set-1
//! scancode.  An [`InjectionBatch`] is an ordered, non-empty run of at most
//! [`MAX_BATCH`] events that the device delivers in a single call.
//!
//! # Why can't a batch be empty or oversized?
//!
//! The batch is the unit the forwarder hands downstream.  Making the bounds
//! part of the type means every function that receives an `InjectionBatch`
//! can rely on `1 <= count <= MAX_BATCH` without checking again.  The only
//! ways to build one are [`InjectionBatch::new`], which checks the length,
//! [`InjectionBatch::single`], and [`InjectionBatch::chunked`], which splits
//! arbitrary input into valid batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of events accepted in one batch.
pub const MAX_BATCH: usize = 64;

/// Returned when an event list cannot form a batch.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("batch must hold between 1 and {MAX_BATCH} events, got {len}")]
pub struct BatchSizeError {
    /// Number of events that was offered.
    pub len: usize,
}

/// A single synthetic key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScancodeEvent {
    /// PS/2 set-1 make code (e.g. `0x1E` for the A key).
    pub code: u16,
    /// `true` for a key release (break), `false` for a key press (make).
    pub is_key_up: bool,
    /// `true` when the key carries the `E0` prefix (arrows, right Ctrl, ...).
    pub is_extended: bool,
}

impl ScancodeEvent {
    pub fn new(code: u16, is_key_up: bool, is_extended: bool) -> Self {
        Self {
            code,
            is_key_up,
            is_extended,
        }
    }

    /// A key press for `code`.
    pub fn key_down(code: u16, is_extended: bool) -> Self {
        Self::new(code, false, is_extended)
    }

    /// A key release for `code`.
    pub fn key_up(code: u16, is_extended: bool) -> Self {
        Self::new(code, true, is_extended)
    }
}

/// An ordered batch of 1 to [`MAX_BATCH`] events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionBatch {
    events: Vec<ScancodeEvent>,
}

impl InjectionBatch {
    /// Wraps `events` in a batch, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`BatchSizeError`] if `events` is empty or longer than
    /// [`MAX_BATCH`].
    pub fn new(events: Vec<ScancodeEvent>) -> Result<Self, BatchSizeError> {
        if events.is_empty() || events.len() > MAX_BATCH {
            return Err(BatchSizeError { len: events.len() });
        }
        Ok(Self { events })
    }

    /// A batch holding exactly one event.
    pub fn single(event: ScancodeEvent) -> Self {
        Self {
            events: vec![event],
        }
    }

    /// Splits an arbitrary event list into consecutive batches of at most
    /// [`MAX_BATCH`] events.
    ///
    /// Order is preserved across and within batches.  An empty input yields
    /// no batches.
    pub fn chunked(events: &[ScancodeEvent]) -> Vec<InjectionBatch> {
        events
            .chunks(MAX_BATCH)
            .map(|chunk| Self {
                events: chunk.to_vec(),
            })
            .collect()
    }

    /// Number of events in the batch, as carried in the wire header.
    pub fn count(&self) -> u32 {
        // Bounded by MAX_BATCH, so the cast cannot truncate.
        self.events.len() as u32
    }

    pub fn events(&self) -> &[ScancodeEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ScancodeEvent> {
        self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScancodeEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a InjectionBatch {
    type Item = &'a ScancodeEvent;
    type IntoIter = std::slice::Iter<'a, ScancodeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
