//! Batch validator: turns untrusted request bytes into an [`InjectionBatch`].
//!
//! # Check ordering
//!
//! The caller controls both the declared `count` and the length of the input
//! buffer, and the two can disagree.  The checks therefore run in a fixed
//! order and no record byte is read until all of them pass:
//!
//! 1. The 4-byte header must be present, otherwise the count itself cannot be
//!    read ([`WireError::BufferTooSmall`]).
//! 2. `count` must be in `1..=MAX_BATCH` ([`WireError::CountOutOfRange`]).
//!    This is checked before the length so a huge count is rejected without
//!    any size arithmetic on it.
//! 3. The buffer must hold `header + count * RECORD_SIZE` bytes
//!    ([`WireError::BufferTooSmall`]).
//!
//! Bytes after the last declared record are ignored; existing callers send
//! the full fixed-capacity structure regardless of `count`.

use thiserror::Error;
use tracing::debug;

use crate::domain::event::{InjectionBatch, ScancodeEvent, MAX_BATCH};
use crate::protocol::record::{
    decode_record, encode_record, read_count, BATCH_HEADER_SIZE, RECORD_SIZE,
};

/// Errors raised while validating an inject payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The declared batch count is zero or exceeds [`MAX_BATCH`].
    #[error("batch count {count} out of range 1..={MAX_BATCH}")]
    CountOutOfRange { count: u32 },

    /// The input is shorter than the declared payload requires.
    #[error("buffer too small: need {required} bytes, got {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// A fixed-size payload arrived with extra bytes.
    #[error("length mismatch: expected exactly {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Bytes needed for a batch payload holding `count` records, or `None` if
/// that length overflows `usize`.
pub const fn batch_request_len(count: usize) -> Option<usize> {
    match count.checked_mul(RECORD_SIZE) {
        Some(body) => body.checked_add(BATCH_HEADER_SIZE),
        None => None,
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Validates and decodes an `InjectBatch` payload.
///
/// # Errors
///
/// See the module docs for the order in which errors are reported.
pub fn decode_batch_request(input: &[u8]) -> Result<InjectionBatch, WireError> {
    let count = read_count(input).ok_or_else(|| {
        debug!(available = input.len(), "batch header truncated");
        WireError::BufferTooSmall {
            required: BATCH_HEADER_SIZE,
            available: input.len(),
        }
    })?;

    if count == 0 || count as usize > MAX_BATCH {
        debug!(count, "batch count out of range");
        return Err(WireError::CountOutOfRange { count });
    }

    let required =
        batch_request_len(count as usize).ok_or(WireError::CountOutOfRange { count })?;
    if input.len() < required {
        debug!(count, required, available = input.len(), "batch payload truncated");
        return Err(WireError::BufferTooSmall {
            required,
            available: input.len(),
        });
    }

    let events: Vec<ScancodeEvent> = input[BATCH_HEADER_SIZE..required]
        .chunks_exact(RECORD_SIZE)
        .map(|r| decode_record([r[0], r[1], r[2]]))
        .collect();

    InjectionBatch::new(events).map_err(|_| WireError::CountOutOfRange { count })
}

/// Validates and decodes an `InjectOne` payload: exactly one record.
///
/// # Errors
///
/// [`WireError::BufferTooSmall`] for short input, [`WireError::LengthMismatch`]
/// for input longer than one record.
pub fn decode_single_request(input: &[u8]) -> Result<InjectionBatch, WireError> {
    if input.len() < RECORD_SIZE {
        return Err(WireError::BufferTooSmall {
            required: RECORD_SIZE,
            available: input.len(),
        });
    }
    if input.len() > RECORD_SIZE {
        return Err(WireError::LengthMismatch {
            expected: RECORD_SIZE,
            actual: input.len(),
        });
    }
    let event = decode_record([input[0], input[1], input[2]]);
    Ok(InjectionBatch::single(event))
}

// ── Encoding (caller side) ────────────────────────────────────────────────────

/// Builds the `InjectBatch` input buffer for `batch`.
pub fn encode_batch_request(batch: &InjectionBatch) -> Vec<u8> {
    let mut buf = Vec::with_capacity(batch_request_len(batch.events().len()).unwrap_or_default());
    buf.extend_from_slice(&batch.count().to_le_bytes());
    for event in batch {
        encode_record(&mut buf, event);
    }
    buf
}

/// Builds the `InjectOne` input buffer for `event`.
pub fn encode_single_request(event: &ScancodeEvent) -> Vec<u8> {
    let mut buf = Vec::with_capacity(RECORD_SIZE);
    encode_record(&mut buf, event);
    buf
}

// ── Tests ─────────────────────────────────────────────────────────────────────
