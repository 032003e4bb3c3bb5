//! Dispatcher: routes one control request and shapes its response.
//!
//! # Request lifecycle
//!
//! ```text
//! ControlRequest { control_code, input, output }
//!  └─ Opcode::try_from(control_code)      unknown  -> UnsupportedRequest
//!       ├─ Ping / Echo / QueryVersion      answered inline
//!       └─ InjectOne / InjectBatch
//!            └─ aik_core validator         malformed -> InvalidArgument / BufferTooSmall
//!                 └─ InjectionForwarder    never fails; may be degraded
//! ```
//!
//! `dispatch` returns exactly one `Result` per request, so a request can not
//! be dropped without a completion.  The host guarantees at most one
//! dispatch in flight per device, so nothing here locks request state.

use std::sync::Arc;

use aik_core::{
    decode_batch_request, decode_single_request, Opcode, ResponseCode, WireError,
    protocol::{UnknownControlCode, WIRE_VERSION},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::forward::{ForwardingStats, InjectionForwarder};
use crate::application::registry::ConnectionRegistry;

/// Literal written by `Ping`, without its terminator.
const PONG: &[u8] = b"PONG";

/// Size of the little-endian `u32` written by `QueryVersion` and inject
/// completions.
const U32_SIZE: usize = 4;

/// Errors a request can complete with.  Each maps to one [`ResponseCode`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Batch count out of range, or a fixed-size payload with the wrong length.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[source] WireError),

    /// A buffer is shorter than the request requires.
    #[error("buffer too small: need {required} bytes, got {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// The control code is not in the opcode table.
    #[error("unsupported request: control code 0x{0:08X}")]
    UnsupportedRequest(u32),
}

impl DispatchError {
    /// Status the request is completed with.
    pub fn status(&self) -> ResponseCode {
        match self {
            DispatchError::InvalidArgument(_) => ResponseCode::InvalidArgument,
            DispatchError::BufferTooSmall { .. } => ResponseCode::BufferTooSmall,
            DispatchError::UnsupportedRequest(_) => ResponseCode::UnsupportedRequest,
        }
    }
}

impl From<WireError> for DispatchError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::BufferTooSmall {
                required,
                available,
            } => DispatchError::BufferTooSmall {
                required,
                available,
            },
            other => DispatchError::InvalidArgument(other),
        }
    }
}

impl From<UnknownControlCode> for DispatchError {
    fn from(UnknownControlCode(code): UnknownControlCode) -> Self {
        DispatchError::UnsupportedRequest(code)
    }
}

/// One control request, borrowed for the duration of a dispatch.
#[derive(Debug)]
pub struct ControlRequest<'a> {
    pub control_code: u32,
    pub input: &'a [u8],
    pub output: &'a mut [u8],
}

impl<'a> ControlRequest<'a> {
    pub fn new(control_code: u32, input: &'a [u8], output: &'a mut [u8]) -> Self {
        Self {
            control_code,
            input,
            output,
        }
    }
}

/// Successful completion of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completion {
    /// Bytes written to the output buffer (the request's "information").
    pub bytes_written: usize,
    /// Events acknowledged, for inject opcodes only.
    pub consumed: Option<u32>,
}

impl Completion {
    fn bytes(bytes_written: usize) -> Self {
        Self {
            bytes_written,
            consumed: None,
        }
    }
}

/// Command dispatcher for one device instance.
pub struct Dispatcher {
    forwarder: InjectionForwarder,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry and statistics.
    ///
    /// Both are shared so the host can attach sinks and read counters while
    /// the dispatcher is owned by the request queue.
    pub fn new(registry: Arc<ConnectionRegistry>, stats: Arc<ForwardingStats>) -> Self {
        Self {
            forwarder: InjectionForwarder::new(registry, stats),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.forwarder.registry()
    }

    pub fn stats(&self) -> &Arc<ForwardingStats> {
        self.forwarder.stats()
    }

    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for unknown control codes and malformed
    /// buffers.  Forwarding itself never produces an error.
    pub fn dispatch(&self, request: ControlRequest<'_>) -> Result<Completion, DispatchError> {
        let ControlRequest {
            control_code,
            input,
            output,
        } = request;

        let opcode = match Opcode::try_from(control_code) {
            Ok(opcode) => opcode,
            Err(err) => {
                warn!(%err, "request rejected");
                return Err(err.into());
            }
        };
        debug!(
            ?opcode,
            input_len = input.len(),
            output_len = output.len(),
            "dispatch"
        );

        let result = match opcode {
            Opcode::Ping => Ok(Completion::bytes(ping(output))),
            Opcode::Echo => echo(input, output).map(Completion::bytes),
            Opcode::QueryVersion => query_version(output).map(Completion::bytes),
            Opcode::InjectOne => decode_single_request(input)
                .map_err(DispatchError::from)
                .map(|batch| self.inject(&batch, output)),
            Opcode::InjectBatch => decode_batch_request(input)
                .map_err(DispatchError::from)
                .map(|batch| self.inject(&batch, output)),
        };

        if let Err(err) = &result {
            debug!(?opcode, %err, "request rejected");
        }
        result
    }

    fn inject(&self, batch: &aik_core::InjectionBatch, output: &mut [u8]) -> Completion {
        let consumed = self.forwarder.forward(batch).consumed();
        Completion {
            bytes_written: write_u32(output, consumed).unwrap_or(0),
            consumed: Some(consumed),
        }
    }
}

// ── Inline handlers ───────────────────────────────────────────────────────────

/// Writes `"PONG\0"`, truncated to fit and always NUL-terminated.
fn ping(output: &mut [u8]) -> usize {
    let Some(room) = output.len().checked_sub(1) else {
        return 0;
    };
    let n = PONG.len().min(room);
    output[..n].copy_from_slice(&PONG[..n]);
    output[n] = 0;
    n + 1
}

fn echo(input: &[u8], output: &mut [u8]) -> Result<usize, DispatchError> {
    if input.is_empty() || output.is_empty() {
        return Err(DispatchError::BufferTooSmall {
            required: 1,
            available: input.len().min(output.len()),
        });
    }
    let n = input.len().min(output.len());
    output[..n].copy_from_slice(&input[..n]);
    Ok(n)
}

fn query_version(output: &mut [u8]) -> Result<usize, DispatchError> {
    write_u32(output, WIRE_VERSION).ok_or(DispatchError::BufferTooSmall {
        required: U32_SIZE,
        available: output.len(),
    })
}

/// Writes `value` little-endian at the start of `output` if it fits.
fn write_u32(output: &mut [u8], value: u32) -> Option<usize> {
    let slot = output.get_mut(..U32_SIZE)?;
    slot.copy_from_slice(&value.to_le_bytes());
    Some(U32_SIZE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
