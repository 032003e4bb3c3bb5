//! Control codes and response status codes.
//!
//! # What is a control code? (for beginners)
//!
//! A caller talks to the device through `DeviceIoControl`-style requests.
//! Each request carries a 32-bit *control code* that is packed from four
//! fields by the Windows `CTL_CODE` macro:
//!
//! ```text
//! [device_type:16][access:2][function:12][method:2]
//! ```
//!
//! All AIK requests use device type `FILE_DEVICE_UNKNOWN`, buffered I/O, and
//! any-access, so only the function index differs between operations.
//! Function indices start at `0x800` because values below that are reserved
//! for Microsoft.
//!
//! # Response codes
//!
//! Each completed request reports one [`ResponseCode`], using the NTSTATUS
//! value a kernel driver would complete the request with.  Every error the
//! device can report maps to exactly one code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version of the scancode record layout accepted by the inject opcodes.
///
/// Version 1 used a 4-byte record with a 16-bit flags field; version 2 is the
/// 3-byte record described in [`crate::protocol::record`].
pub const WIRE_VERSION: u32 = 2;

/// `FILE_DEVICE_UNKNOWN` device type.
pub const FILE_DEVICE_UNKNOWN: u32 = 0x0000_0022;
/// `METHOD_BUFFERED` transfer type.
pub const METHOD_BUFFERED: u32 = 0;
/// `FILE_ANY_ACCESS` required access.
pub const FILE_ANY_ACCESS: u32 = 0;
/// First function index available to third-party drivers.
pub const AIK_IOCTL_INDEX: u32 = 0x800;

/// Packs a control code the same way the Windows `CTL_CODE` macro does.
pub const fn ctl_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

const fn aik_code(offset: u32) -> u32 {
    ctl_code(
        FILE_DEVICE_UNKNOWN,
        AIK_IOCTL_INDEX + offset,
        METHOD_BUFFERED,
        FILE_ANY_ACCESS,
    )
}

/// All operations recognised by the device, keyed by control code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Opcode {
    /// Liveness check; answers `"PONG"`.
    Ping = aik_code(0),
    /// Copies the input buffer to the output buffer.
    Echo = aik_code(1),
    /// Injects exactly one scancode record.
    InjectOne = aik_code(2),
    /// Injects a counted batch of scancode records.
    InjectBatch = aik_code(3),
    /// Reports [`WIRE_VERSION`] so callers can pick the record layout.
    QueryVersion = aik_code(4),
}

impl Opcode {
    /// The raw control code for this opcode.
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// A control code outside the opcode table.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unknown control code 0x{0:08X}")]
pub struct UnknownControlCode(pub u32);

impl TryFrom<u32> for Opcode {
    type Error = UnknownControlCode;

    fn try_from(value: u32) -> Result<Self, UnknownControlCode> {
        const PING: u32 = Opcode::Ping.code();
        const ECHO: u32 = Opcode::Echo.code();
        const INJECT_ONE: u32 = Opcode::InjectOne.code();
        const INJECT_BATCH: u32 = Opcode::InjectBatch.code();
        const QUERY_VERSION: u32 = Opcode::QueryVersion.code();

        match value {
            PING => Ok(Opcode::Ping),
            ECHO => Ok(Opcode::Echo),
            INJECT_ONE => Ok(Opcode::InjectOne),
            INJECT_BATCH => Ok(Opcode::InjectBatch),
            QUERY_VERSION => Ok(Opcode::QueryVersion),
            other => Err(UnknownControlCode(other)),
        }
    }
}

/// Status returned to the caller when a request completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ResponseCode {
    /// `STATUS_SUCCESS`
    Success = 0x0000_0000,
    /// `STATUS_INVALID_PARAMETER` – batch count out of range or malformed length.
    InvalidArgument = 0xC000_000D,
    /// `STATUS_BUFFER_TOO_SMALL` – a buffer is shorter than the request needs.
    BufferTooSmall = 0xC000_0023,
    /// `STATUS_INVALID_DEVICE_REQUEST` – unknown control code.
    UnsupportedRequest = 0xC000_0010,
}

impl ResponseCode {
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, ResponseCode::Success)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
