//! # aik-core
//!
//! Shared library for the AIK scancode injection device containing the
//! control-request wire protocol, the scancode event domain types, and the
//! PS/2 scancode translation table.
//!
//! This crate is used by both the device engine and by callers that build
//! requests for it.  It has zero dependencies on OS APIs or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! AIK injects synthetic keystrokes below the user-mode input APIs.  A caller
//! opens a handle to the device and sends it small binary *control requests*
//! (Windows calls these IOCTLs).  Each request carries a 32-bit control code
//! that selects the operation, an input buffer, and an output buffer.
//!
//! This crate (`aik-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The values that flow through the device: a single
//!   [`ScancodeEvent`] and a bounded [`InjectionBatch`] of them.
//!
//! - **`protocol`** – How those values look as bytes.  Control codes, the
//!   3-byte scancode record, the 4-byte batch header, and the batch validator
//!   that turns untrusted bytes into a batch only after every bounds check
//!   has passed.
//!
//! - **`keymap`** – Translation from key names and text to PS/2 set-1
//!   scancodes, used by callers to build requests.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the types nearly every caller needs.
pub use domain::event::{InjectionBatch, ScancodeEvent, MAX_BATCH};
pub use protocol::ioctl::{Opcode, ResponseCode};
pub use protocol::validate::{decode_batch_request, decode_single_request, WireError};
