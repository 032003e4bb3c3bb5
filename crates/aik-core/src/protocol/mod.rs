//! AIK control-request wire protocol: control codes, record codec, and the
//! batch validator.

pub mod ioctl;
pub mod record;
pub mod validate;

pub use ioctl::{ctl_code, Opcode, ResponseCode, UnknownControlCode, WIRE_VERSION};
pub use record::{BATCH_HEADER_SIZE, RECORD_SIZE};
pub use validate::{encode_batch_request, encode_single_request, WireError};
