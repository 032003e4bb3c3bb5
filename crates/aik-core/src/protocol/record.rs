//! Byte layout of a single scancode record and of the batch header.
//!
//! Wire format (wire version 2, little-endian, packed):
//! ```text
//! record: [code:2][flags:1]            flags bit0 = key up, bit1 = extended (E0)
//! header: [count:4]
//! batch:  [header][record * count]
//! ```

use crate::domain::event::ScancodeEvent;

/// Size of one encoded [`ScancodeEvent`] in bytes.
pub const RECORD_SIZE: usize = 3;

/// Size of the `count` header in front of a batch payload.
pub const BATCH_HEADER_SIZE: usize = 4;

/// Flag bit: key release.
pub const FLAG_KEY_UP: u8 = 0x01;
/// Flag bit: `E0`-prefixed key.
pub const FLAG_EXTENDED: u8 = 0x02;

/// Appends the 3-byte record for `event` to `buf`.
pub fn encode_record(buf: &mut Vec<u8>, event: &ScancodeEvent) {
    let mut flags = 0u8;
    if event.is_key_up {
        flags |= FLAG_KEY_UP;
    }
    if event.is_extended {
        flags |= FLAG_EXTENDED;
    }
    buf.extend_from_slice(&event.code.to_le_bytes());
    buf.push(flags);
}

/// Decodes one record.  Flag bits other than bit0 and bit1 are ignored.
pub fn decode_record(record: [u8; RECORD_SIZE]) -> ScancodeEvent {
    let flags = record[2];
    ScancodeEvent {
        code: u16::from_le_bytes([record[0], record[1]]),
        is_key_up: flags & FLAG_KEY_UP != 0,
        is_extended: flags & FLAG_EXTENDED != 0,
    }
}

/// Reads the batch header, or `None` if `input` is shorter than the header.
pub fn read_count(input: &[u8]) -> Option<u32> {
    let header: [u8; BATCH_HEADER_SIZE] = input.get(..BATCH_HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(header))
}
