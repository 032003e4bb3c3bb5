//! Windows sink: replays scancodes through the `SendInput` API.
//!
//! Each event becomes one `KEYBDINPUT` with `KEYEVENTF_SCANCODE`, so the
//! virtual-key field is unused and the OS translates the scancode with the
//! active layout.  All events of a batch go to `SendInput` in one call,
//! which the OS inserts into the input stream without interleaving.

use std::mem::size_of;

use aik_core::ScancodeEvent;
use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, VIRTUAL_KEY,
};

use crate::application::forward::{DownstreamSink, SinkError};

/// Delivers events to the local keyboard input stream.
#[derive(Debug, Default)]
pub struct SendInputSink;

impl SendInputSink {
    pub fn new() -> Self {
        Self
    }
}

impl DownstreamSink for SendInputSink {
    fn deliver(&self, events: &[ScancodeEvent]) -> Result<usize, SinkError> {
        let inputs: Vec<INPUT> = events.iter().map(to_input).collect();
        // SAFETY: every element is a fully initialised keyboard INPUT and the
        // size argument matches the element type.
        let inserted = unsafe { SendInput(&inputs, size_of::<INPUT>() as i32) } as usize;
        debug!(requested = inputs.len(), inserted, "SendInput");
        if inserted == 0 && !inputs.is_empty() {
            return Err(SinkError::Rejected {
                requested: inputs.len(),
            });
        }
        Ok(inserted)
    }
}

fn to_input(event: &ScancodeEvent) -> INPUT {
    let mut flags: KEYBD_EVENT_FLAGS = KEYEVENTF_SCANCODE;
    if event.is_key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if event.is_extended {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: event.code,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}
