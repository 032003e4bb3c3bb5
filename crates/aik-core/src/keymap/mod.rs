//! Key name and text translation to PS/2 set-1 scancodes.
//!
//! The device only understands scancodes.  Callers that start from key names
//! (`"enter"`, `"left"`) or from text use [`KeyMapper`] to build the events
//! for a request.

pub mod set1;

use thiserror::Error;

use crate::domain::event::ScancodeEvent;

/// Errors raised when a key name or character has no scancode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeymapError {
    #[error("unknown key name: {0:?}")]
    UnknownKey(String),
    #[error("no scancode for character {0:?}")]
    UnmappedCharacter(char),
}

/// Unified entry point for the translation tables.
pub struct KeyMapper;

impl KeyMapper {
    /// Looks up a key by name, returning `(scancode, is_extended)`.
    ///
    /// Names are case-insensitive and surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::UnknownKey`] if the name is not in the table.
    pub fn scancode_for(name: &str) -> Result<(u16, bool), KeymapError> {
        set1::lookup(name).ok_or_else(|| KeymapError::UnknownKey(name.to_string()))
    }

    /// Press-then-release events for a named key.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::UnknownKey`] if the name is not in the table.
    pub fn tap(name: &str) -> Result<[ScancodeEvent; 2], KeymapError> {
        let (code, extended) = Self::scancode_for(name)?;
        Ok([
            ScancodeEvent::key_down(code, extended),
            ScancodeEvent::key_up(code, extended),
        ])
    }

    /// Events for a key chord such as `["ctrl", "shift", "esc"]`.
    ///
    /// Every key but the last is held as a modifier: modifiers are pressed in
    /// order, the last key is pressed and released, then the modifiers are
    /// released in reverse order.  An empty list yields no events and a
    /// single name behaves like [`KeyMapper::tap`].
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::UnknownKey`] for the first name not in the
    /// table; no events are produced in that case.
    pub fn hotkey(names: &[&str]) -> Result<Vec<ScancodeEvent>, KeymapError> {
        let keys = names
            .iter()
            .map(|name| Self::scancode_for(name))
            .collect::<Result<Vec<_>, _>>()?;
        let Some((&(code, extended), modifiers)) = keys.split_last() else {
            return Ok(Vec::new());
        };

        let mut events = Vec::with_capacity(keys.len() * 2);
        events.extend(
            modifiers
                .iter()
                .map(|&(code, extended)| ScancodeEvent::key_down(code, extended)),
        );
        events.push(ScancodeEvent::key_down(code, extended));
        events.push(ScancodeEvent::key_up(code, extended));
        events.extend(
            modifiers
                .iter()
                .rev()
                .map(|&(code, extended)| ScancodeEvent::key_up(code, extended)),
        );
        Ok(events)
    }

    /// Events that type `text` on a US layout, wrapping shifted characters
    /// in a left-Shift press/release.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::UnmappedCharacter`] for the first character that
    /// has no scancode; no events are produced in that case.
    pub fn text_to_events(text: &str) -> Result<Vec<ScancodeEvent>, KeymapError> {
        let shift = set1::LEFT_SHIFT;
        let mut events = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let (code, needs_shift) =
                set1::char_to_scancode(ch).ok_or(KeymapError::UnmappedCharacter(ch))?;
            if needs_shift {
                events.push(ScancodeEvent::key_down(shift, false));
            }
            events.push(ScancodeEvent::key_down(code, false));
            events.push(ScancodeEvent::key_up(code, false));
            if needs_shift {
                events.push(ScancodeEvent::key_up(shift, false));
            }
        }
        Ok(events)
    }
}
