//! Domain values for the injection device.
//!
//! Nothing in here knows about byte layouts or the device that consumes the
//! events.  The wire representation lives in [`crate::protocol`].

/// Scancode events and the bounded batch that carries them.
///
/// See [`event::InjectionBatch`] for the main type.
pub mod event;
