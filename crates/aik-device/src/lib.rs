//! aik-device library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does aik-device do? (for beginners)
//!
//! The *device* is the engine behind the AIK control handle.  A caller sends
//! it control requests; the device answers liveness checks, echoes buffers,
//! and injects scancode events into whatever keyboard consumer is attached
//! below it.
//!
//! For every request the device:
//!
//! 1. Routes on the control code (`Dispatcher`).
//! 2. Validates inject payloads before reading a single event
//!    (`aik_core::protocol::validate`).
//! 3. Hands the decoded batch to the `InjectionForwarder`, which looks up
//!    the currently attached `DownstreamSink` in the `ConnectionRegistry`.
//! 4. Completes the request.  When no sink is attached the events are still
//!    acknowledged, and the degraded delivery is counted in
//!    `ForwardingStats` and logged.

/// Application layer: dispatch, forwarding, and the connection registry.
pub mod application;

/// Infrastructure layer: sinks, the sequential request queue, configuration.
pub mod infrastructure;
