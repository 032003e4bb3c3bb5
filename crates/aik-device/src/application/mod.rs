//! Application layer for the injection device.
//!
//! # What lives here?
//!
//! - **`dispatch`** – The command dispatcher.  Routes one control request by
//!   its control code and shapes the response.  Inject payloads go through
//!   the validator in `aik_core` and then to the forwarder.
//!
//! - **`forward`** – The injection forwarder and the [`forward::DownstreamSink`]
//!   trait it delivers to.  Forwarding never fails from the caller's point of
//!   view; missing or failing sinks are counted as degraded deliveries.
//!
//! - **`registry`** – Holds the single attached sink.  This is the only state
//!   shared between the request path and attach/detach notifications, so it
//!   is the only piece with its own locking.

pub mod dispatch;
pub mod forward;
pub mod registry;
