//! Infrastructure layer: downstream sinks, the request queue and configuration.

pub mod config;
pub mod queue;
pub mod sink;
