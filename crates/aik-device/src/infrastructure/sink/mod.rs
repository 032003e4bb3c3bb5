//! [`DownstreamSink`](crate::application::forward::DownstreamSink)
//! implementations.
//!
//! The platform sink is selected at compile time via `#[cfg(target_os = ...)]`.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
