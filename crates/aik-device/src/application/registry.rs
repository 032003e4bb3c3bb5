//! ConnectionRegistry: the single downstream sink attached to a device.
//!
//! # Why a readers-writer lock? (for beginners)
//!
//! Requests read the sink on every inject; attach and detach happen rarely
//! and asynchronously, whenever the consumer chain below the device changes.
//! Two things must hold:
//!
//! - A reader never sees a half-updated state.  The "connected" flag *is*
//!   `Option::is_some()` on the stored `Arc`, so the flag and the reference
//!   are one value and change together.
//! - `detach` must not return while a delivery that started before it is
//!   still using the old sink.  Forwarders hold a [`SinkLease`] (a read
//!   guard) for the whole `deliver` call, and `detach` needs the write lock,
//!   so it waits for every outstanding lease to drop.
//!
//! A lease must never be held while calling `attach` or `detach` on the same
//! thread; that would wait on itself.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::application::forward::DownstreamSink;

type Slot = Option<Arc<dyn DownstreamSink>>;

/// Per-device holder of the attached [`DownstreamSink`].
#[derive(Default)]
pub struct ConnectionRegistry {
    slot: RwLock<Slot>,
}

impl ConnectionRegistry {
    /// Creates a registry with no sink attached (degraded mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `sink`, replacing and returning any previously attached sink.
    ///
    /// Blocks until in-flight deliveries to the previous sink have finished.
    pub fn attach(&self, sink: Arc<dyn DownstreamSink>) -> Option<Arc<dyn DownstreamSink>> {
        let previous = self.write().replace(sink);
        info!(replaced = previous.is_some(), "downstream sink attached");
        previous
    }

    /// Detaches the current sink and returns it.
    ///
    /// When this returns, no forwarder is still inside `deliver` on the
    /// detached sink.
    pub fn detach(&self) -> Option<Arc<dyn DownstreamSink>> {
        let previous = self.write().take();
        if previous.is_some() {
            info!("downstream sink detached");
        }
        previous
    }

    /// Borrows the current sink for the duration of the returned lease.
    pub fn current_sink(&self) -> SinkLease<'_> {
        SinkLease { guard: self.read() }
    }

    pub fn is_connected(&self) -> bool {
        self.read().is_some()
    }

    // The slot is a single Option that is replaced in one assignment, so a
    // panic while holding the lock cannot leave it half-written.
    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A read lease on the registry.  While it is alive the sink cannot be
/// replaced or detached.
pub struct SinkLease<'a> {
    guard: RwLockReadGuard<'a, Slot>,
}

impl SinkLease<'_> {
    /// The attached sink, or `None` in degraded mode.
    pub fn sink(&self) -> Option<&dyn DownstreamSink> {
        self.guard.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.guard.is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
