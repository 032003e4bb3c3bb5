//! InjectionForwarder: hands validated batches to the attached sink.
//!
//! This use case sits at the application layer and delegates to a
//! [`DownstreamSink`] trait object for the actual delivery.  The production
//! sink and the test fakes are in the infrastructure layer.
//!
//! # Degraded mode
//!
//! Existing callers treat any failed inject as fatal, so forwarding never
//! reports failure to them.  When no sink is attached, or the sink returns an
//! error, the batch is acknowledged in full (`consumed == count`) without
//! being delivered.  Operators see the difference through [`ForwardingStats`]
//! and a `warn!` log line per degraded batch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use aik_core::{InjectionBatch, ScancodeEvent};
use serde::Serialize;
use thiserror::Error;
use tracing::{trace, warn};

use crate::application::registry::ConnectionRegistry;

/// Error type reported by a [`DownstreamSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("sink rejected all {requested} events")]
    Rejected { requested: usize },
}

/// The next stage of the keyboard input stack.
///
/// Implementations must not block: the forwarder calls `deliver` while
/// holding a registry lease, and `detach` waits for that lease.
pub trait DownstreamSink: Send + Sync {
    /// Delivers `events` in slice order and returns how many were consumed.
    fn deliver(&self, events: &[ScancodeEvent]) -> Result<usize, SinkError>;
}

/// Why a batch was acknowledged without being delivered.
///
/// Internal only: never surfaced as a request failure.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("no downstream consumer attached")]
    UpstreamUnavailable,
    #[error("downstream sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Result of forwarding one batch.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// The sink received the batch.
    Delivered { consumed: u32 },
    /// The batch was accepted but went nowhere.
    Degraded { accepted: u32, reason: ForwardError },
}

impl ForwardOutcome {
    /// Count reported back to the caller.
    pub fn consumed(&self) -> u32 {
        match self {
            ForwardOutcome::Delivered { consumed } => *consumed,
            ForwardOutcome::Degraded { accepted, .. } => *accepted,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ForwardOutcome::Degraded { .. })
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

/// Operator-visible counters for the forwarding path.
///
/// Counters only ever increase.  `Relaxed` ordering is enough because no
/// other memory is published through them.
#[derive(Debug, Default)]
pub struct ForwardingStats {
    delivered_batches: AtomicU64,
    delivered_events: AtomicU64,
    degraded_batches: AtomicU64,
    degraded_events: AtomicU64,
    sink_failures: AtomicU64,
}

/// Point-in-time copy of [`ForwardingStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub delivered_batches: u64,
    pub delivered_events: u64,
    pub degraded_batches: u64,
    pub degraded_events: u64,
    pub sink_failures: u64,
}

impl ForwardingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            delivered_batches: self.delivered_batches.load(Ordering::Relaxed),
            delivered_events: self.delivered_events.load(Ordering::Relaxed),
            degraded_batches: self.degraded_batches.load(Ordering::Relaxed),
            degraded_events: self.degraded_events.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }

    fn record(&self, outcome: &ForwardOutcome) {
        match outcome {
            ForwardOutcome::Delivered { consumed } => {
                self.delivered_batches.fetch_add(1, Ordering::Relaxed);
                self.delivered_events
                    .fetch_add(u64::from(*consumed), Ordering::Relaxed);
            }
            ForwardOutcome::Degraded { accepted, reason } => {
                self.degraded_batches.fetch_add(1, Ordering::Relaxed);
                self.degraded_events
                    .fetch_add(u64::from(*accepted), Ordering::Relaxed);
                if matches!(reason, ForwardError::Sink(_)) {
                    self.sink_failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

// ── Forwarder ─────────────────────────────────────────────────────────────────

/// Delivers batches to the sink currently held by the [`ConnectionRegistry`].
pub struct InjectionForwarder {
    registry: Arc<ConnectionRegistry>,
    stats: Arc<ForwardingStats>,
}

impl InjectionForwarder {
    pub fn new(registry: Arc<ConnectionRegistry>, stats: Arc<ForwardingStats>) -> Self {
        Self { registry, stats }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<ForwardingStats> {
        &self.stats
    }

    /// Forwards `batch` and records the outcome.  Never fails.
    pub fn forward(&self, batch: &InjectionBatch) -> ForwardOutcome {
        let count = batch.count();
        let outcome = match self.try_deliver(batch) {
            Ok(consumed) => {
                trace!(count, consumed, "batch delivered");
                ForwardOutcome::Delivered { consumed }
            }
            Err(reason) => {
                warn!(count, %reason, "batch accepted without delivery");
                ForwardOutcome::Degraded {
                    accepted: count,
                    reason,
                }
            }
        };
        self.stats.record(&outcome);
        outcome
    }

    fn try_deliver(&self, batch: &InjectionBatch) -> Result<u32, ForwardError> {
        let lease = self.registry.current_sink();
        let sink = lease.sink().ok_or(ForwardError::UpstreamUnavailable)?;
        let consumed = sink.deliver(batch.events())?;
        // A sink may not claim more than it was given.
        Ok(consumed.min(batch.events().len()) as u32)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
