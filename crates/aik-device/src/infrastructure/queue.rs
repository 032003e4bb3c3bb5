//! Sequential request queue.
//!
//! One Tokio task owns the [`Dispatcher`] and handles requests strictly one
//! at a time in arrival order, so dispatch never runs concurrently with
//! itself.  Callers talk to the task through a cloneable [`QueueHandle`]:
//!
//! ```text
//! QueueHandle::submit ──mpsc──▶ queue task ──dispatch──▶ Dispatcher
//!        ▲                          │
//!        └─────────oneshot──────────┘  QueuedResponse { result, output }
//! ```
//!
//! The channel is bounded; `submit` waits for space when `depth` requests are
//! already pending.

use aik_core::ResponseCode;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::application::dispatch::{Completion, ControlRequest, DispatchError, Dispatcher};

/// Error returned by [`QueueHandle::submit`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue task has stopped.
    #[error("request queue is closed")]
    Closed,
}

/// Response to one queued request.
#[derive(Debug)]
pub struct QueuedResponse {
    pub result: Result<Completion, DispatchError>,
    /// The output buffer, truncated to the bytes actually written.
    pub output: Vec<u8>,
}

impl QueuedResponse {
    pub fn status(&self) -> ResponseCode {
        match &self.result {
            Ok(_) => ResponseCode::Success,
            Err(err) => err.status(),
        }
    }
}

struct QueuedRequest {
    control_code: u32,
    input: Vec<u8>,
    output_capacity: usize,
    reply: oneshot::Sender<QueuedResponse>,
}

/// Spawner for the queue task.
pub struct SequentialQueue;

impl SequentialQueue {
    /// Starts the queue task on the current Tokio runtime.
    ///
    /// The task exits once every [`QueueHandle`] has been dropped.  A `depth`
    /// of zero is treated as one.
    pub fn spawn(dispatcher: Dispatcher, depth: usize) -> (QueueHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        let task = tokio::spawn(run(dispatcher, rx));
        (QueueHandle { tx }, task)
    }
}

async fn run(dispatcher: Dispatcher, mut rx: mpsc::Receiver<QueuedRequest>) {
    info!("request queue started");
    while let Some(request) = rx.recv().await {
        let QueuedRequest {
            control_code,
            input,
            output_capacity,
            reply,
        } = request;

        let mut output = vec![0u8; output_capacity];
        let result = dispatcher.dispatch(ControlRequest::new(control_code, &input, &mut output));
        output.truncate(result.as_ref().map_or(0, |c| c.bytes_written));

        if reply.send(QueuedResponse { result, output }).is_err() {
            debug!("requester dropped before completion");
        }
    }
    info!("request queue stopped");
}

/// Cloneable handle for submitting requests.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<QueuedRequest>,
}

impl QueueHandle {
    /// Submits one request and waits for its completion.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the queue task has stopped.
    pub async fn submit(
        &self,
        control_code: u32,
        input: Vec<u8>,
        output_capacity: usize,
    ) -> Result<QueuedResponse, QueueError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(QueuedRequest {
                control_code,
                input,
                output_capacity,
                reply,
            })
            .await
            .map_err(|_| QueueError::Closed)?;
        response.await.map_err(|_| QueueError::Closed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
