//! Progress event channel for task status transitions.
//!
//! The coordinator emits one [`StatusEvent`] per transition; an external
//! reporting collaborator consumes the stream. Send failures are logged
//! and never propagate into execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::task::{TaskId, TaskStatus};

/// A single task status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Task that transitioned.
    pub task_id: TaskId,
    /// Status before the transition.
    pub previous: TaskStatus,
    /// Status after the transition.
    pub current: TaskStatus,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
}

/// Sender half of the progress stream.
#[derive(Clone)]
pub struct ProgressChannel {
    sender: mpsc::UnboundedSender<StatusEvent>,
}

impl ProgressChannel {
    /// Creates a channel, returning the sender and the event receiver.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Creates a progress channel from an existing sender.
    pub fn from_sender(sender: mpsc::UnboundedSender<StatusEvent>) -> Self {
        Self { sender }
    }

    /// Emits a transition event.
    pub fn transition(&self, task_id: TaskId, previous: TaskStatus, current: TaskStatus) {
        let event = StatusEvent {
            task_id,
            previous,
            current,
            timestamp: Utc::now(),
        };
        if let Err(error) = self.sender.send(event) {
            warn!("Failed to send progress event: {error}");
        }
    }
}
