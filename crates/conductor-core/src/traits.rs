//! Trait definitions for worker capability providers.

use async_trait::async_trait;

use crate::error::Result;
use crate::task::{TaskNode, TaskResult};

/// External capability that executes a single task.
///
/// The coordinator treats implementations as opaque, potentially slow,
/// potentially failing operations and never inspects their internals. A
/// worker is invoked exactly once per running attempt; failures surface as
/// [`crate::OrchestratorError::Worker`] and are subject to the retry policy.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Executes the task and reports its result.
    ///
    /// # Errors
    /// Returns an error if the work could not be completed.
    async fn execute(&self, task: &TaskNode) -> Result<TaskResult>;
}
