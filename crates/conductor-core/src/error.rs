//! Error taxonomy shared across the conductor crates.

use crate::task::{AgentRole, TaskId};
use serde_json::Error as JsonError;
use std::io;
use std::result::Result as StdResult;
use thiserror::Error;

/// Result alias used throughout the conductor crates.
pub type Result<T> = StdResult<T, OrchestratorError>;

/// Errors raised by decomposition, planning, and execution.
///
/// `Validation` and `Cycle` are fatal to a run: no partial plan is ever
/// handed to the coordinator. `Worker` and `Timeout` are local to a single
/// task attempt and are retried before the task is marked failed.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Malformed project spec, unknown project type, role, or feature template.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Dependency graph is not acyclic; carries the offending cycle in order.
    #[error("Cyclic dependency detected: {cycle:?}")]
    Cycle {
        /// Ordered task identifiers forming the cycle.
        cycle: Vec<TaskId>,
    },

    /// A task references a role with no configured concurrency capacity.
    #[error("No capacity configured for role {0}")]
    Capacity(AgentRole),

    /// No worker implementation registered for a role.
    #[error("No worker registered for role {0}")]
    WorkerMissing(AgentRole),

    /// A worker reported a failure for a single task attempt.
    #[error("Worker failure: {0}")]
    Worker(String),

    /// A task attempt exceeded its configured timeout.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Coordinator invariant violation; non-recoverable.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error while loading configuration or persisting checkpoints.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error while serializing or deserializing checkpoints.
    #[error("JSON error: {0}")]
    Json(#[from] JsonError),

    /// TOML error while parsing configuration.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl OrchestratorError {
    /// Whether this error is recoverable by retrying the task attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Worker(_) | Self::Timeout(_))
    }
}
