//! Core types and traits for the conductor orchestration system.
//!
//! This crate provides the shared data model (project specs, task trees,
//! execution plans, results), error handling, configuration, progress
//! events, and the worker capability trait used by the planner and
//! coordinator crates.

/// Resumable checkpoint representation for partially-executed plans.
pub mod checkpoint;
/// Configuration types for capacities, retries, and timeouts.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Execution plan and phase types produced by the planner.
pub mod plan;
/// Progress event channel for task status transitions.
pub mod progress;
/// Project specification and project-type detection.
pub mod spec;
/// Task model: identifiers, nodes, trees, statuses, and results.
pub mod task;
/// Trait definitions for worker capability providers.
pub mod traits;

pub use checkpoint::{Checkpoint, CheckpointEntry};
pub use config::{CapacityTable, OrchestratorConfig, RetryConfig};
pub use error::{OrchestratorError, Result};
pub use plan::{ExecutionPhase, ExecutionPlan};
pub use progress::{ProgressChannel, StatusEvent};
pub use spec::{Constraints, ProjectId, ProjectSpec, ProjectType, SpecPriority};
pub use task::{
    AgentRole, ProjectResult, TaskId, TaskKind, TaskNode, TaskResult, TaskStatus, TaskTree,
};
pub use traits::Worker;
