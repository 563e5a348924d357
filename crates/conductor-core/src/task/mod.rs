//! Task model: identifiers, nodes, trees, statuses, and results.
//!
//! `TaskNode` is the unit of scheduling. The tree hierarchy exists for
//! display and grouping only; the planner and coordinator operate on the
//! flattened dependency graph.

mod core;
mod result;
mod tree;

pub use core::{AgentRole, TaskId, TaskKind, TaskNode, TaskStatus};
pub use result::{ProjectResult, TaskResult};
pub use tree::TaskTree;
