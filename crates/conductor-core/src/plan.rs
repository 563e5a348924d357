//! Execution plan and phase types produced by the planner.

use serde::{Deserialize, Serialize};

use crate::config::CapacityTable;
use crate::spec::ProjectId;
use crate::task::{TaskId, TaskNode};

/// One scheduling step: a set of tasks that are mutually schedulable once
/// all of their cross-phase dependencies are satisfied.
///
/// Phases are ordered so that no task in a phase depends on a task first
/// appearing in a later phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPhase {
    /// Tasks in this phase, ordered by priority then declaration order.
    pub tasks: Vec<TaskId>,
    /// Topological layer this phase was carved from.
    pub layer: usize,
    /// Wave index within the layer when capacity splitting applied.
    pub wave: usize,
}

/// Dependency- and capacity-aware schedule for a task tree.
///
/// Read-only to the coordinator except for per-task status, which lives on
/// the nodes and is mutated only along the documented transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Project the plan was built for.
    pub project_id: ProjectId,
    /// Every schedulable task, flattened, in declaration order.
    pub tasks: Vec<TaskNode>,
    /// Ordered phases.
    pub phases: Vec<ExecutionPhase>,
    /// Per-role concurrency capacities the plan was built against.
    pub capacities: CapacityTable,
    /// Critical path length in abstract time units; the estimated total
    /// duration assuming no starvation beyond the wave splitting.
    pub total_estimated_duration: u64,
    /// Ratio of total task work to critical path length; always >= 1.
    pub parallelism_degree: f64,
}

impl ExecutionPlan {
    /// Looks up a task by identifier.
    pub fn task(&self, id: TaskId) -> Option<&TaskNode> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Sum of all task duration estimates.
    pub fn total_work(&self) -> u64 {
        self.tasks.iter().map(|task| task.estimated_duration).sum()
    }

    /// Number of schedulable tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the plan contains no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
