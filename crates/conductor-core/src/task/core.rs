//! Core task types and basic structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Closed set of worker capability tags.
///
/// Each role owns its own concurrency capacity and maps to exactly one
/// worker implementation, selected at pool construction time. Unknown
/// roles are a validation error at decomposition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Project scaffolding and environment preparation.
    Setup,
    /// Feature implementation work.
    FeatureBuild,
    /// Integration, quality checks, and review.
    Verification,
    /// Provisioning and release work.
    Deployment,
}

impl AgentRole {
    /// All roles in the closed set, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Setup,
        Self::FeatureBuild,
        Self::Verification,
        Self::Deployment,
    ];
}

impl fmt::Display for AgentRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::FeatureBuild => "feature_build",
            Self::Verification => "verification",
            Self::Deployment => "deployment",
        };
        formatter.write_str(name)
    }
}

/// Task type tag keying the estimated-duration lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Initialize the repository.
    RepoInit,
    /// Stamp out the project skeleton from the template.
    Scaffold,
    /// Configure environment variables and secrets placeholders.
    EnvConfig,
    /// Install project dependencies.
    DependencyInstall,
    /// Implement one feature or pattern.
    Feature,
    /// Wire completed features together.
    Integration,
    /// Run the automated quality gate.
    QualityCheck,
    /// Review the integrated result.
    Review,
    /// Exercise the assembled project end to end.
    SmokeTest,
    /// Provision hosting infrastructure.
    Provision,
    /// Set up the delivery pipeline.
    PipelineSetup,
    /// Cut the release.
    Release,
    /// Verify the released project.
    PostDeployCheck,
}

/// Task lifecycle status.
///
/// Legal transitions: `Pending -> Ready -> Running -> Succeeded`,
/// `Running -> Retrying -> Running`, `Running`/`Retrying -> Failed`,
/// and `Pending`/`Ready -> Blocked` when a dependency fails. Only the
/// coordinator mutates a task's status.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for dependencies to succeed.
    #[default]
    Pending,
    /// All dependencies succeeded; waiting for a worker slot.
    Ready,
    /// Dispatched to a worker.
    Running,
    /// A failed attempt is being retried after backoff.
    Retrying,
    /// Terminal: the task completed successfully.
    Succeeded,
    /// Terminal: all retries exhausted.
    Failed,
    /// Terminal: a dependency failed; the task was never attempted.
    Blocked,
}

impl TaskStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Blocked)
    }

    /// Whether the transition from `self` to `next` is legal.
    pub fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Ready | Self::Blocked)
                | (Self::Ready, Self::Running | Self::Blocked)
                | (Self::Running, Self::Succeeded | Self::Retrying | Self::Failed)
                | (Self::Retrying, Self::Running | Self::Failed)
        )
    }
}

/// A single node in the task tree.
///
/// Dependencies reference other tasks in the same plan by identifier and
/// must form an acyclic relation. Children exist for display and grouping
/// only; scheduling operates on the flattened dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique identifier within the tree.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Task type tag keying the duration table.
    pub kind: TaskKind,
    /// Assigned worker capability.
    pub role: AgentRole,
    /// Tasks that must succeed before this one runs.
    pub dependencies: Vec<TaskId>,
    /// Child subtasks, for display and grouping only.
    pub children: Vec<TaskNode>,
    /// Estimated duration in abstract time units; always positive.
    pub estimated_duration: u64,
    /// Scheduling priority; higher is scheduled first among ties.
    pub priority: u32,
    /// Optional reference to the pattern this task applies.
    pub pattern: Option<String>,
    /// Current lifecycle status; mutated only by the coordinator.
    pub status: TaskStatus,
}

impl TaskNode {
    /// Creates a new task with the given title, kind, and role.
    pub fn new(title: impl Into<String>, kind: TaskKind, role: AgentRole) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            kind,
            role,
            dependencies: Vec::new(),
            children: Vec::new(),
            estimated_duration: 1,
            priority: 0,
            pattern: None,
            status: TaskStatus::Pending,
        }
    }

    /// Sets task dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Sets the estimated duration.
    ///
    /// # Panics
    /// Panics if `duration` is zero.
    #[must_use]
    pub fn with_duration(mut self, duration: u64) -> Self {
        assert!(duration > 0, "Estimated duration must be positive");
        self.estimated_duration = duration;
        self
    }

    /// Sets the scheduling priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the pattern reference.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets child subtasks.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TaskNode>) -> Self {
        self.children = children;
        self
    }
}
