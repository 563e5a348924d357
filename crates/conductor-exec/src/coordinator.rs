//! Plan-driving coordinator with retry and failure propagation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use conductor_core::{
    Checkpoint, ExecutionPhase, ExecutionPlan, OrchestratorConfig, OrchestratorError,
    ProgressChannel, ProjectResult, Result, RetryConfig, TaskId, TaskNode, TaskResult, TaskStatus,
    Worker,
};

use crate::pool::WorkerPool;

/// Mutable per-run bookkeeping owned exclusively by the coordinator.
struct RunState {
    status: HashMap<TaskId, TaskStatus>,
    results: HashMap<TaskId, TaskResult>,
    dependencies: HashMap<TaskId, Vec<TaskId>>,
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl RunState {
    fn from_plan(plan: &ExecutionPlan) -> Self {
        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut dependencies = HashMap::new();
        for task in &plan.tasks {
            dependencies.insert(task.id, task.dependencies.clone());
            for dep in &task.dependencies {
                dependents.entry(*dep).or_default().push(task.id);
            }
        }
        Self {
            status: plan
                .tasks
                .iter()
                .map(|task| (task.id, TaskStatus::Pending))
                .collect(),
            results: HashMap::new(),
            dependencies,
            dependents,
        }
    }

    fn status(&self, id: TaskId) -> TaskStatus {
        self.status.get(&id).copied().unwrap_or(TaskStatus::Pending)
    }

    fn all_terminal(&self, phase: &ExecutionPhase) -> bool {
        phase.tasks.iter().all(|id| self.status(*id).is_terminal())
    }
}

/// Runtime driver: walks the execution plan, dispatches ready tasks to
/// capacity-bounded worker slots, applies retry and failure-propagation
/// rules, and produces the aggregated project result.
///
/// Phases are processed in plan order with a strict barrier: the
/// coordinator advances only once every task in the current phase has
/// reached a terminal status. Within a phase, dispatch is fully
/// asynchronous; a fast task frees its slot for the next queued task of
/// the same role before the phase completes.
pub struct Coordinator {
    pool: Arc<WorkerPool>,
    retry: RetryConfig,
    task_timeout_ms: u64,
    progress: ProgressChannel,
    checkpoint_path: Option<PathBuf>,
}

impl Coordinator {
    /// Creates a coordinator over a worker pool.
    pub fn new(pool: Arc<WorkerPool>, config: &OrchestratorConfig, progress: ProgressChannel) -> Self {
        Self {
            pool,
            retry: config.retry,
            task_timeout_ms: config.task_timeout_ms,
            progress,
            checkpoint_path: None,
        }
    }

    /// Persists a checkpoint after every completed phase.
    #[must_use]
    pub fn with_checkpoint_path(mut self, path: PathBuf) -> Self {
        self.checkpoint_path = Some(path);
        self
    }

    /// Executes a plan to completion.
    ///
    /// Task failures never abort the run: dependents are blocked and the
    /// remaining branches continue, so the result always enumerates every
    /// task's final outcome.
    ///
    /// # Errors
    /// Returns an error for infrastructure problems only: a role without
    /// a registered worker, slot accounting violations, or checkpoint IO.
    pub async fn execute(&self, plan: &ExecutionPlan) -> Result<ProjectResult> {
        self.run(plan, RunState::from_plan(plan)).await
    }

    /// Executes a plan, skipping tasks a previous run already completed.
    ///
    /// # Errors
    /// Same failure modes as [`Coordinator::execute`].
    pub async fn execute_resuming(
        &self,
        plan: &ExecutionPlan,
        checkpoint: &Checkpoint,
    ) -> Result<ProjectResult> {
        let mut state = RunState::from_plan(plan);
        for entry in checkpoint.succeeded() {
            if state.status.contains_key(&entry.task_id) {
                state.status.insert(entry.task_id, TaskStatus::Succeeded);
                if let Some(result) = &entry.result {
                    state.results.insert(entry.task_id, result.clone());
                }
            }
        }
        info!(
            resumed = checkpoint.succeeded().count(),
            "Resuming from checkpoint"
        );
        self.run(plan, state).await
    }

    async fn run(&self, plan: &ExecutionPlan, mut state: RunState) -> Result<ProjectResult> {
        // Fail fast if any role in the plan has no worker registered.
        let roles: HashSet<_> = plan.tasks.iter().map(|task| task.role).collect();
        for role in roles {
            self.pool.worker(role)?;
        }

        let nodes: HashMap<TaskId, TaskNode> = plan
            .tasks
            .iter()
            .map(|task| (task.id, task.clone()))
            .collect();
        let order: HashMap<TaskId, usize> = plan
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (task.id, index))
            .collect();

        let started = Instant::now();
        for phase in &plan.phases {
            debug!(
                layer = phase.layer,
                wave = phase.wave,
                tasks = phase.tasks.len(),
                "Entering phase"
            );
            self.run_phase(phase, &nodes, &order, &mut state).await?;

            if let Some(path) = &self.checkpoint_path {
                self.snapshot(plan, &state).save(path)?;
            }
        }

        let wall_duration_ms = started.elapsed().as_millis() as u64;
        Ok(Self::aggregate(plan, state, wall_duration_ms))
    }

    /// Drives one phase to its barrier: every task terminal.
    async fn run_phase(
        &self,
        phase: &ExecutionPhase,
        nodes: &HashMap<TaskId, TaskNode>,
        order: &HashMap<TaskId, usize>,
        state: &mut RunState,
    ) -> Result<()> {
        let mut join_set: JoinSet<(TaskId, Result<TaskResult>)> = JoinSet::new();

        loop {
            self.promote_pending(phase, state);
            self.dispatch_ready(phase, nodes, order, state, &mut join_set)?;

            if state.all_terminal(phase) {
                break;
            }
            if join_set.is_empty() {
                return Err(OrchestratorError::Internal(format!(
                    "Phase stalled with no running tasks (layer {}, wave {})",
                    phase.layer, phase.wave
                )));
            }

            if let Some(joined) = join_set.join_next().await {
                let (task_id, outcome) =
                    joined.map_err(|error| OrchestratorError::Internal(error.to_string()))?;
                self.complete_task(task_id, outcome, state);
            }
        }
        Ok(())
    }

    /// Moves pending tasks to ready the instant every dependency has
    /// succeeded, or to blocked the instant any dependency has failed.
    fn promote_pending(&self, phase: &ExecutionPhase, state: &mut RunState) {
        for &task_id in &phase.tasks {
            if state.status(task_id) != TaskStatus::Pending {
                continue;
            }
            let deps = state.dependencies.get(&task_id).cloned().unwrap_or_default();
            let failed_dep = deps.iter().any(|dep| {
                matches!(state.status(*dep), TaskStatus::Failed | TaskStatus::Blocked)
            });
            if failed_dep {
                self.transition(state, task_id, TaskStatus::Blocked);
            } else if deps
                .iter()
                .all(|dep| state.status(*dep) == TaskStatus::Succeeded)
            {
                self.transition(state, task_id, TaskStatus::Ready);
            }
        }
    }

    /// Dispatches ready tasks to free role slots, highest priority first,
    /// ties by declaration order.
    fn dispatch_ready(
        &self,
        phase: &ExecutionPhase,
        nodes: &HashMap<TaskId, TaskNode>,
        order: &HashMap<TaskId, usize>,
        state: &mut RunState,
        join_set: &mut JoinSet<(TaskId, Result<TaskResult>)>,
    ) -> Result<()> {
        let mut ready: Vec<TaskId> = phase
            .tasks
            .iter()
            .copied()
            .filter(|id| state.status(*id) == TaskStatus::Ready)
            .collect();
        ready.sort_by(|lhs, rhs| {
            let lhs_node = &nodes[lhs];
            let rhs_node = &nodes[rhs];
            rhs_node
                .priority
                .cmp(&lhs_node.priority)
                .then(order[lhs].cmp(&order[rhs]))
        });

        for task_id in ready {
            let task = nodes[&task_id].clone();
            // The slot must be reserved before the task becomes running,
            // and is released only when the attempt loop finishes.
            let Some(permit) = self.pool.try_reserve(task.role)? else {
                continue;
            };

            self.transition(state, task_id, TaskStatus::Running);
            let worker = self.pool.worker(task.role)?;
            let retry = self.retry;
            let timeout_ms = self.task_timeout_ms;
            let progress = self.progress.clone();

            join_set.spawn(async move {
                let outcome =
                    Self::run_attempts(&task, worker.as_ref(), retry, timeout_ms, &progress).await;
                drop(permit);
                (task.id, outcome)
            });
        }
        Ok(())
    }

    /// Executes one task with bounded retries and exponential backoff.
    ///
    /// The worker is invoked exactly once per running attempt; a timeout
    /// is treated identically to a worker-reported failure.
    async fn run_attempts(
        task: &TaskNode,
        worker: &dyn Worker,
        retry: RetryConfig,
        timeout_ms: u64,
        progress: &ProgressChannel,
    ) -> Result<TaskResult> {
        let mut attempt: u32 = 0;
        loop {
            let attempt_started = Instant::now();
            let outcome = if timeout_ms > 0 {
                match timeout(Duration::from_millis(timeout_ms), worker.execute(task)).await {
                    Ok(result) => result,
                    Err(_) => Err(OrchestratorError::Timeout(timeout_ms)),
                }
            } else {
                worker.execute(task).await
            };

            // A result with the success flag cleared is a failure signal.
            let outcome = outcome.and_then(|result| {
                if result.success {
                    Ok(result)
                } else {
                    Err(OrchestratorError::Worker(format!(
                        "Worker reported failure for '{}': {}",
                        task.title, result.notes
                    )))
                }
            });

            match outcome {
                Ok(mut result) => {
                    result.task_id = task.id;
                    if result.duration_ms == 0 {
                        result.duration_ms = attempt_started.elapsed().as_millis() as u64;
                    }
                    return Ok(result);
                }
                Err(error) if error.is_retryable() && attempt < retry.max_retries => {
                    attempt += 1;
                    warn!(
                        task = %task.title,
                        attempt,
                        max_retries = retry.max_retries,
                        "Task attempt failed: {error}. Retrying after backoff"
                    );
                    progress.transition(task.id, TaskStatus::Running, TaskStatus::Retrying);
                    sleep(Duration::from_millis(retry.backoff_ms(attempt))).await;
                    progress.transition(task.id, TaskStatus::Retrying, TaskStatus::Running);
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Records a finished task and propagates blocking to its transitive
    /// dependents when it failed.
    fn complete_task(&self, task_id: TaskId, outcome: Result<TaskResult>, state: &mut RunState) {
        match outcome {
            Ok(result) => {
                self.transition(state, task_id, TaskStatus::Succeeded);
                state.results.insert(task_id, result);
            }
            Err(error) => {
                warn!(task_id = %task_id, "Task failed permanently: {error}");
                self.transition(state, task_id, TaskStatus::Failed);
                state
                    .results
                    .insert(task_id, TaskResult::failure(task_id, error.to_string()));
                self.block_dependents(task_id, state);
            }
        }
    }

    /// Marks every not-yet-started transitive dependent of a failed task
    /// as blocked, including tasks in phases not yet entered. Tasks
    /// already dispatched keep running; committed work is never wasted.
    fn block_dependents(&self, failed: TaskId, state: &mut RunState) {
        let mut queue: VecDeque<TaskId> = VecDeque::new();
        let mut seen: HashSet<TaskId> = HashSet::new();
        queue.push_back(failed);
        seen.insert(failed);

        while let Some(current) = queue.pop_front() {
            let dependents = state.dependents.get(&current).cloned().unwrap_or_default();
            for dependent in dependents {
                if seen.insert(dependent) {
                    if matches!(
                        state.status(dependent),
                        TaskStatus::Pending | TaskStatus::Ready
                    ) {
                        self.transition(state, dependent, TaskStatus::Blocked);
                    }
                    queue.push_back(dependent);
                }
            }
        }
    }

    /// Applies a status transition, emitting the progress event.
    fn transition(&self, state: &mut RunState, task_id: TaskId, next: TaskStatus) {
        let previous = state.status(task_id);
        debug_assert!(
            previous.allows(next),
            "illegal transition {previous:?} -> {next:?}"
        );
        state.status.insert(task_id, next);
        self.progress.transition(task_id, previous, next);
        debug!(task_id = %task_id, ?previous, ?next, "Task transition");
    }

    /// Snapshot of terminal task outcomes for checkpointing.
    fn snapshot(&self, plan: &ExecutionPlan, state: &RunState) -> Checkpoint {
        let mut checkpoint = Checkpoint::new(plan.project_id);
        for task in &plan.tasks {
            let status = state.status(task.id);
            if status.is_terminal() {
                checkpoint.record(task.id, status, state.results.get(&task.id).cloned());
            }
        }
        checkpoint
    }

    /// Builds the final aggregated result in plan declaration order.
    fn aggregate(plan: &ExecutionPlan, mut state: RunState, wall_duration_ms: u64) -> ProjectResult {
        let task_results: Vec<TaskResult> = plan
            .tasks
            .iter()
            .filter_map(|task| state.results.remove(&task.id))
            .collect();
        let priorities: Vec<(TaskId, u32)> = plan
            .tasks
            .iter()
            .map(|task| (task.id, task.priority))
            .collect();
        let failed: Vec<TaskId> = plan
            .tasks
            .iter()
            .filter(|task| state.status(task.id) == TaskStatus::Failed)
            .map(|task| task.id)
            .collect();
        let blocked: Vec<TaskId> = plan
            .tasks
            .iter()
            .filter(|task| state.status(task.id) == TaskStatus::Blocked)
            .map(|task| task.id)
            .collect();

        let serial_duration_ms: u64 = task_results.iter().map(|result| result.duration_ms).sum();
        ProjectResult::aggregate(task_results, &priorities, failed, blocked)
            .with_timing(wall_duration_ms, serial_duration_ms)
    }
}
