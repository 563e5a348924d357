//! Task and project execution results.

use serde::{Deserialize, Serialize};

use super::core::TaskId;

/// Result of executing a single task, reported by a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task that was executed.
    pub task_id: TaskId,
    /// Whether the worker reported success.
    pub success: bool,
    /// Opaque output payload.
    pub output: String,
    /// References to artifacts produced by the task.
    pub artifacts: Vec<String>,
    /// Actual duration in milliseconds.
    pub duration_ms: u64,
    /// Quality score reported by the worker, 0-100.
    pub quality_score: u8,
    /// Compliance score reported by the worker, 0-100.
    pub compliance_score: u8,
    /// Free-text notes.
    pub notes: String,
}

impl TaskResult {
    /// Creates a successful result with full scores and no output.
    pub fn success(task_id: TaskId) -> Self {
        Self {
            task_id,
            success: true,
            output: String::new(),
            artifacts: Vec::new(),
            duration_ms: 0,
            quality_score: 100,
            compliance_score: 100,
            notes: String::new(),
        }
    }

    /// Creates a failed result carrying the final error text.
    pub fn failure(task_id: TaskId, notes: impl Into<String>) -> Self {
        Self {
            task_id,
            success: false,
            output: String::new(),
            artifacts: Vec::new(),
            duration_ms: 0,
            quality_score: 0,
            compliance_score: 0,
            notes: notes.into(),
        }
    }

    /// Sets the output payload.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the quality and compliance scores.
    #[must_use]
    pub fn with_scores(mut self, quality: u8, compliance: u8) -> Self {
        self.quality_score = quality.min(100);
        self.compliance_score = compliance.min(100);
        self
    }

    /// Sets the actual duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Aggregated result of a full project run.
///
/// A failed run still enumerates every task's final outcome, so a caller
/// can distinguish "nothing ran" from "some work succeeded, some failed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResult {
    /// False if any task ended failed or blocked.
    pub success: bool,
    /// Results for every task that was attempted.
    pub task_results: Vec<TaskResult>,
    /// Priority-weighted quality summary, 0-100.
    pub quality_summary: f64,
    /// Priority-weighted compliance summary, 0-100.
    pub compliance_summary: f64,
    /// Tasks that exhausted retries.
    pub failed: Vec<TaskId>,
    /// Tasks never attempted because a dependency failed.
    pub blocked: Vec<TaskId>,
    /// Wall-clock duration of the run in milliseconds.
    pub wall_duration_ms: u64,
    /// Ratio of summed per-task durations to wall duration; the speedup
    /// achieved over fully serial execution.
    pub parallel_speedup: f64,
}

impl ProjectResult {
    /// Aggregates per-task results weighted by task priority.
    ///
    /// `priorities` pairs each attempted task with its scheduling priority;
    /// tasks missing from the map weigh as priority zero.
    pub fn aggregate(
        task_results: Vec<TaskResult>,
        priorities: &[(TaskId, u32)],
        failed: Vec<TaskId>,
        blocked: Vec<TaskId>,
    ) -> Self {
        let weight_of = |task_id: TaskId| -> f64 {
            priorities
                .iter()
                .find(|(id, _)| *id == task_id)
                .map_or(0.0, |(_, priority)| f64::from(*priority))
                + 1.0
        };

        let mut total_weight = 0.0;
        let mut quality = 0.0;
        let mut compliance = 0.0;
        for result in &task_results {
            let weight = weight_of(result.task_id);
            total_weight += weight;
            quality += weight * f64::from(result.quality_score);
            compliance += weight * f64::from(result.compliance_score);
        }

        let (quality_summary, compliance_summary) = if total_weight > 0.0 {
            (quality / total_weight, compliance / total_weight)
        } else {
            (0.0, 0.0)
        };

        Self {
            success: failed.is_empty() && blocked.is_empty(),
            task_results,
            quality_summary,
            compliance_summary,
            failed,
            blocked,
            wall_duration_ms: 0,
            parallel_speedup: 1.0,
        }
    }

    /// Sets the wall-clock duration and derives the achieved speedup from
    /// the summed per-task durations.
    #[must_use]
    pub fn with_timing(mut self, wall_duration_ms: u64, serial_duration_ms: u64) -> Self {
        self.wall_duration_ms = wall_duration_ms;
        self.parallel_speedup = if wall_duration_ms > 0 {
            serial_duration_ms as f64 / wall_duration_ms as f64
        } else {
            1.0
        };
        self
    }
}
