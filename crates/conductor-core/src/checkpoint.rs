//! Resumable checkpoint representation for partially-executed plans.
//!
//! The core is stateless between invocations; a checkpoint is an optional
//! snapshot of per-task outcomes that lets a later run skip tasks that
//! already succeeded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::spec::ProjectId;
use crate::task::{TaskId, TaskResult, TaskStatus};

/// Snapshot of one task's outcome at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointEntry {
    /// Task identifier.
    pub task_id: TaskId,
    /// Status at checkpoint time.
    pub status: TaskStatus,
    /// Result, present once the task reached a terminal status.
    pub result: Option<TaskResult>,
}

/// Persisted snapshot of a partially-executed plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Project the snapshot belongs to.
    pub project_id: ProjectId,
    /// Per-task outcomes.
    pub entries: Vec<CheckpointEntry>,
}

impl Checkpoint {
    /// Creates a checkpoint for a project.
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            entries: Vec::new(),
        }
    }

    /// Records one task outcome.
    pub fn record(&mut self, task_id: TaskId, status: TaskStatus, result: Option<TaskResult>) {
        self.entries.push(CheckpointEntry {
            task_id,
            status,
            result,
        });
    }

    /// Tasks that already succeeded and can be skipped on resume.
    pub fn succeeded(&self) -> impl Iterator<Item = &CheckpointEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == TaskStatus::Succeeded)
    }

    /// Writes the checkpoint as JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Loads a checkpoint from JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code is allowed to use unwrap")]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let project_id = ProjectId::new();
        let task_id = TaskId::new();
        let mut checkpoint = Checkpoint::new(project_id);
        checkpoint.record(
            task_id,
            TaskStatus::Succeeded,
            Some(TaskResult::success(task_id)),
        );
        checkpoint.record(TaskId::new(), TaskStatus::Failed, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.checkpoint.json");
        checkpoint.save(&path).unwrap();

        let loaded = Checkpoint::load(&path).unwrap();
        assert_eq!(loaded.project_id, project_id);
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.succeeded().count(), 1);
    }
}
