//! Template-driven decomposition of project specs into task trees.
//!
//! Decomposition is not a general planner: each project type owns an
//! ordered list of phase templates. Setup, integration/verification, and
//! deployment expand into fixed sequential chains; feature development
//! expands into one independent task per requested pattern, which is what
//! creates the parallel opportunity the scheduler exploits.

mod patterns;
mod templates;

pub use patterns::{FeaturePattern, match_pattern};
pub use templates::{PhaseExpansion, PhaseTemplate, TaskTemplate, TemplateRegistry};

use conductor_core::{
    AgentRole, OrchestratorError, ProjectSpec, Result, TaskId, TaskKind, TaskNode, TaskTree,
};
use tracing::debug;

/// Turns a declarative project description into a hierarchical task tree
/// with explicit dependency edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskDecomposer {
    registry: TemplateRegistry,
}

impl TaskDecomposer {
    /// Creates a decomposer over the built-in template registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: TemplateRegistry,
        }
    }

    /// Decomposes a project spec into a task tree.
    ///
    /// Purely a transformation; the spec is never mutated.
    ///
    /// # Errors
    /// Returns a validation error when required spec fields are missing or
    /// when a requested feature cannot be mapped to a known pattern.
    pub fn decompose(&self, spec: &ProjectSpec) -> Result<TaskTree> {
        Self::validate(spec)?;

        let mut tasks: Vec<TaskNode> = Vec::new();
        // Dependency anchors carried across phases: the tail of the last
        // sequential chain, or every feature task after the feature phase.
        let mut anchors: Vec<TaskId> = Vec::new();

        for phase in self.registry.phases_for(spec.project_type) {
            anchors = match phase.expansion {
                PhaseExpansion::Sequential(templates) => {
                    self.expand_sequential(templates, &anchors, &mut tasks)
                }
                PhaseExpansion::PerFeature => self.expand_features(spec, &anchors, &mut tasks)?,
            };
        }

        debug!(
            project = %spec.id,
            task_count = tasks.len(),
            "Decomposed project spec"
        );
        Ok(TaskTree::new(spec.id, tasks))
    }

    /// Expands a fixed sequential chain; each task depends on the previous
    /// one in its template, and the first on the previous phase's anchors.
    fn expand_sequential(
        &self,
        templates: &[TaskTemplate],
        anchors: &[TaskId],
        tasks: &mut Vec<TaskNode>,
    ) -> Vec<TaskId> {
        let mut previous: Vec<TaskId> = anchors.to_vec();
        for (index, template) in templates.iter().enumerate() {
            let task = TaskNode::new(template.title, template.kind, template.role)
                .with_dependencies(previous.clone())
                .with_duration(self.registry.estimated_duration(template.kind))
                .with_priority(index as u32);
            previous = vec![task.id];
            tasks.push(task);
        }
        previous
    }

    /// Expands the feature phase: one task per requested pattern, all
    /// depending on the final setup task, with no edges among themselves.
    fn expand_features(
        &self,
        spec: &ProjectSpec,
        anchors: &[TaskId],
        tasks: &mut Vec<TaskNode>,
    ) -> Result<Vec<TaskId>> {
        let mut feature_ids = Vec::new();
        for (index, feature) in spec.patterns.iter().enumerate() {
            let pattern =
                match_pattern(spec.project_type, feature).ok_or_else(|| {
                    OrchestratorError::Validation(format!(
                        "Feature '{feature}' does not map to a known {} pattern",
                        spec.project_type
                    ))
                })?;

            let task = TaskNode::new(
                format!("Implement {}", pattern.name.replace('_', " ")),
                TaskKind::Feature,
                AgentRole::FeatureBuild,
            )
            .with_dependencies(anchors.to_vec())
            .with_duration(self.registry.estimated_duration(TaskKind::Feature))
            .with_priority(index as u32)
            .with_pattern(pattern.name);

            feature_ids.push(task.id);
            tasks.push(task);
        }

        // With no features the next chain anchors directly on setup.
        if feature_ids.is_empty() {
            Ok(anchors.to_vec())
        } else {
            Ok(feature_ids)
        }
    }

    fn validate(spec: &ProjectSpec) -> Result<()> {
        if spec.name.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "Project name must not be empty".to_owned(),
            ));
        }
        if spec.requirements.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "Project requirements must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}
