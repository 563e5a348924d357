//! Phase and wave construction with scheduling metrics.

use std::collections::HashMap;

use conductor_core::{
    AgentRole, CapacityTable, ExecutionPhase, ExecutionPlan, OrchestratorError, Result, TaskId,
    TaskTree,
};
use tracing::debug;

use crate::graph::DepGraph;

/// Groups a task tree into ordered, capacity-aware execution phases.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionPlanner;

impl ExecutionPlanner {
    /// Builds an execution plan from a task tree and the role capacity
    /// table.
    ///
    /// Each topological layer is split per role into waves of at most the
    /// role's capacity, ordered by priority (higher first, ties by
    /// declaration order); every wave becomes one phase.
    ///
    /// # Errors
    /// Returns a cycle error carrying the offending cycle if the
    /// dependency relation is not acyclic, and a capacity error if any
    /// task references a role absent from the capacity table.
    pub fn plan(tree: &TaskTree, capacities: &CapacityTable) -> Result<ExecutionPlan> {
        let tasks = tree.flatten();

        for task in &tasks {
            if capacities.get(task.role).is_none() {
                return Err(OrchestratorError::Capacity(task.role));
            }
        }

        let graph = DepGraph::from_tasks(&tasks)?;
        let layers = graph.layers()?;

        let priority_of: HashMap<TaskId, u32> =
            tasks.iter().map(|task| (task.id, task.priority)).collect();
        let role_of: HashMap<TaskId, AgentRole> =
            tasks.iter().map(|task| (task.id, task.role)).collect();

        let mut phases = Vec::new();
        for (layer_index, layer) in layers.iter().enumerate() {
            let waves = Self::split_into_waves(layer, &priority_of, &role_of, capacities);
            for (wave_index, wave) in waves.into_iter().enumerate() {
                phases.push(ExecutionPhase {
                    tasks: wave,
                    layer: layer_index,
                    wave: wave_index,
                });
            }
        }

        let critical_path = graph.critical_path();
        let total_work: u64 = tasks.iter().map(|task| task.estimated_duration).sum();
        let parallelism_degree = if critical_path > 0 {
            total_work as f64 / critical_path as f64
        } else {
            1.0
        };

        debug!(
            tasks = tasks.len(),
            phases = phases.len(),
            critical_path,
            parallelism_degree,
            "Built execution plan"
        );

        Ok(ExecutionPlan {
            project_id: tree.project_id,
            tasks,
            phases,
            capacities: capacities.clone(),
            total_estimated_duration: critical_path,
            parallelism_degree,
        })
    }

    /// Splits one layer into capacity-bounded waves.
    ///
    /// Per role the layer's tasks are sorted by priority (descending,
    /// stable) and chunked to the role's capacity; wave `k` of the layer
    /// combines chunk `k` of every role.
    fn split_into_waves(
        layer: &[TaskId],
        priority_of: &HashMap<TaskId, u32>,
        role_of: &HashMap<TaskId, AgentRole>,
        capacities: &CapacityTable,
    ) -> Vec<Vec<TaskId>> {
        // Group by role, preserving first-appearance order of roles.
        let mut role_order: Vec<AgentRole> = Vec::new();
        let mut by_role: HashMap<AgentRole, Vec<TaskId>> = HashMap::new();
        for &task_id in layer {
            let role = role_of[&task_id];
            if !role_order.contains(&role) {
                role_order.push(role);
            }
            by_role.entry(role).or_default().push(task_id);
        }

        let mut wave_count = 0;
        let mut chunked: Vec<(AgentRole, Vec<Vec<TaskId>>)> = Vec::new();
        for role in role_order {
            let mut ids = by_role.remove(&role).unwrap_or_default();
            // Stable sort keeps declaration order among equal priorities.
            ids.sort_by(|lhs, rhs| priority_of[rhs].cmp(&priority_of[lhs]));

            let capacity = capacities.get(role).unwrap_or(1);
            let chunks: Vec<Vec<TaskId>> =
                ids.chunks(capacity).map(<[TaskId]>::to_vec).collect();
            wave_count = wave_count.max(chunks.len());
            chunked.push((role, chunks));
        }

        let mut waves = Vec::with_capacity(wave_count);
        for wave_index in 0..wave_count {
            let mut wave = Vec::new();
            for (_, chunks) in &chunked {
                if let Some(chunk) = chunks.get(wave_index) {
                    wave.extend_from_slice(chunk);
                }
            }
            waves.push(wave);
        }
        waves
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code is allowed to use unwrap")]
mod tests {
    use super::*;
    use crate::decompose::TaskDecomposer;
    use conductor_core::{ProjectId, ProjectSpec, ProjectType, TaskKind, TaskNode};

    fn feature_capacities(feature_slots: usize) -> CapacityTable {
        CapacityTable::new()
            .with_capacity(AgentRole::Setup, 1)
            .with_capacity(AgentRole::FeatureBuild, feature_slots)
            .with_capacity(AgentRole::Verification, 2)
            .with_capacity(AgentRole::Deployment, 1)
    }

    /// Four sequential setup tasks, six independent features on a role
    /// with capacity three, four sequential integration tasks, four
    /// sequential deployment tasks: 4 + 2 + 4 + 4 phases, with the
    /// feature layer split into exactly two waves of three.
    #[test]
    fn sequential_chains_and_feature_waves() {
        let spec = ProjectSpec::new("Acme", ProjectType::SaasApp)
            .with_requirements("SaaS app")
            .with_patterns(
                ["auth", "dashboard", "billing", "team roles", "analytics", "settings"]
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            );
        let tree = TaskDecomposer::new().decompose(&spec).unwrap();
        let plan = ExecutionPlanner::plan(&tree, &feature_capacities(3)).unwrap();

        assert_eq!(plan.phases.len(), 14);

        let feature_phases: Vec<_> = plan
            .phases
            .iter()
            .filter(|phase| {
                phase.tasks.iter().all(|id| {
                    plan.task(*id).map(|task| task.kind) == Some(TaskKind::Feature)
                })
            })
            .filter(|phase| !phase.tasks.is_empty())
            .collect();
        assert_eq!(feature_phases.len(), 2);
        assert_eq!(feature_phases[0].tasks.len(), 3);
        assert_eq!(feature_phases[1].tasks.len(), 3);
        assert_eq!(feature_phases[0].layer, feature_phases[1].layer);
        assert_eq!(feature_phases[0].wave, 0);
        assert_eq!(feature_phases[1].wave, 1);

        // Every other phase is a singleton from a sequential chain.
        let singleton_count = plan
            .phases
            .iter()
            .filter(|phase| phase.tasks.len() == 1)
            .count();
        assert_eq!(singleton_count, 12);
    }

    /// A depends on B and B depends on A: planning fails with a cycle
    /// error listing both tasks, and no plan is produced.
    #[test]
    fn mutual_dependency_fails_with_cycle() {
        let mut task_a = TaskNode::new("A", TaskKind::Feature, AgentRole::FeatureBuild);
        let task_b = TaskNode::new("B", TaskKind::Feature, AgentRole::FeatureBuild)
            .with_dependencies(vec![task_a.id]);
        task_a.dependencies = vec![task_b.id];
        let ids = [task_a.id, task_b.id];

        let tree = TaskTree::new(ProjectId::new(), vec![task_a, task_b]);
        let error = ExecutionPlanner::plan(&tree, &feature_capacities(3)).unwrap_err();

        match error {
            OrchestratorError::Cycle { cycle } => {
                assert_eq!(cycle.len(), 2);
                assert!(ids.iter().all(|id| cycle.contains(id)));
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    /// A single task with zero dependencies and zero dependents is its
    /// own phase; critical path equals its estimated duration.
    #[test]
    fn single_task_plan() {
        let task = TaskNode::new("solo", TaskKind::Feature, AgentRole::FeatureBuild)
            .with_duration(30);
        let task_id = task.id;
        let tree = TaskTree::new(ProjectId::new(), vec![task]);

        let plan = ExecutionPlanner::plan(&tree, &feature_capacities(3)).unwrap();
        assert_eq!(plan.phases.len(), 1);
        assert_eq!(plan.phases[0].tasks, vec![task_id]);
        assert_eq!(plan.total_estimated_duration, 30);
        assert!((plan.parallelism_degree - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_role_capacity_is_rejected() {
        let task = TaskNode::new("solo", TaskKind::Feature, AgentRole::FeatureBuild);
        let tree = TaskTree::new(ProjectId::new(), vec![task]);
        let capacities = CapacityTable::new().with_capacity(AgentRole::Setup, 1);

        assert!(matches!(
            ExecutionPlanner::plan(&tree, &capacities),
            Err(OrchestratorError::Capacity(AgentRole::FeatureBuild))
        ));
    }

    /// Capacity one fully serializes a role: every same-role task lands
    /// in its own wave.
    #[test]
    fn capacity_one_serializes_a_role() {
        let tasks: Vec<TaskNode> = (0..3)
            .map(|index| {
                TaskNode::new(
                    format!("feature {index}"),
                    TaskKind::Feature,
                    AgentRole::FeatureBuild,
                )
            })
            .collect();
        let tree = TaskTree::new(ProjectId::new(), tasks);

        let plan = ExecutionPlanner::plan(&tree, &feature_capacities(1)).unwrap();
        assert_eq!(plan.phases.len(), 3);
        assert!(plan.phases.iter().all(|phase| phase.tasks.len() == 1));
    }

    /// Higher-priority tasks land in earlier waves; equal priorities keep
    /// declaration order.
    #[test]
    fn waves_order_by_priority_then_declaration() {
        let low = TaskNode::new("low", TaskKind::Feature, AgentRole::FeatureBuild)
            .with_priority(0);
        let high = TaskNode::new("high", TaskKind::Feature, AgentRole::FeatureBuild)
            .with_priority(5);
        let mid_first = TaskNode::new("mid 1", TaskKind::Feature, AgentRole::FeatureBuild)
            .with_priority(2);
        let mid_second = TaskNode::new("mid 2", TaskKind::Feature, AgentRole::FeatureBuild)
            .with_priority(2);
        let expected = [high.id, mid_first.id, mid_second.id, low.id];

        let tree = TaskTree::new(
            ProjectId::new(),
            vec![low, high, mid_first, mid_second],
        );
        let plan = ExecutionPlanner::plan(&tree, &feature_capacities(2)).unwrap();

        assert_eq!(plan.phases.len(), 2);
        assert_eq!(plan.phases[0].tasks, expected[..2].to_vec());
        assert_eq!(plan.phases[1].tasks, expected[2..].to_vec());
    }

    /// Parallelism degree is at least one and never exceeds the largest
    /// configured capacity for plans shaped by the decomposer.
    #[test]
    fn parallelism_degree_bounds() {
        let spec = ProjectSpec::new("Acme", ProjectType::LandingPage)
            .with_requirements("Marketing landing page")
            .with_patterns(
                ["hero", "pricing", "faq"]
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            );
        let tree = TaskDecomposer::new().decompose(&spec).unwrap();
        let capacities = feature_capacities(3);
        let plan = ExecutionPlanner::plan(&tree, &capacities).unwrap();

        assert!(plan.parallelism_degree >= 1.0);
        assert!(plan.parallelism_degree <= capacities.max_capacity() as f64);
    }
}
