//! Project-type phase templates and the task duration table.

use conductor_core::{AgentRole, ProjectType, TaskKind};

/// One fixed task slot in a sequential phase template.
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    /// Title for the generated task.
    pub title: &'static str,
    /// Task type tag.
    pub kind: TaskKind,
    /// Assigned role.
    pub role: AgentRole,
}

/// How a phase template expands into tasks.
#[derive(Debug, Clone, Copy)]
pub enum PhaseExpansion {
    /// A fixed, strictly sequential chain: each task depends on the
    /// previous one in the template.
    Sequential(&'static [TaskTemplate]),
    /// One task per requested feature, all depending on the final setup
    /// task, with no dependency edges among themselves.
    PerFeature,
}

/// An ordered phase owned by a project type.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTemplate {
    /// Phase name, for task grouping and logs.
    pub name: &'static str,
    /// Expansion rule.
    pub expansion: PhaseExpansion,
}

const SETUP_PHASE: &[TaskTemplate] = &[
    TaskTemplate {
        title: "Initialize repository",
        kind: TaskKind::RepoInit,
        role: AgentRole::Setup,
    },
    TaskTemplate {
        title: "Scaffold project from template",
        kind: TaskKind::Scaffold,
        role: AgentRole::Setup,
    },
    TaskTemplate {
        title: "Configure environment",
        kind: TaskKind::EnvConfig,
        role: AgentRole::Setup,
    },
    TaskTemplate {
        title: "Install dependencies",
        kind: TaskKind::DependencyInstall,
        role: AgentRole::Setup,
    },
];

const INTEGRATION_PHASE: &[TaskTemplate] = &[
    TaskTemplate {
        title: "Integrate features",
        kind: TaskKind::Integration,
        role: AgentRole::Verification,
    },
    TaskTemplate {
        title: "Run quality gate",
        kind: TaskKind::QualityCheck,
        role: AgentRole::Verification,
    },
    TaskTemplate {
        title: "Review integrated result",
        kind: TaskKind::Review,
        role: AgentRole::Verification,
    },
    TaskTemplate {
        title: "Smoke test project",
        kind: TaskKind::SmokeTest,
        role: AgentRole::Verification,
    },
];

const DEPLOYMENT_PHASE: &[TaskTemplate] = &[
    TaskTemplate {
        title: "Provision infrastructure",
        kind: TaskKind::Provision,
        role: AgentRole::Deployment,
    },
    TaskTemplate {
        title: "Set up delivery pipeline",
        kind: TaskKind::PipelineSetup,
        role: AgentRole::Deployment,
    },
    TaskTemplate {
        title: "Cut release",
        kind: TaskKind::Release,
        role: AgentRole::Deployment,
    },
    TaskTemplate {
        title: "Verify deployment",
        kind: TaskKind::PostDeployCheck,
        role: AgentRole::Deployment,
    },
];

/// Phase order shared by both project types; the templates differ in the
/// feature patterns they accept, not in phase structure.
const PHASES: &[PhaseTemplate] = &[
    PhaseTemplate {
        name: "setup",
        expansion: PhaseExpansion::Sequential(SETUP_PHASE),
    },
    PhaseTemplate {
        name: "feature_development",
        expansion: PhaseExpansion::PerFeature,
    },
    PhaseTemplate {
        name: "integration_verification",
        expansion: PhaseExpansion::Sequential(INTEGRATION_PHASE),
    },
    PhaseTemplate {
        name: "deployment",
        expansion: PhaseExpansion::Sequential(DEPLOYMENT_PHASE),
    },
];

/// Lookup from project-type tag to its ordered phase templates and the
/// per-task-kind duration table.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Ordered phase templates for a project type.
    pub fn phases_for(self, _project_type: ProjectType) -> &'static [PhaseTemplate] {
        PHASES
    }

    /// Estimated duration for a task kind, in abstract time units.
    ///
    /// Durations come from this lookup table, never computed dynamically.
    pub fn estimated_duration(self, kind: TaskKind) -> u64 {
        match kind {
            TaskKind::RepoInit | TaskKind::EnvConfig | TaskKind::Release => 5,
            TaskKind::Scaffold
            | TaskKind::DependencyInstall
            | TaskKind::Review
            | TaskKind::SmokeTest
            | TaskKind::PipelineSetup
            | TaskKind::PostDeployCheck => 10,
            TaskKind::QualityCheck | TaskKind::Provision => 15,
            TaskKind::Integration => 20,
            TaskKind::Feature => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_phases_have_four_tasks() {
        let registry = TemplateRegistry;
        for project_type in [ProjectType::LandingPage, ProjectType::SaasApp] {
            let sequential: Vec<_> = registry
                .phases_for(project_type)
                .iter()
                .filter_map(|phase| match phase.expansion {
                    PhaseExpansion::Sequential(tasks) => Some(tasks),
                    PhaseExpansion::PerFeature => None,
                })
                .collect();
            assert_eq!(sequential.len(), 3);
            for tasks in sequential {
                assert_eq!(tasks.len(), 4);
            }
        }
    }

    #[test]
    fn feature_work_dominates_the_duration_table() {
        let registry = TemplateRegistry;
        let feature = registry.estimated_duration(TaskKind::Feature);
        for template in SETUP_PHASE {
            assert!(registry.estimated_duration(template.kind) < feature);
        }
    }
}
