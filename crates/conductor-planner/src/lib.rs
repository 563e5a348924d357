//! Task decomposition and execution planning for conductor.
//!
//! [`TaskDecomposer`] turns a declarative [`conductor_core::ProjectSpec`]
//! into a hierarchical task tree using project-type templates, and
//! [`ExecutionPlanner`] turns that tree into a validated, capacity-aware
//! [`conductor_core::ExecutionPlan`] of ordered phases.

/// Template-driven decomposition of project specs into task trees.
pub mod decompose;
/// Immutable dependency graph with layering and cycle reporting.
pub mod graph;
/// Phase and wave construction with scheduling metrics.
pub mod planner;

pub use decompose::{FeaturePattern, TaskDecomposer, TemplateRegistry, match_pattern};
pub use graph::DepGraph;
pub use planner::ExecutionPlanner;
