//! Hierarchical task tree produced by decomposition.

use serde::{Deserialize, Serialize};

use super::core::{TaskId, TaskNode};
use crate::spec::ProjectId;

/// Hierarchical task tree with explicit dependency edges.
///
/// The hierarchy is for display and grouping; `flatten` produces the view
/// the planner schedules from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTree {
    /// Project this tree was decomposed from.
    pub project_id: ProjectId,
    /// Root tasks in declaration order.
    pub roots: Vec<TaskNode>,
}

impl TaskTree {
    /// Creates a tree from root tasks.
    pub fn new(project_id: ProjectId, roots: Vec<TaskNode>) -> Self {
        Self { project_id, roots }
    }

    /// Flattens the tree into scheduling order, depth first, preserving
    /// declaration order among siblings.
    pub fn flatten(&self) -> Vec<TaskNode> {
        let mut tasks = Vec::new();
        for root in &self.roots {
            Self::collect(root, &mut tasks);
        }
        tasks
    }

    /// Looks up a task anywhere in the tree by identifier.
    pub fn get(&self, id: TaskId) -> Option<&TaskNode> {
        fn find(node: &TaskNode, id: TaskId) -> Option<&TaskNode> {
            if node.id == id {
                return Some(node);
            }
            node.children.iter().find_map(|child| find(child, id))
        }
        self.roots.iter().find_map(|root| find(root, id))
    }

    /// Total number of schedulable tasks in the tree.
    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    /// Whether the tree contains no tasks.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn collect(node: &TaskNode, into: &mut Vec<TaskNode>) {
        into.push(node.clone());
        for child in &node.children {
            Self::collect(child, into);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{AgentRole, TaskKind};

    #[test]
    fn flatten_preserves_declaration_order() {
        let child = TaskNode::new("child", TaskKind::Feature, AgentRole::FeatureBuild);
        let child_id = child.id;
        let parent = TaskNode::new("parent", TaskKind::Scaffold, AgentRole::Setup)
            .with_children(vec![child]);
        let parent_id = parent.id;
        let sibling = TaskNode::new("sibling", TaskKind::Release, AgentRole::Deployment);
        let sibling_id = sibling.id;

        let tree = TaskTree::new(ProjectId::new(), vec![parent, sibling]);
        let flat: Vec<TaskId> = tree.flatten().into_iter().map(|task| task.id).collect();
        assert_eq!(flat, vec![parent_id, child_id, sibling_id]);
    }

    #[test]
    fn get_finds_nested_tasks() {
        let child = TaskNode::new("child", TaskKind::Feature, AgentRole::FeatureBuild);
        let child_id = child.id;
        let parent = TaskNode::new("parent", TaskKind::Scaffold, AgentRole::Setup)
            .with_children(vec![child]);

        let tree = TaskTree::new(ProjectId::new(), vec![parent]);
        assert!(tree.get(child_id).is_some());
        assert!(tree.get(TaskId::new()).is_none());
    }
}
