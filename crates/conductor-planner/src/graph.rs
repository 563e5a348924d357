//! Immutable dependency graph with layering and cycle reporting.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use conductor_core::{OrchestratorError, Result, TaskId, TaskNode};

/// Flattened task dependency graph: nodes are tasks, edges run from
/// dependency to dependent.
#[derive(Debug, Clone)]
pub struct DepGraph {
    graph: DiGraph<TaskNode, ()>,
    index: HashMap<TaskId, NodeIndex>,
}

impl DepGraph {
    /// Builds the graph from flattened tasks.
    ///
    /// # Errors
    /// Returns a validation error on duplicate identifiers or dependency
    /// references to tasks outside the plan.
    pub fn from_tasks(tasks: &[TaskNode]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for task in tasks {
            let node = graph.add_node(task.clone());
            if index.insert(task.id, node).is_some() {
                return Err(OrchestratorError::Validation(format!(
                    "Duplicate task identifier: {}",
                    task.id
                )));
            }
        }

        for task in tasks {
            let task_node = index[&task.id];
            for dep_id in &task.dependencies {
                let dep_node = index.get(dep_id).ok_or_else(|| {
                    OrchestratorError::Validation(format!(
                        "Task '{}' depends on unknown task {dep_id}",
                        task.title
                    ))
                })?;
                graph.add_edge(*dep_node, task_node, ());
            }
        }

        Ok(Self { graph, index })
    }

    /// Computes the topological layering: `layer(t) = 1 + max(layer(d))`
    /// over dependencies, with layer 0 for tasks without dependencies.
    ///
    /// Within a layer, tasks keep their declaration order.
    ///
    /// # Errors
    /// Returns a cycle error carrying the ordered cycle if any node cannot
    /// be assigned a finite layer.
    pub fn layers(&self) -> Result<Vec<Vec<TaskId>>> {
        let node_count = self.graph.node_count();
        let mut layer_of: HashMap<NodeIndex, usize> = HashMap::new();

        // Fixed-point assignment; after |V| passes every acyclic node has
        // a finite layer.
        for _ in 0..node_count {
            let mut progressed = false;
            for node in self.graph.node_indices() {
                if layer_of.contains_key(&node) {
                    continue;
                }
                let mut max_dep_layer: Option<usize> = None;
                let mut deps_ready = true;
                for dep in self.graph.neighbors_directed(node, Direction::Incoming) {
                    match layer_of.get(&dep) {
                        Some(layer) => {
                            max_dep_layer = Some(max_dep_layer.map_or(*layer, |m| m.max(*layer)));
                        }
                        None => {
                            deps_ready = false;
                            break;
                        }
                    }
                }
                if deps_ready {
                    layer_of.insert(node, max_dep_layer.map_or(0, |layer| layer + 1));
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        if layer_of.len() < node_count {
            let unassigned: HashSet<NodeIndex> = self
                .graph
                .node_indices()
                .filter(|node| !layer_of.contains_key(node))
                .collect();
            return Err(OrchestratorError::Cycle {
                cycle: self.find_cycle(&unassigned),
            });
        }

        let layer_count = layer_of.values().copied().max().map_or(0, |max| max + 1);
        let mut layers: Vec<Vec<TaskId>> = vec![Vec::new(); layer_count];
        for node in self.graph.node_indices() {
            layers[layer_of[&node]].push(self.graph[node].id);
        }
        Ok(layers)
    }

    /// Longest duration-weighted dependency chain from any source to any
    /// sink; the minimum possible total run duration.
    ///
    /// Returns 0 for an empty or cyclic graph; callers compute layers
    /// first, which reports cycles properly.
    pub fn critical_path(&self) -> u64 {
        let Ok(order) = toposort(&self.graph, None) else {
            return 0;
        };

        let mut longest: HashMap<NodeIndex, u64> = HashMap::new();
        let mut best = 0;
        for node in order {
            let upstream = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|dep| longest.get(&dep).copied())
                .max()
                .unwrap_or(0);
            let total = upstream + self.graph[node].estimated_duration;
            best = best.max(total);
            longest.insert(node, total);
        }
        best
    }

    /// Every task reachable from `id` via the dependency -> dependent
    /// relation, excluding `id` itself.
    pub fn transitive_dependents(&self, id: TaskId) -> HashSet<TaskId> {
        let mut dependents = HashSet::new();
        let Some(&start) = self.index.get(&id) else {
            return dependents;
        };

        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            for dependent in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if dependents.insert(self.graph[dependent].id) {
                    queue.push_back(dependent);
                }
            }
        }
        dependents
    }

    /// Total task count.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Reports a cycle among the unlayered nodes by following dependency
    /// back-pointers until a node repeats; the result is in dependency
    /// order.
    fn find_cycle(&self, unassigned: &HashSet<NodeIndex>) -> Vec<TaskId> {
        let Some(start) = self
            .graph
            .node_indices()
            .find(|node| unassigned.contains(node))
        else {
            return Vec::new();
        };

        let mut path: Vec<NodeIndex> = Vec::new();
        let mut position: HashMap<NodeIndex, usize> = HashMap::new();
        let mut current = start;

        loop {
            if let Some(&pos) = position.get(&current) {
                let mut cycle: Vec<TaskId> =
                    path[pos..].iter().map(|node| self.graph[*node].id).collect();
                // The walk ran dependent -> dependency; report in
                // dependency order.
                cycle.reverse();
                return cycle;
            }
            position.insert(current, path.len());
            path.push(current);

            let next = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .find(|node| unassigned.contains(node));
            match next {
                Some(node) => current = node,
                // A stuck node always has an unlayered dependency; bail
                // with the path walked so far if the graph disagrees.
                None => return path.iter().map(|node| self.graph[*node].id).collect(),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code is allowed to use unwrap")]
mod tests {
    use super::*;
    use conductor_core::{AgentRole, TaskKind};

    fn task(title: &str, deps: Vec<TaskId>) -> TaskNode {
        TaskNode::new(title, TaskKind::Feature, AgentRole::FeatureBuild)
            .with_dependencies(deps)
            .with_duration(10)
    }

    #[test]
    fn layering_follows_dependencies() {
        let root = task("root", vec![]);
        let mid_a = task("mid a", vec![root.id]);
        let mid_b = task("mid b", vec![root.id]);
        let leaf = task("leaf", vec![mid_a.id, mid_b.id]);

        let graph =
            DepGraph::from_tasks(&[root.clone(), mid_a.clone(), mid_b.clone(), leaf.clone()])
                .unwrap();
        let layers = graph.layers().unwrap();

        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0], vec![root.id]);
        assert_eq!(layers[1], vec![mid_a.id, mid_b.id]);
        assert_eq!(layers[2], vec![leaf.id]);
    }

    #[test]
    fn two_task_cycle_is_reported_in_order() {
        let mut task_a = task("a", vec![]);
        let task_b = task("b", vec![task_a.id]);
        task_a.dependencies = vec![task_b.id];

        let graph = DepGraph::from_tasks(&[task_a.clone(), task_b.clone()]).unwrap();
        let error = graph.layers().unwrap_err();

        match error {
            OrchestratorError::Cycle { cycle } => {
                assert_eq!(cycle.len(), 2);
                assert!(cycle.contains(&task_a.id));
                assert!(cycle.contains(&task_b.id));
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn unknown_dependency_is_a_validation_error() {
        let orphan = task("orphan", vec![TaskId::new()]);
        assert!(matches!(
            DepGraph::from_tasks(&[orphan]),
            Err(OrchestratorError::Validation(_))
        ));
    }

    #[test]
    fn critical_path_takes_the_longest_chain() {
        let root = task("root", vec![]);
        let short = task("short", vec![root.id]);
        let long_a = task("long a", vec![root.id]).with_duration(25);
        let long_b = task("long b", vec![long_a.id]).with_duration(25);
        let sink = task("sink", vec![short.id, long_b.id]);

        let graph = DepGraph::from_tasks(&[root, short, long_a, long_b, sink]).unwrap();
        // 10 + 25 + 25 + 10
        assert_eq!(graph.critical_path(), 70);
    }

    #[test]
    fn transitive_dependents_cross_layers() {
        let root = task("root", vec![]);
        let mid = task("mid", vec![root.id]);
        let leaf = task("leaf", vec![mid.id]);
        let unrelated = task("unrelated", vec![]);

        let graph =
            DepGraph::from_tasks(&[root.clone(), mid.clone(), leaf.clone(), unrelated.clone()])
                .unwrap();
        let dependents = graph.transitive_dependents(root.id);

        assert_eq!(dependents.len(), 2);
        assert!(dependents.contains(&mid.id));
        assert!(dependents.contains(&leaf.id));
        assert!(!dependents.contains(&unrelated.id));
    }
}
