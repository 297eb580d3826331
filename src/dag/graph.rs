// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::errors::Result;
use crate::task::{TaskId, TaskLabel, TaskRef};

/// Snapshot of a task graph for diagnostics.
///
/// Edge direction: prerequisite -> dependent. For
/// `b = TaskBuilder::new().after(&a)` we add edge `a -> b`.
///
/// Unlike [`ExecutionPlan`](super::ExecutionPlan) this accepts cyclic graphs
/// and unregistered prerequisites, so it can describe a graph that `run()`
/// would reject.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    graph: DiGraph<TaskLabel, ()>,
}

impl TaskGraph {
    /// Build from registered tasks, following prerequisite edges transitively.
    pub fn from_tasks(tasks: &[TaskRef]) -> Result<Self> {
        let mut graph: DiGraph<TaskLabel, ()> = DiGraph::new();
        let mut nodes: HashMap<TaskId, NodeIndex> = HashMap::new();
        let mut stack: Vec<TaskRef> = tasks.iter().rev().cloned().collect();
        let mut edges: Vec<(TaskId, TaskId)> = Vec::new();

        while let Some(task) = stack.pop() {
            if nodes.contains_key(&task.id()) {
                continue;
            }
            nodes.insert(task.id(), graph.add_node(task.label()));

            for prerequisite in task.prerequisites()? {
                edges.push((prerequisite.id(), task.id()));
                stack.push(prerequisite);
            }
        }

        for (from, to) in edges {
            if let (Some(&from), Some(&to)) = (nodes.get(&from), nodes.get(&to)) {
                graph.update_edge(from, to, ());
            }
        }

        Ok(Self { graph })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Tasks without prerequisites.
    pub fn roots(&self) -> Vec<TaskLabel> {
        self.graph
            .node_indices()
            .filter(|&n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Direct prerequisites of `id` in this snapshot.
    pub fn prerequisites_of(&self, id: TaskId) -> Vec<TaskLabel> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct dependents of `id` in this snapshot.
    pub fn dependents_of(&self, id: TaskId) -> Vec<TaskLabel> {
        self.neighbors(id, Direction::Outgoing)
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Graphviz DOT rendering, one node per task labelled with its name.
    pub fn to_dot(&self) -> String {
        let labelled = self.graph.map(|_, label| label.to_string(), |_, _| "");
        format!("{}", Dot::with_config(&labelled, &[Config::EdgeNoLabel]))
    }

    fn neighbors(&self, id: TaskId, direction: Direction) -> Vec<TaskLabel> {
        let Some(node) = self.graph.node_indices().find(|&n| self.graph[n].id == id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(node, direction)
            .map(|n| self.graph[n].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskBuilder;

    #[test]
    fn follows_prerequisites_transitively() {
        let a = TaskBuilder::new().name("a").build(|| ());
        let b = TaskBuilder::new().name("b").after(&a).build(|| ());
        let c = TaskBuilder::new().name("c").after(&b).after(&a).build(|| ());

        let graph = TaskGraph::from_tasks(&[c.handle()]).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.roots(), vec![a.label()]);
        assert_eq!(graph.prerequisites_of(b.id()), vec![a.label()]);
        assert!(!graph.is_cyclic());
    }

    #[test]
    fn cycles_are_representable() {
        let a = TaskBuilder::new().name("a").build(|| ());
        let b = TaskBuilder::new().name("b").after(&a).build(|| ());
        a.add_prerequisite(&b);

        let graph = TaskGraph::from_tasks(&[a.handle(), b.handle()]).unwrap();
        assert!(graph.is_cyclic());
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn dot_output_contains_edges() {
        let a = TaskBuilder::new().name("fetch").build(|| ());
        let b = TaskBuilder::new().name("build").after(&a).build(|| ());

        let dot = TaskGraph::from_tasks(&[a.handle(), b.handle()])
            .unwrap()
            .to_dot();

        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("fetch"));
        assert!(dot.contains("build"));
        assert!(dot.contains("->"));
    }
}
