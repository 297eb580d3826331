// src/dag/plan.rs

//! Execution planning: a stable topological order over registered tasks.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::errors::{Result, TaskGraphError};
use crate::task::{TaskId, TaskLabel, TaskRef};
use crate::types::PrerequisitePolicy;

/// Tasks in the order they must execute, plus each task's direct
/// prerequisites as indices into that order.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    order: Vec<TaskRef>,
    deps: Vec<Vec<usize>>,
}

impl ExecutionPlan {
    /// Compute the plan for `registered`.
    ///
    /// Depth-first visit with visiting/visited markers. Roots are taken in
    /// registration order and prerequisites in the order they were listed,
    /// so tasks without an ordering constraint keep their registration order.
    /// Tasks registered more than once appear once.
    ///
    /// Fails without side effects on a cycle, a dropped prerequisite, or (with
    /// [`PrerequisitePolicy::Strict`]) a prerequisite that was not registered.
    pub fn build(registered: &[TaskRef], policy: PrerequisitePolicy) -> Result<Self> {
        let registered_ids: HashSet<TaskId> = registered.iter().map(TaskRef::id).collect();

        let mut marks: HashMap<TaskId, Mark> = HashMap::new();
        let mut index: HashMap<TaskId, usize> = HashMap::new();
        let mut order: Vec<TaskRef> = Vec::new();
        let mut deps: Vec<Vec<usize>> = Vec::new();

        for root in registered {
            if marks.contains_key(&root.id()) {
                continue;
            }

            marks.insert(root.id(), Mark::Visiting);
            let mut stack = vec![Frame::new(root.clone())?];

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };

                let Some(next) = frame.next_prerequisite() else {
                    // All prerequisites placed; this task goes next.
                    let Some(frame) = stack.pop() else {
                        break;
                    };
                    let id = frame.task.id();
                    marks.insert(id, Mark::Visited);

                    let mut task_deps: Vec<usize> = Vec::new();
                    for prerequisite in &frame.prerequisites {
                        if let Some(&i) = index.get(&prerequisite.id()) {
                            if !task_deps.contains(&i) {
                                task_deps.push(i);
                            }
                        }
                    }

                    index.insert(id, order.len());
                    order.push(frame.task);
                    deps.push(task_deps);
                    continue;
                };

                let dependent = frame.task.label();

                if !registered_ids.contains(&next.id()) && policy == PrerequisitePolicy::Strict {
                    return Err(TaskGraphError::UnregisteredPrerequisite {
                        task: dependent,
                        prerequisite: next.label(),
                    });
                }

                match marks.get(&next.id()) {
                    Some(Mark::Visited) => {}
                    Some(Mark::Visiting) => {
                        return Err(TaskGraphError::CyclicDependency {
                            cycle: cycle_from_stack(&stack, &next),
                        });
                    }
                    None => {
                        if !registered_ids.contains(&next.id()) {
                            debug!(
                                task = %next.label(),
                                dependent = %dependent,
                                "discovered unregistered prerequisite"
                            );
                        }
                        marks.insert(next.id(), Mark::Visiting);
                        stack.push(Frame::new(next)?);
                    }
                }
            }
        }

        debug!(tasks = order.len(), "execution plan built");
        Ok(Self { order, deps })
    }

    /// Tasks in execution order.
    pub fn order(&self) -> &[TaskRef] {
        &self.order
    }

    /// Direct prerequisites of the task at `index`, as plan indices.
    pub fn deps_of(&self, index: usize) -> &[usize] {
        self.deps.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn labels(&self) -> Vec<TaskLabel> {
        self.order.iter().map(TaskRef::label).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// One level of the depth-first walk.
struct Frame {
    task: TaskRef,
    prerequisites: Vec<TaskRef>,
    next: usize,
}

impl Frame {
    fn new(task: TaskRef) -> Result<Self> {
        let prerequisites = task.prerequisites()?;
        Ok(Self {
            task,
            prerequisites,
            next: 0,
        })
    }

    fn next_prerequisite(&mut self) -> Option<TaskRef> {
        let next = self.prerequisites.get(self.next).cloned();
        if next.is_some() {
            self.next += 1;
        }
        next
    }
}

/// The frames from `closing`'s first appearance to the top of the stack form
/// the cycle; `closing` is repeated at the end.
fn cycle_from_stack(stack: &[Frame], closing: &TaskRef) -> Vec<TaskLabel> {
    let start = stack
        .iter()
        .position(|frame| frame.task == *closing)
        .unwrap_or(0);

    stack[start..]
        .iter()
        .map(|frame| frame.task.label())
        .chain(std::iter::once(closing.label()))
        .collect()
}
