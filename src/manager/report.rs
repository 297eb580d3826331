// src/manager/report.rs

use crate::task::{TaskId, TaskLabel};

/// Tasks executed by one run, in the order they completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    executed: Vec<TaskLabel>,
}

impl RunReport {
    pub(crate) fn push(&mut self, label: TaskLabel) {
        self.executed.push(label);
    }

    pub fn executed(&self) -> &[TaskLabel] {
        &self.executed
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.executed.iter().map(|label| label.id).collect()
    }

    /// Names of executed tasks; anonymous tasks are rendered as their label.
    pub fn names(&self) -> Vec<String> {
        self.executed
            .iter()
            .map(|label| match label.name() {
                Some(name) => name.to_string(),
                None => label.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.executed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }
}
