// src/task/label.rs

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique task identifier, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity plus optional name, used in logs and errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskLabel {
    pub id: TaskId,
    pub name: Option<String>,
}

impl TaskLabel {
    /// The task name, or `None` for anonymous tasks.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "'{name}'"),
            None => write!(f, "task{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = TaskId::next();
        let b = TaskId::next();
        assert!(b > a);
    }

    #[test]
    fn label_display_prefers_name() {
        let id = TaskId::next();
        let named = TaskLabel {
            id,
            name: Some("build".to_string()),
        };
        let anonymous = TaskLabel { id, name: None };

        assert_eq!(named.to_string(), "'build'");
        assert_eq!(anonymous.to_string(), format!("task#{}", id.as_u64()));
    }
}
