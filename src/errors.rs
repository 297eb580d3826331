// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::task::TaskLabel;

#[derive(Error, Debug)]
pub enum TaskGraphError {
    /// A task was invoked before one of its prerequisites completed.
    #[error("task {task} invoked before prerequisite {prerequisite} completed")]
    PrerequisiteNotSatisfied {
        task: TaskLabel,
        prerequisite: TaskLabel,
    },

    /// The prerequisite graph is not a DAG. `cycle` starts and ends with the
    /// same task.
    #[error("cyclic dependency: {}", format_cycle(.cycle))]
    CyclicDependency { cycle: Vec<TaskLabel> },

    #[error("task {task} depends on {prerequisite}, which was never added to the manager")]
    UnregisteredPrerequisite {
        task: TaskLabel,
        prerequisite: TaskLabel,
    },

    #[error("task {task} has a prerequisite that no longer exists")]
    DanglingPrerequisite { task: TaskLabel },

    #[error("task {task} failed: {source}")]
    TaskFailed {
        task: TaskLabel,
        #[source]
        source: anyhow::Error,
    },

    #[error("task {task} panicked")]
    TaskPanicked { task: TaskLabel },

    #[error("task manager has already executed its tasks")]
    AlreadyExecuted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskGraphError {
    /// The task the error is about, if there is a single one.
    pub fn task(&self) -> Option<&TaskLabel> {
        match self {
            TaskGraphError::PrerequisiteNotSatisfied { task, .. }
            | TaskGraphError::UnregisteredPrerequisite { task, .. }
            | TaskGraphError::DanglingPrerequisite { task }
            | TaskGraphError::TaskFailed { task, .. }
            | TaskGraphError::TaskPanicked { task } => Some(task),
            _ => None,
        }
    }
}

fn format_cycle(cycle: &[TaskLabel]) -> String {
    cycle
        .iter()
        .map(|label| label.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskGraphError>;
