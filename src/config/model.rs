// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{PrerequisitePolicy, RepeatRunPolicy};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [manager]
/// prerequisites = "strict"
/// repeat_run = "error"
/// max_parallel = 2
///
/// [task.fetch]
/// cmd = "git fetch"
///
/// [task.build]
/// cmd = "make"
/// after = ["fetch"]
/// ```
///
/// All sections are optional at this level; [`ConfigFile`] is the validated
/// form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Manager policies from `[manager]`.
    #[serde(default)]
    pub manager: ManagerConfig,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration. Only constructible through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub manager: ManagerConfig,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(manager: ManagerConfig, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { manager, task }
    }

    /// Names of tasks that should be added to the manager, in key order.
    pub fn registered_tasks(&self) -> impl Iterator<Item = &str> {
        self.task
            .iter()
            .filter(|(_, task)| task.register)
            .map(|(name, _)| name.as_str())
    }
}

/// `[manager]` section; also the runtime configuration of a
/// [`TaskManager`](crate::manager::TaskManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ManagerConfig {
    /// `"strict"` (default) or `"discover"`.
    #[serde(default)]
    pub prerequisites: PrerequisitePolicy,

    /// `"error"` (default), `"rerun"` or `"skip"`.
    #[serde(default)]
    pub repeat_run: RepeatRunPolicy,

    /// Maximum number of tasks running at once. `1` runs serially.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_max_parallel() -> usize {
    1
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            prerequisites: PrerequisitePolicy::default(),
            repeat_run: RepeatRunPolicy::default(),
            max_parallel: default_max_parallel(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Shell command to execute.
    pub cmd: String,

    /// Prerequisites: names of tasks that must complete first.
    #[serde(default)]
    pub after: Vec<String>,

    /// Whether the task is added to the manager. With `false` the task only
    /// runs when it is reachable as a prerequisite and the manager uses the
    /// `discover` policy.
    #[serde(default = "default_register")]
    pub register: bool,
}

fn default_register() -> bool {
    true
}
