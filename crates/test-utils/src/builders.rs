// crates/test-utils/src/builders.rs

//! Build validated configs in tests without writing TOML.

use std::collections::BTreeMap;

use taskgraph::config::{ConfigFile, ManagerConfig, RawConfigFile, TaskConfig};
use taskgraph::errors::Result;
use taskgraph::types::{PrerequisitePolicy, RepeatRunPolicy};

/// Accumulates `[manager]` settings and `[task.<name>]` entries.
///
/// ```
/// use taskgraph_test_utils::builders::ConfigFileBuilder;
///
/// let cfg = ConfigFileBuilder::new()
///     .task("fetch", "git fetch", &[])
///     .task("build", "make", &["fetch"])
///     .build();
/// assert_eq!(cfg.task["build"].after, ["fetch"]);
/// ```
#[derive(Debug, Default)]
pub struct ConfigFileBuilder {
    manager: ManagerConfig,
    tasks: BTreeMap<String, TaskConfig>,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a registered task running `cmd` after every name in `after`.
    pub fn task(self, name: &str, cmd: &str, after: &[&str]) -> Self {
        self.declare(name, cmd, after, true)
    }

    /// Declare a task that is reachable only as someone's prerequisite.
    pub fn unregistered_task(self, name: &str, cmd: &str, after: &[&str]) -> Self {
        self.declare(name, cmd, after, false)
    }

    pub fn prerequisites(mut self, policy: PrerequisitePolicy) -> Self {
        self.manager.prerequisites = policy;
        self
    }

    pub fn repeat_run(mut self, policy: RepeatRunPolicy) -> Self {
        self.manager.repeat_run = policy;
        self
    }

    pub fn max_parallel(mut self, jobs: usize) -> Self {
        self.manager.max_parallel = jobs;
        self
    }

    /// Run the same validation as a config loaded from disk.
    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(RawConfigFile {
            manager: self.manager,
            task: self.tasks,
        })
    }

    /// Like [`try_build`](Self::try_build), panicking on invalid input.
    pub fn build(self) -> ConfigFile {
        match self.try_build() {
            Ok(cfg) => cfg,
            Err(err) => panic!("test config rejected: {err}"),
        }
    }

    fn declare(mut self, name: &str, cmd: &str, after: &[&str], register: bool) -> Self {
        let entry = TaskConfig {
            cmd: cmd.to_owned(),
            after: after.iter().map(|dep| (*dep).to_owned()).collect(),
            register,
        };
        self.tasks.insert(name.to_owned(), entry);
        self
    }
}
