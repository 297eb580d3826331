// src/exec/command.rs

use std::collections::BTreeMap;
use std::process::{Command, ExitStatus};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::manager::TaskManager;
use crate::task::{Task, TaskBuilder, Work};

/// Runs `cmd` through the platform shell, inheriting stdio.
///
/// A non-zero exit status is an error, so the owning task stays incomplete.
#[derive(Debug, Clone)]
pub struct CommandWork {
    name: String,
    cmd: String,
}

impl CommandWork {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
        }
    }
}

impl Work for CommandWork {
    type Output = ExitStatus;

    fn call(&mut self) -> Result<ExitStatus> {
        info!(task = %self.name, cmd = %self.cmd, "starting task process");

        let status = shell_command(&self.cmd)
            .status()
            .with_context(|| format!("spawning process for task '{}'", self.name))?;

        debug!(task = %self.name, %status, "task process exited");

        if !status.success() {
            bail!("command `{}` exited with {}", self.cmd, status);
        }
        Ok(status)
    }
}

// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// All tasks declared in a config file, keyed by name.
///
/// Prerequisite edges are weak, so this value must outlive any run of a
/// manager built from it.
#[derive(Debug)]
pub struct CommandTasks {
    tasks: BTreeMap<String, Task<ExitStatus>>,
}

impl CommandTasks {
    /// Create one task per `[task.<name>]` and wire `after` edges by name.
    ///
    /// Edges are added after every task exists, so a cyclic `after` graph
    /// is built as-is and reported by the manager.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let tasks: BTreeMap<String, Task<ExitStatus>> = cfg
            .task
            .iter()
            .map(|(name, tc)| {
                let task = TaskBuilder::new()
                    .name(name.clone())
                    .build_work(CommandWork::new(name.clone(), tc.cmd.clone()));
                (name.clone(), task)
            })
            .collect();

        for (name, tc) in cfg.task.iter() {
            let Some(task) = tasks.get(name) else {
                continue;
            };
            for dep in &tc.after {
                if let Some(prerequisite) = tasks.get(dep) {
                    task.add_prerequisite(prerequisite);
                }
            }
        }

        Self { tasks }
    }

    pub fn get(&self, name: &str) -> Option<&Task<ExitStatus>> {
        self.tasks.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Task<ExitStatus>)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }

    /// A manager configured from `[manager]` with every task that has
    /// `register = true` added, in name order.
    pub fn manager(&self, cfg: &ConfigFile) -> TaskManager {
        let mut manager = TaskManager::with_config(cfg.manager);
        for name in cfg.registered_tasks() {
            if let Some(task) = self.tasks.get(name) {
                manager.add(task);
            }
        }
        manager
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::parse_and_validate;
    use crate::errors::TaskGraphError;

    #[test]
    fn command_tasks_run_in_dependency_order() {
        let cfg = parse_and_validate(
            r#"
[task.zz_first]
cmd = "true"

[task.aa_second]
cmd = "true"
after = ["zz_first"]
"#,
        )
        .unwrap();

        let tasks = CommandTasks::from_config(&cfg);
        let mut manager = tasks.manager(&cfg);
        let report = manager.run().unwrap();

        assert_eq!(report.names(), ["zz_first", "aa_second"]);
        assert!(tasks.iter().all(|(_, task)| task.is_complete()));
    }

    #[test]
    fn failing_command_fails_the_task() {
        let mut work = CommandWork::new("bad", "exit 3");
        let err = work.call().unwrap_err();
        assert!(err.to_string().contains("exited with"));

        let task = TaskBuilder::new()
            .name("bad")
            .build_work(CommandWork::new("bad", "exit 3"));
        assert!(matches!(
            task.invoke(),
            Err(TaskGraphError::TaskFailed { .. })
        ));
    }
}
