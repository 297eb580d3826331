// src/manager/mod.rs

//! Task registry and executor.
//!
//! [`TaskManager`] holds registered tasks in insertion order and runs them
//! so that every task's prerequisites complete strictly before it starts:
//!
//! - [`TaskManager::run`] executes the plan serially on the calling thread.
//! - [`TaskManager::run_concurrent`] (in [`concurrent`]) runs independent
//!   tasks in parallel on Tokio's blocking pool.
//!
//! Both compute the full [`ExecutionPlan`] first, so a cycle or an
//! unregistered prerequisite aborts the run before any task executes.

pub mod concurrent;
pub mod report;

use tracing::{error, info};

use crate::config::ManagerConfig;
use crate::dag::{ExecutionPlan, TaskGraph};
use crate::errors::{Result, TaskGraphError};
use crate::task::TaskRef;
use crate::types::RepeatRunPolicy;

pub use report::RunReport;

/// Lifecycle of a manager: `Empty → Populated → Executed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerState {
    #[default]
    Empty,
    Populated,
    /// A run got past planning. What another `run()` does depends on
    /// [`RepeatRunPolicy`].
    Executed,
}

#[derive(Debug, Default)]
pub struct TaskManager {
    tasks: Vec<TaskRef>,
    config: ManagerConfig,
    state: ManagerState,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            tasks: Vec::new(),
            config,
            state: ManagerState::Empty,
        }
    }

    /// Register one task. Chainable; duplicates are kept but run once.
    pub fn add(&mut self, task: impl Into<TaskRef>) -> &mut Self {
        self.tasks.push(task.into());
        if self.state == ManagerState::Empty {
            self.state = ManagerState::Populated;
        }
        self
    }

    /// Register several tasks, preserving their order.
    pub fn add_all<I, P>(&mut self, tasks: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TaskRef>,
    {
        for task in tasks {
            self.add(task);
        }
        self
    }

    pub fn tasks(&self) -> &[TaskRef] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The order `run()` would execute tasks in, without running anything.
    pub fn plan(&self) -> Result<ExecutionPlan> {
        ExecutionPlan::build(&self.tasks, self.config.prerequisites)
    }

    /// Snapshot of the registered graph, including unregistered
    /// prerequisites and cycles.
    pub fn graph(&self) -> Result<TaskGraph> {
        TaskGraph::from_tasks(&self.tasks)
    }

    /// Execute every registered task exactly once, prerequisites first.
    ///
    /// Stops at the first failing task. Tasks completed before the failure
    /// stay completed.
    pub fn run(&mut self) -> Result<RunReport> {
        let Some(plan) = self.prepare_run()? else {
            return Ok(RunReport::default());
        };

        info!(tasks = plan.len(), "running tasks serially");
        let mut report = RunReport::default();

        for task in plan.order() {
            let label = task.label();
            info!(task = %label, "running task");

            if let Err(err) = task.execute() {
                error!(task = %label, error = %err, "task failed; stopping run");
                return Err(err);
            }
            report.push(label);
        }

        info!(executed = report.len(), "run finished");
        Ok(report)
    }

    /// Apply the repeat-run policy and compute the plan.
    ///
    /// `Ok(None)` means there is nothing to do.
    fn prepare_run(&mut self) -> Result<Option<ExecutionPlan>> {
        let repeat = self.state == ManagerState::Executed;

        if repeat {
            match self.config.repeat_run {
                RepeatRunPolicy::Error => return Err(TaskGraphError::AlreadyExecuted),
                RepeatRunPolicy::Skip => {
                    info!("tasks already executed; skipping run");
                    return Ok(None);
                }
                RepeatRunPolicy::Rerun => {
                    info!("tasks already executed; running them again");
                }
            }
        }

        let plan = self.plan()?;

        if repeat {
            for task in plan.order() {
                task.reset();
            }
        }

        self.state = ManagerState::Executed;
        Ok(Some(plan))
    }
}
