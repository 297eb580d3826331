// src/manager/concurrent.rs

//! Concurrent execution of a plan on Tokio's blocking pool.
//!
//! The pure [`Scheduler`] decides what may run; this module only moves tasks
//! onto worker threads and feeds completions back. Work closures are
//! synchronous, so each invocation goes through `spawn_blocking`.

use std::panic::{self, AssertUnwindSafe};

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dag::{ExecutionPlan, Scheduler, TaskOutcome};
use crate::errors::{Result, TaskGraphError};

use super::{RunReport, TaskManager};

type InFlight = JoinSet<(usize, Result<()>)>;

impl TaskManager {
    /// Execute every registered task exactly once, running up to
    /// `max_parallel` mutually independent tasks at the same time.
    ///
    /// A task never starts before all of its prerequisites completed. After
    /// the first failure no further tasks are started; tasks already running
    /// finish, then the first error is returned. A `max_parallel` of zero is
    /// treated as 1.
    pub async fn run_concurrent(&mut self, max_parallel: usize) -> Result<RunReport> {
        let Some(plan) = self.prepare_run()? else {
            return Ok(RunReport::default());
        };

        info!(tasks = plan.len(), max_parallel, "running tasks concurrently");

        let mut scheduler = Scheduler::from_plan(&plan, max_parallel);
        let mut in_flight = InFlight::new();
        let mut report = RunReport::default();
        let mut first_error: Option<TaskGraphError> = None;

        let step = scheduler.start();
        dispatch(&mut in_flight, &plan, step.newly_scheduled);

        while let Some(joined) = in_flight.join_next().await {
            let (index, result) = match joined {
                Ok(done) => done,
                Err(join_err) => {
                    error!(error = %join_err, "worker task did not complete; stopping run");
                    let cancelled = scheduler.stop();
                    if !cancelled.is_empty() {
                        warn!(cancelled = cancelled.len(), "not starting remaining tasks");
                    }
                    first_error.get_or_insert(TaskGraphError::Other(join_err.into()));
                    continue;
                }
            };

            let label = plan.order()[index].label();
            let outcome = match result {
                Ok(()) => {
                    debug!(task = %label, "task finished");
                    report.push(label);
                    TaskOutcome::Success
                }
                Err(err) => {
                    error!(task = %label, error = %err, "task failed");
                    first_error.get_or_insert(err);
                    TaskOutcome::Failed
                }
            };

            let step = scheduler.handle_completion(index, outcome);
            if !step.newly_cancelled.is_empty() {
                warn!(
                    cancelled = step.newly_cancelled.len(),
                    "not starting remaining tasks"
                );
            }
            dispatch(&mut in_flight, &plan, step.newly_scheduled);
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!(executed = report.len(), "run finished");
                Ok(report)
            }
        }
    }
}

fn dispatch(in_flight: &mut InFlight, plan: &ExecutionPlan, indices: Vec<usize>) {
    for index in indices {
        let task = plan.order()[index].clone();
        info!(task = %task.label(), "running task");

        in_flight.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| task.execute()))
                .unwrap_or_else(|_| Err(TaskGraphError::TaskPanicked { task: task.label() }));
            (index, result)
        });
    }
}
