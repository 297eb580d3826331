// src/dag/scheduler.rs

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::dag::plan::ExecutionPlan;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::task_info::{RunState, TaskRunState};

/// Outcome of one task invocation, as far as the scheduler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Readiness state machine over an [`ExecutionPlan`].
///
/// It is responsible for:
/// - deciding when a task is "ready" (all prerequisites succeeded)
/// - handing out ready tasks in plan order, at most `max_parallel` at a time
/// - recording completions and scheduling dependents
/// - stopping the run on the first failure: pending tasks are cancelled,
///   running ones are left to finish
///
/// The scheduler does no IO and knows nothing about threads; callers feed it
/// completions and execute whatever it hands back.
#[derive(Debug)]
pub struct Scheduler {
    states: Vec<RunState>,
    deps: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    /// Pending tasks whose prerequisites all succeeded, in plan order.
    ready: BTreeSet<usize>,
    running: usize,
    max_parallel: usize,
    stopped: bool,
}

impl Scheduler {
    /// Build a scheduler for `plan`. A `max_parallel` of zero is treated as 1.
    pub fn from_plan(plan: &ExecutionPlan, max_parallel: usize) -> Self {
        let len = plan.len();
        let deps: Vec<Vec<usize>> = (0..len).map(|i| plan.deps_of(i).to_vec()).collect();

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); len];
        for (task, task_deps) in deps.iter().enumerate() {
            for &dep in task_deps {
                dependents[dep].push(task);
            }
        }

        Self {
            states: vec![RunState::Pending; len],
            deps,
            dependents,
            ready: BTreeSet::new(),
            running: 0,
            max_parallel: max_parallel.max(1),
            stopped: false,
        }
    }

    /// Seed the ready set with tasks that have no prerequisites and dispatch
    /// as many as the parallelism limit allows.
    pub fn start(&mut self) -> SchedulerStep {
        for index in 0..self.states.len() {
            if self.deps_satisfied(index) == Some(true) {
                self.ready.insert(index);
            }
        }

        SchedulerStep {
            newly_scheduled: self.dispatch(),
            newly_cancelled: Vec::new(),
            run_just_finished: self.is_finished(),
        }
    }

    /// Record the outcome of a running task.
    pub fn handle_completion(&mut self, index: usize, outcome: TaskOutcome) -> SchedulerStep {
        let mut newly_cancelled = Vec::new();

        match self.states.get(index).copied() {
            Some(RunState::Running) => {
                self.running -= 1;
                match outcome {
                    TaskOutcome::Success => {
                        self.states[index] = RunState::DoneSuccess;
                        debug!(index, "task completed successfully");
                        for &dependent in &self.dependents[index] {
                            if self.states[dependent] == RunState::Pending
                                && self.deps[dependent]
                                    .iter()
                                    .all(|&d| self.states[d] == RunState::DoneSuccess)
                            {
                                self.ready.insert(dependent);
                            }
                        }
                    }
                    TaskOutcome::Failed => {
                        self.states[index] = RunState::DoneFailed;
                        warn!(index, "task failed; cancelling tasks not yet started");
                        newly_cancelled = self.cancel_pending();
                    }
                }
            }
            Some(state) => {
                warn!(index, ?state, "completion for a task that is not running; ignoring");
            }
            None => {
                warn!(index, "completion for unknown task; ignoring");
            }
        }

        let newly_scheduled = self.dispatch();
        let run_just_finished = self.is_finished();
        if run_just_finished {
            info!(stopped = self.stopped, "scheduler: all tasks terminal");
        }

        SchedulerStep {
            newly_scheduled,
            newly_cancelled,
            run_just_finished,
        }
    }

    /// Stop handing out tasks, cancelling everything not yet started.
    pub fn stop(&mut self) -> Vec<usize> {
        self.cancel_pending()
    }

    /// Whether every task is in a terminal state.
    pub fn is_finished(&self) -> bool {
        self.states.iter().all(|state| state.is_terminal())
    }

    /// Whether a failure stopped the run.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Number of tasks currently marked `Running`.
    pub fn running(&self) -> usize {
        self.running
    }

    pub fn run_state_of(&self, index: usize) -> Option<TaskRunState> {
        self.states.get(index).map(|&state| state.into())
    }

    /// Whether all prerequisites of `index` succeeded. `None` if unknown.
    pub fn deps_satisfied(&self, index: usize) -> Option<bool> {
        let deps = self.deps.get(index)?;
        Some(deps.iter().all(|&d| self.states[d] == RunState::DoneSuccess))
    }

    fn dispatch(&mut self) -> Vec<usize> {
        let mut scheduled = Vec::new();

        while !self.stopped && self.running < self.max_parallel {
            let Some(index) = self.ready.pop_first() else {
                break;
            };
            self.states[index] = RunState::Running;
            self.running += 1;
            debug!(index, "prerequisites satisfied; marking Running");
            scheduled.push(index);
        }

        scheduled
    }

    fn cancel_pending(&mut self) -> Vec<usize> {
        self.stopped = true;
        self.ready.clear();

        let mut cancelled = Vec::new();
        for (index, state) in self.states.iter_mut().enumerate() {
            if *state == RunState::Pending {
                *state = RunState::Cancelled;
                cancelled.push(index);
            }
        }
        cancelled
    }
}
