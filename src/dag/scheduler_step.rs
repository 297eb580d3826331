// src/dag/scheduler_step.rs

//! Step-by-step result type for the scheduler.

/// Structured result of a single scheduler "step".
///
/// Indices refer to positions in the [`ExecutionPlan`](super::ExecutionPlan)
/// the scheduler was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Tasks that became ready and were marked `Running` by this step.
    pub newly_scheduled: Vec<usize>,
    /// Tasks that were still pending and got cancelled by this step.
    pub newly_cancelled: Vec<usize>,
    /// Whether every task is now in a terminal state.
    pub run_just_finished: bool,
}
