// src/dag/task_info.rs

//! Per-run task state used by the scheduler.

/// Per-run state of a planned task (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting on prerequisites.
    Pending,
    /// Dispatched and currently executing.
    Running,
    /// Invocation succeeded; the task's completion flag is set.
    DoneSuccess,
    /// Invocation returned an error or panicked.
    DoneFailed,
    /// Never started because the run stopped after a failure.
    Cancelled,
}

/// Public, read-only view of a task's per-run state.
///
/// This is exposed for tests and diagnostics without leaking the internal
/// `RunState` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
    Cancelled,
}

impl From<RunState> for TaskRunState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Pending => TaskRunState::Pending,
            RunState::Running => TaskRunState::Running,
            RunState::DoneSuccess => TaskRunState::DoneSuccess,
            RunState::DoneFailed => TaskRunState::DoneFailed,
            RunState::Cancelled => TaskRunState::Cancelled,
        }
    }
}

impl RunState {
    pub(crate) fn is_terminal(self) -> bool {
        !matches!(self, RunState::Pending | RunState::Running)
    }
}
