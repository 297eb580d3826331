// src/dag/mod.rs

//! Dependency graph planning and scheduling.
//!
//! - [`plan`] turns registered tasks into a stable topological order,
//!   rejecting cycles and unregistered prerequisites.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   planned tasks are ready, used by the concurrent run.
//! - [`graph`] is a `petgraph` snapshot for diagnostics and DOT output.
//! - [`task_info`] provides per-run task states.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod graph;
pub mod plan;
pub mod scheduler;
pub mod scheduler_step;
pub mod task_info;

pub use graph::TaskGraph;
pub use plan::ExecutionPlan;
pub use scheduler::{Scheduler, TaskOutcome};
pub use scheduler_step::SchedulerStep;
pub use task_info::TaskRunState;
