// src/exec/mod.rs

//! Shell-command tasks.
//!
//! - [`command`] implements [`Work`](crate::task::Work) for a shell command
//!   and builds a task graph plus manager from a validated config file.

pub mod command;

pub use command::{CommandTasks, CommandWork};
