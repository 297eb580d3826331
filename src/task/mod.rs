// src/task/mod.rs

//! Tasks: units of work with prerequisites and a completion flag.
//!
//! - [`work`] defines the [`Work`] trait and closure adapters.
//! - [`handle`] holds [`Task`], its type-erased [`TaskRef`] and
//!   [`TaskBuilder`].
//! - [`label`] provides ids and labels for diagnostics.

pub mod handle;
pub mod label;
pub mod work;

pub use handle::{Task, TaskBuilder, TaskRef};
pub use label::{TaskId, TaskLabel};
pub use work::{FnWork, TryFnWork, Work};
