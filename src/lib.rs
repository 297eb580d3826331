// src/lib.rs

//! Dependency-ordered task execution.
//!
//! Build [`Task`]s, wire prerequisites, register them with a
//! [`TaskManager`] and call [`TaskManager::run`]:
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use taskgraph::{TaskBuilder, TaskManager};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let step = |name: &'static str| {
//!     let log = Arc::clone(&log);
//!     move || log.lock().unwrap().push(name)
//! };
//!
//! let a = TaskBuilder::new().name("a").build(step("a"));
//! let b = TaskBuilder::new().name("b").after(&a).build(step("b"));
//! let c = TaskBuilder::new().name("c").after(&b).build(step("c"));
//!
//! let mut manager = TaskManager::new();
//! manager.add(&c).add(&b).add(&a);
//! manager.run().unwrap();
//!
//! assert_eq!(*log.lock().unwrap(), ["a", "b", "c"]);
//! ```

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod manager;
pub mod task;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::exec::CommandTasks;

pub use crate::errors::TaskGraphError;
pub use crate::manager::{ManagerState, RunReport, TaskManager};
pub use crate::task::{Task, TaskBuilder, TaskRef, Work};
pub use crate::types::{PrerequisitePolicy, RepeatRunPolicy};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - building command tasks and the manager
/// - dry-run / DOT output
/// - serial or concurrent execution
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    // Must outlive the manager: prerequisite edges are weak.
    let tasks = CommandTasks::from_config(&cfg);
    let mut manager = tasks.manager(&cfg);

    if args.dot {
        println!("{}", manager.graph()?.to_dot());
        return Ok(());
    }

    if args.dry_run {
        print_dry_run(&cfg, &manager)?;
        return Ok(());
    }

    let jobs = args.jobs.unwrap_or(cfg.manager.max_parallel).max(1);

    let report = if jobs > 1 {
        manager.run_concurrent(jobs).await?
    } else {
        manager.run()?
    };

    info!(executed = report.len(), "all tasks complete");
    Ok(())
}

/// Print policies, tasks and the execution order without running anything.
fn print_dry_run(cfg: &ConfigFile, manager: &TaskManager) -> Result<()> {
    println!("taskgraph dry-run");
    println!("  manager.prerequisites = {:?}", cfg.manager.prerequisites);
    println!("  manager.repeat_run = {:?}", cfg.manager.repeat_run);
    println!("  manager.max_parallel = {}", cfg.manager.max_parallel);
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if !task.register {
            println!("      register: false");
        }
    }
    println!();

    let plan = manager.plan()?;
    println!("execution order:");
    for (position, label) in plan.labels().iter().enumerate() {
        println!("  {}. {}", position + 1, label.name().unwrap_or("?"));
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
