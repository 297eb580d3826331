// src/task/handle.rs

//! Task handles.
//!
//! A [`Task<T>`] is a cheaply clonable handle to one unit of work. The
//! manager and prerequisite lists only need identity, completion state and a
//! way to execute, so they work with the type-erased [`TaskRef`] instead.
//! This lets tasks with different output types share one graph.
//!
//! Prerequisite edges are stored as `Weak` references: the caller (and the
//! manager) own tasks, a dependent only points at them. Cyclic graphs
//! therefore do not keep themselves alive.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use tracing::{debug, warn};

use crate::errors::{Result, TaskGraphError};
use crate::task::label::{TaskId, TaskLabel};
use crate::task::work::{FnWork, TryFnWork, Work};

/// Non-generic part of a task: identity, edges and completion state.
struct TaskCore {
    id: TaskId,
    name: Option<String>,
    prerequisites: RwLock<Vec<Weak<dyn Node>>>,
    complete: AtomicBool,
    invocations: AtomicUsize,
}

impl TaskCore {
    fn new(name: Option<String>, prerequisites: &[TaskRef]) -> Self {
        Self {
            id: TaskId::next(),
            name,
            prerequisites: RwLock::new(prerequisites.iter().map(TaskRef::downgrade).collect()),
            complete: AtomicBool::new(false),
            invocations: AtomicUsize::new(0),
        }
    }

    fn label(&self) -> TaskLabel {
        TaskLabel {
            id: self.id,
            name: self.name.clone(),
        }
    }

    fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    fn prerequisites(&self) -> Result<Vec<TaskRef>> {
        let links = self
            .prerequisites
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        links
            .iter()
            .map(|link| {
                link.upgrade()
                    .map(TaskRef)
                    .ok_or_else(|| TaskGraphError::DanglingPrerequisite { task: self.label() })
            })
            .collect()
    }

    fn check_prerequisites(&self) -> Result<()> {
        for prerequisite in self.prerequisites()? {
            if !prerequisite.is_complete() {
                return Err(TaskGraphError::PrerequisiteNotSatisfied {
                    task: self.label(),
                    prerequisite: prerequisite.label(),
                });
            }
        }
        Ok(())
    }
}

/// Object-safe view of a task used by [`TaskRef`].
trait Node: Send + Sync {
    fn core(&self) -> &TaskCore;

    /// Invoke the task and discard its output.
    fn execute(&self) -> Result<()>;
}

struct TaskInner<T> {
    core: TaskCore,
    work: Mutex<Box<dyn Work<Output = T>>>,
}

impl<T: Send + 'static> TaskInner<T> {
    fn invoke(&self) -> Result<T> {
        self.core.check_prerequisites()?;

        let label = self.core.label();
        if self.core.is_complete() {
            warn!(task = %label, "task already completed; running it again");
        }

        let mut work = self.work.lock().unwrap_or_else(PoisonError::into_inner);
        self.core.invocations.fetch_add(1, Ordering::AcqRel);
        debug!(task = %label, "invoking task");

        let output = work
            .call()
            .map_err(|source| TaskGraphError::TaskFailed {
                task: label,
                source,
            })?;

        self.core.complete.store(true, Ordering::Release);
        Ok(output)
    }
}

impl<T: Send + 'static> Node for TaskInner<T> {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn execute(&self) -> Result<()> {
        self.invoke().map(drop)
    }
}

/// A unit of work with prerequisites and a completion flag.
///
/// Cloning a `Task` clones the handle, not the work.
pub struct Task<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T: Send + 'static> Task<T> {
    /// Anonymous task without prerequisites running an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        TaskBuilder::new().build(f)
    }

    /// Anonymous task without prerequisites running a fallible closure.
    pub fn fallible<F>(f: F) -> Self
    where
        F: FnMut() -> anyhow::Result<T> + Send + 'static,
    {
        TaskBuilder::new().build_fallible(f)
    }

    /// Anonymous task with the given prerequisites.
    pub fn with_prerequisites<I, P, F>(prerequisites: I, f: F) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TaskRef>,
        F: FnMut() -> T + Send + 'static,
    {
        TaskBuilder::new().after_all(prerequisites).build(f)
    }

    pub fn from_work<W>(work: W) -> Self
    where
        W: Work<Output = T> + 'static,
    {
        TaskBuilder::new().build_work(work)
    }

    /// Run the work.
    ///
    /// Fails with `PrerequisiteNotSatisfied` without running anything if any
    /// prerequisite is incomplete. On success the completion flag is set and
    /// the output returned. Invoking a completed task runs the work again.
    pub fn invoke(&self) -> Result<T> {
        self.inner.invoke()
    }

    /// Type-erased handle to this task.
    pub fn handle(&self) -> TaskRef {
        TaskRef(self.inner.clone())
    }
}

impl<T> Task<T> {
    pub fn id(&self) -> TaskId {
        self.inner.core.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.core.name.as_deref()
    }

    pub fn label(&self) -> TaskLabel {
        self.inner.core.label()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.core.is_complete()
    }

    /// How many times the work has been called.
    pub fn invocations(&self) -> usize {
        self.inner.core.invocations.load(Ordering::Acquire)
    }

    /// Current prerequisites, in the order they were added.
    pub fn prerequisites(&self) -> Result<Vec<TaskRef>> {
        self.inner.core.prerequisites()
    }

    /// Append a prerequisite after construction.
    pub fn add_prerequisite(&self, prerequisite: impl Into<TaskRef>) {
        let prerequisite = prerequisite.into();
        self.inner
            .core
            .prerequisites
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prerequisite.downgrade());
    }

    /// Clear the completion flag.
    pub fn reset(&self) {
        self.inner.core.complete.store(false, Ordering::Release);
    }
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label())
            .field("complete", &self.is_complete())
            .finish_non_exhaustive()
    }
}

/// Type-erased, clonable task handle. Equality is identity.
#[derive(Clone)]
pub struct TaskRef(Arc<dyn Node>);

impl TaskRef {
    pub fn id(&self) -> TaskId {
        self.0.core().id
    }

    pub fn name(&self) -> Option<&str> {
        self.0.core().name.as_deref()
    }

    pub fn label(&self) -> TaskLabel {
        self.0.core().label()
    }

    pub fn is_complete(&self) -> bool {
        self.0.core().is_complete()
    }

    pub fn invocations(&self) -> usize {
        self.0.core().invocations.load(Ordering::Acquire)
    }

    pub fn prerequisites(&self) -> Result<Vec<TaskRef>> {
        self.0.core().prerequisites()
    }

    pub fn reset(&self) {
        self.0.core().complete.store(false, Ordering::Release);
    }

    /// Invoke the task, discarding its output.
    pub fn execute(&self) -> Result<()> {
        self.0.execute()
    }

    fn downgrade(&self) -> Weak<dyn Node> {
        Arc::downgrade(&self.0)
    }
}

impl PartialEq for TaskRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TaskRef {}

impl fmt::Debug for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRef")
            .field("label", &self.label())
            .field("complete", &self.is_complete())
            .finish()
    }
}

impl<T: Send + 'static> From<&Task<T>> for TaskRef {
    fn from(task: &Task<T>) -> Self {
        task.handle()
    }
}

impl<T: Send + 'static> From<Task<T>> for TaskRef {
    fn from(task: Task<T>) -> Self {
        task.handle()
    }
}

impl From<&TaskRef> for TaskRef {
    fn from(task: &TaskRef) -> Self {
        task.clone()
    }
}

/// Builder for tasks with a name and prerequisites.
///
/// ```
/// use taskgraph::task::TaskBuilder;
///
/// let fetch = TaskBuilder::new().name("fetch").build(|| "sources");
/// let build = TaskBuilder::new().name("build").after(&fetch).build(|| 42);
///
/// fetch.invoke().unwrap();
/// assert_eq!(build.invoke().unwrap(), 42);
/// ```
#[derive(Debug, Default)]
pub struct TaskBuilder {
    name: Option<String>,
    prerequisites: Vec<TaskRef>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn after(mut self, prerequisite: impl Into<TaskRef>) -> Self {
        self.prerequisites.push(prerequisite.into());
        self
    }

    pub fn after_all<I, P>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TaskRef>,
    {
        self.prerequisites
            .extend(prerequisites.into_iter().map(Into::into));
        self
    }

    pub fn build<F, T>(self, f: F) -> Task<T>
    where
        F: FnMut() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.build_work(FnWork(f))
    }

    pub fn build_fallible<F, T>(self, f: F) -> Task<T>
    where
        F: FnMut() -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.build_work(TryFnWork(f))
    }

    pub fn build_work<W>(self, work: W) -> Task<W::Output>
    where
        W: Work + 'static,
        W::Output: Send + 'static,
    {
        Task {
            inner: Arc::new(TaskInner {
                core: TaskCore::new(self.name, &self.prerequisites),
                work: Mutex::new(Box::new(work)),
            }),
        }
    }
}
