// src/task/work.rs

//! The unit-of-work abstraction wrapped by a [`Task`](super::Task).

use anyhow::Result;

/// Something a task can execute.
///
/// Closures are adapted through [`FnWork`] (infallible) and [`TryFnWork`]
/// (returning `anyhow::Result`); custom types can implement this directly.
pub trait Work: Send {
    type Output;

    /// Run the work once. An `Err` leaves the owning task incomplete.
    fn call(&mut self) -> Result<Self::Output>;
}

/// Adapter for `FnMut() -> T` closures.
pub struct FnWork<F>(pub F);

impl<F, T> Work for FnWork<F>
where
    F: FnMut() -> T + Send,
    T: Send + 'static,
{
    type Output = T;

    fn call(&mut self) -> Result<T> {
        Ok((self.0)())
    }
}

/// Adapter for `FnMut() -> anyhow::Result<T>` closures.
pub struct TryFnWork<F>(pub F);

impl<F, T> Work for TryFnWork<F>
where
    F: FnMut() -> Result<T> + Send,
    T: Send + 'static,
{
    type Output = T;

    fn call(&mut self) -> Result<T> {
        (self.0)()
    }
}

impl<W: Work + ?Sized> Work for Box<W> {
    type Output = W::Output;

    fn call(&mut self) -> Result<Self::Output> {
        (**self).call()
    }
}
