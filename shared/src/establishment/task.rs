use std::time::Instant;

use crate::establishment::error::EstablishmentError;

/// Outcome of stepping a task once
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskResult {
    /// Done, move on to the next task
    Ok,
    /// Not done yet, step me again next tick
    Wait,
    /// Abort establishment
    Failed(EstablishmentError),
}

/// Time source for tasks with deadlines
pub trait Clock {
    fn now(&self) -> Instant;
}

pub trait EstablishmentTask<H: ?Sized> {
    fn name(&self) -> &str;

    fn step(&mut self, host: &mut H) -> TaskResult;

    /// Called once when this task fails, before establishment stops
    fn on_failure(&mut self, _host: &mut H, _error: &EstablishmentError) {}
}

/// A task backed by a closure
pub struct FnTask<F> {
    name: String,
    step: F,
}

impl<F> FnTask<F> {
    pub fn new(name: &str, step: F) -> Self {
        Self {
            name: name.to_string(),
            step,
        }
    }
}

impl<H: ?Sized, F: FnMut(&mut H) -> TaskResult> EstablishmentTask<H> for FnTask<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, host: &mut H) -> TaskResult {
        (self.step)(host)
    }
}
