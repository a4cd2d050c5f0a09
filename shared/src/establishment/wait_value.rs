use std::time::{Duration, Instant};

use log::warn;

use crate::establishment::task::{Clock, EstablishmentTask, TaskResult};

/// Waits until a condition on the host holds. With a soft deadline, the
/// task gives up waiting and succeeds once the deadline has passed.
pub struct WaitValue<F> {
    name: String,
    condition: F,
    deadline: Option<Duration>,
    started: Option<Instant>,
}

impl<F> WaitValue<F> {
    pub fn new(name: &str, condition: F) -> Self {
        Self {
            name: name.to_string(),
            condition,
            deadline: None,
            started: None,
        }
    }

    pub fn with_soft_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl<H: Clock + ?Sized, F: FnMut(&mut H) -> bool> EstablishmentTask<H> for WaitValue<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, host: &mut H) -> TaskResult {
        if (self.condition)(host) {
            return TaskResult::Ok;
        }
        let Some(deadline) = self.deadline else {
            return TaskResult::Wait;
        };

        let now = host.now();
        let started = *self.started.get_or_insert(now);
        if now.duration_since(started) >= deadline {
            warn!(
                "{}: still waiting after {:.1}s, continuing anyway",
                self.name,
                deadline.as_secs_f32()
            );
            TaskResult::Ok
        } else {
            TaskResult::Wait
        }
    }
}
