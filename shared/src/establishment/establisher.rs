use log::{debug, warn};

use crate::establishment::{
    context_view_state::ContextViewState,
    error::EstablishmentError,
    task::{EstablishmentTask, TaskResult},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EstablisherStatus {
    /// Still working through the tasks of this milestone
    Working(ContextViewState),
    Done,
    Failed {
        task: String,
        cause: EstablishmentError,
    },
}

struct ScheduledTask<H: ?Sized> {
    milestone: ContextViewState,
    task: Box<dyn EstablishmentTask<H>>,
}

/// Runs establishment tasks in milestone order, and in the order they were
/// added within a milestone
pub struct ContextEstablisher<H: ?Sized> {
    tasks: Vec<ScheduledTask<H>>,
    cursor: usize,
    ceiling: Option<ContextViewState>,
    failure: Option<(String, EstablishmentError)>,
}

impl<H: ?Sized> ContextEstablisher<H> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            cursor: 0,
            ceiling: None,
            failure: None,
        }
    }

    /// Schedules `task` after every task already added for `milestone`
    pub fn add_task(&mut self, milestone: ContextViewState, task: Box<dyn EstablishmentTask<H>>) {
        let position = self
            .tasks
            .iter()
            .position(|scheduled| scheduled.milestone > milestone)
            .unwrap_or(self.tasks.len());
        if position < self.cursor {
            warn!(
                "Establishment task '{}' added for {:?}, which has already passed",
                task.name(),
                milestone
            );
            self.cursor += 1;
        }
        self.tasks.insert(position, ScheduledTask { milestone, task });
    }

    /// Stops before the first task of any milestone after `ceiling`
    pub fn set_ceiling(&mut self, ceiling: Option<ContextViewState>) {
        self.ceiling = ceiling;
    }

    /// Runs tasks until one has to wait, fails, or none are left
    pub fn step(&mut self, host: &mut H) -> EstablisherStatus {
        if let Some((task, cause)) = &self.failure {
            return EstablisherStatus::Failed {
                task: task.clone(),
                cause: cause.clone(),
            };
        }

        while let Some(scheduled) = self.tasks.get_mut(self.cursor) {
            if self.ceiling.is_some_and(|ceiling| scheduled.milestone > ceiling) {
                return EstablisherStatus::Working(scheduled.milestone);
            }

            match scheduled.task.step(host) {
                TaskResult::Ok => {
                    debug!(
                        "Establishment task '{}' ({:?}) done",
                        scheduled.task.name(),
                        scheduled.milestone
                    );
                    self.cursor += 1;
                }
                TaskResult::Wait => return EstablisherStatus::Working(scheduled.milestone),
                TaskResult::Failed(cause) => {
                    let name = scheduled.task.name().to_string();
                    warn!("Establishment task '{}' failed: {}", name, cause);
                    scheduled.task.on_failure(host, &cause);
                    self.failure = Some((name.clone(), cause.clone()));
                    return EstablisherStatus::Failed { task: name, cause };
                }
            }
        }

        EstablisherStatus::Done
    }

    /// The milestone of the next task to run, or None when all are done
    pub fn current_milestone(&self) -> Option<ContextViewState> {
        self.tasks.get(self.cursor).map(|scheduled| scheduled.milestone)
    }

    pub fn is_done(&self) -> bool {
        self.failure.is_none() && self.cursor >= self.tasks.len()
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn task_names(&self) -> Vec<(ContextViewState, &str)> {
        self.tasks
            .iter()
            .map(|scheduled| (scheduled.milestone, scheduled.task.name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<H: ?Sized> Default for ContextEstablisher<H> {
    fn default() -> Self {
        Self::new()
    }
}
