use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{info, warn};

use crate::establishment::{
    error::EstablishmentError,
    task::{EstablishmentTask, TaskResult},
};

/// Loads level content. Runs on a helper thread.
pub trait LevelLoader: Send + Sync {
    /// Returns false if the level could not be loaded
    fn load_level(&self, level: &str) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LevelLoadStatus {
    Working = 0,
    Failed = 1,
    Succeeded = 2,
}

impl LevelLoadStatus {
    fn from_u8(value: u8) -> LevelLoadStatus {
        match value {
            0 => LevelLoadStatus::Working,
            2 => LevelLoadStatus::Succeeded,
            _ => LevelLoadStatus::Failed,
        }
    }
}

/// Starts loading the level on a helper thread the first time it is
/// stepped, then waits for it. The thread is joined before the task
/// reports.
pub struct LevelLoadTask {
    loader: Arc<dyn LevelLoader>,
    level: String,
    status: Arc<AtomicU8>,
    thread: Option<JoinHandle<()>>,
    finished: Option<LevelLoadStatus>,
}

impl LevelLoadTask {
    pub fn new(loader: Arc<dyn LevelLoader>, level: &str) -> Self {
        Self {
            loader,
            level: level.to_string(),
            status: Arc::new(AtomicU8::new(LevelLoadStatus::Working as u8)),
            thread: None,
            finished: None,
        }
    }

    pub fn status(&self) -> LevelLoadStatus {
        LevelLoadStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    fn poll(&mut self) -> Result<Option<LevelLoadStatus>, EstablishmentError> {
        if let Some(finished) = self.finished {
            return Ok(Some(finished));
        }

        let Some(thread) = self.thread.as_ref() else {
            info!("Loading level '{}'", self.level);
            let loader = self.loader.clone();
            let level = self.level.clone();
            let status = self.status.clone();
            let spawned = thread::Builder::new()
                .name("level-load".to_string())
                .spawn(move || {
                    let result = if loader.load_level(&level) {
                        LevelLoadStatus::Succeeded
                    } else {
                        LevelLoadStatus::Failed
                    };
                    status.store(result as u8, Ordering::Release);
                });
            return match spawned {
                Ok(handle) => {
                    self.thread = Some(handle);
                    Ok(None)
                }
                Err(error) => {
                    warn!("Failed to start level loading thread: {}", error);
                    Err(EstablishmentError::LevelLoadFailed {
                        level: self.level.clone(),
                    })
                }
            };
        };

        let status = self.status();
        if status == LevelLoadStatus::Working && !thread.is_finished() {
            return Ok(None);
        }

        let joined = self.thread.take().map(JoinHandle::join);
        if let Some(Err(_)) = joined {
            return Err(EstablishmentError::LevelLoaderPanicked {
                level: self.level.clone(),
            });
        }
        let status = self.status();
        self.finished = Some(status);
        Ok(Some(status))
    }
}

impl<H: ?Sized> EstablishmentTask<H> for LevelLoadTask {
    fn name(&self) -> &str {
        "LoadLevel"
    }

    fn step(&mut self, _host: &mut H) -> TaskResult {
        match self.poll() {
            Ok(None) => TaskResult::Wait,
            Ok(Some(LevelLoadStatus::Succeeded)) => TaskResult::Ok,
            Ok(Some(_)) => TaskResult::Failed(EstablishmentError::LevelLoadFailed {
                level: self.level.clone(),
            }),
            Err(error) => TaskResult::Failed(error),
        }
    }

    fn on_failure(&mut self, _host: &mut H, error: &EstablishmentError) {
        warn!("Level '{}' did not load: {}", self.level, error);
    }
}
