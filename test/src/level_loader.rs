/// Level loader that succeeds or fails on demand and remembers what it
/// was asked to load

use std::sync::{Arc, Mutex};

use actnet_shared::establishment::LevelLoader;

#[derive(Clone)]
pub struct TestLevelLoader {
    succeed: bool,
    loaded: Arc<Mutex<Vec<String>>>,
}

impl TestLevelLoader {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            loaded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn loaded_levels(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }
}

impl LevelLoader for TestLevelLoader {
    fn load_level(&self, level: &str) -> bool {
        self.loaded.lock().unwrap().push(level.to_string());
        self.succeed
    }
}
