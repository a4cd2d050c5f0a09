use std::sync::Arc;

use parking_lot::Mutex;

/// Guards delivery of physics callbacks to a game object against its
/// teardown. Clones share the same gate.
#[derive(Clone)]
pub struct PhysicsCallbackGate {
    open: Arc<Mutex<bool>>,
}

impl PhysicsCallbackGate {
    pub fn new() -> Self {
        Self {
            open: Arc::new(Mutex::new(true)),
        }
    }

    /// Runs `callback` while holding the gate, unless the owner has been torn
    /// down. Returns whether the callback ran.
    pub fn deliver<F: FnOnce()>(&self, callback: F) -> bool {
        let open = self.open.lock();
        if *open {
            callback();
        }
        *open
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }

    /// Closes the gate and runs `teardown` while it is held
    pub(crate) fn close_with<F: FnOnce()>(&self, teardown: F) {
        let mut open = self.open.lock();
        *open = false;
        teardown();
    }
}

impl Default for PhysicsCallbackGate {
    fn default() -> Self {
        Self::new()
    }
}
