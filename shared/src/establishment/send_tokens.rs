use std::{cell::RefCell, rc::Rc};

use crate::net_channel::SendHandle;

/// Sends recorded by one task that a later task must see acknowledged.
/// Clones share the same list.
#[derive(Clone, Debug, Default)]
pub struct SendTokens {
    handles: Rc<RefCell<Vec<SendHandle>>>,
}

impl SendTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, handle: SendHandle) {
        self.handles.borrow_mut().push(handle);
    }

    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }

    /// True once `is_acknowledged` holds for every recorded send
    pub fn all_acknowledged<F: Fn(SendHandle) -> bool>(&self, is_acknowledged: F) -> bool {
        self.handles
            .borrow()
            .iter()
            .all(|handle| is_acknowledged(*handle))
    }
}
