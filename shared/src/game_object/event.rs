use crate::extension::{EventId, ExtensionId};

/// Deliver the event to the game object itself
pub const EVENT_TO_GAME_OBJECT: u8 = 0x01;
/// Deliver the event to extensions
pub const EVENT_TO_EXTENSIONS: u8 = 0x02;

#[derive(Clone, Debug, PartialEq)]
pub struct GameObjectEvent {
    pub event: EventId,
    pub flags: u8,
    /// When set, only this extension receives the event, regardless of
    /// its registered interest
    pub target: Option<ExtensionId>,
    pub param: f32,
}

impl GameObjectEvent {
    pub fn new(event: EventId, flags: u8) -> Self {
        Self {
            event,
            flags,
            target: None,
            param: 0.0,
        }
    }

    pub fn to_extensions(event: EventId) -> Self {
        Self::new(event, EVENT_TO_EXTENSIONS)
    }

    pub fn targeted(event: EventId, target: ExtensionId) -> Self {
        Self {
            target: Some(target),
            ..Self::new(event, EVENT_TO_EXTENSIONS)
        }
    }

    pub fn with_param(mut self, param: f32) -> Self {
        self.param = param;
        self
    }
}
