use thiserror::Error;

/// Errors that can occur during game object operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameObjectError {
    /// The named extension is not registered
    #[error("Extension '{name}' is not registered with the ExtensionRegistry")]
    UnknownExtension { name: String },

    /// Attempted to release an extension that is not present on the object
    #[error("Attempt to release a non-existent extension '{name}'")]
    ReleaseMissingExtension { name: String },

    /// The extension is not present on the object
    #[error("Extension {extension_id} is not present on this game object")]
    ExtensionNotPresent { extension_id: u16 },

    /// Update slot index out of range
    #[error("Update slot {slot} is out of range, at most {limit} slots are supported")]
    InvalidSlot { slot: usize, limit: usize },

    /// The update slot's enable counter would overflow
    #[error("Update slot {slot} of extension {extension_id} has been enabled too many times")]
    SlotEnableOverflow { extension_id: u16, slot: usize },

    /// AI activation configured on an object without AI
    #[error("Cannot set AI activation mode on a game object without AI")]
    NoAi,
}
