mod commands;
mod error;
mod extension;
mod extension_registry;

pub use commands::{ExtensionChange, ExtensionCommand, ExtensionCommands};
pub use error::ExtensionError;
pub use extension::GameObjectExtension;
pub use extension_registry::{
    EventId, ExtensionFactory, ExtensionId, ExtensionRegistry, MAX_GAME_OBJECT_EVENTS,
};
