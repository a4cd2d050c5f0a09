use thiserror::Error;

/// Errors that can occur while registering or resolving extensions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// An extension with this name has already been registered
    #[error("Extension '{name}' is already registered. Extension names must be unique")]
    DuplicateName { name: String },

    /// Registration was attempted after a game object started using the registry
    #[error("ExtensionRegistry already locked! Register extensions before creating game objects")]
    AlreadyLocked,

    /// The name has not been registered
    #[error("Extension '{name}' is not registered")]
    UnknownName { name: String },

    /// The event id space is exhausted
    #[error("Cannot register game object event '{name}': at most {limit} events are supported")]
    TooManyEvents { name: String, limit: usize },
}
