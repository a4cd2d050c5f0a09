use actnet_serde::SerdeErr;
use thiserror::Error;

use crate::rmi::rmi_record::RmiDirection;

/// Errors that can occur while registering or dispatching RMIs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RmiError {
    /// Registration after the protocol definition was handed out
    #[error("RMI tables are sealed. Register every interface before requesting the protocol definition")]
    TableSealed,

    /// More calls than a one-byte index can address
    #[error("RMI table is full, at most {capacity} calls can be registered per direction")]
    TableFull { capacity: usize },

    /// The index does not name a registered call
    #[error("No {direction:?} RMI registered at index {index}")]
    UnknownIndex { direction: RmiDirection, index: u8 },

    /// The call's payload could not be decoded
    #[error("Failed to decode RMI at index {index}: {error}")]
    Decode { index: u8, error: SerdeErr },

    /// A script class declares a call the scripting environment doesn't have
    #[error("Script class '{class}' declares RMI '{function}' which the script environment does not define")]
    MissingScriptFunction { class: String, function: String },

    /// A script call's parameter format contains an unknown type tag
    #[error("Script RMI '{function}' has an invalid parameter format '{format}'")]
    InvalidFormat { function: String, format: String },

    /// The script class was never registered
    #[error("Script class '{class}' has no registered RMIs")]
    UnknownScriptClass { class: String },

    /// A script call arrived for a class that has not been set up for networking
    #[error("Script class '{class}' has not been validated for networking")]
    ScriptClassNotValidated { class: String },

    /// The arguments of a script call don't match its format
    #[error("Arguments do not match format '{format}' of script RMI '{function}'")]
    ArgumentMismatch { function: String, format: String },
}
