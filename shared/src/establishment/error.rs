use thiserror::Error;

use crate::{disconnect::DisconnectCause, types::ChannelId};

/// Why an establishment task failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstablishmentError {
    #[error("Failed to load level '{level}'")]
    LevelLoadFailed { level: String },

    #[error("Level loading thread for '{level}' panicked")]
    LevelLoaderPanicked { level: String },

    /// The peer's class registry doesn't match ours
    #[error("Class registry mismatch, expected hash {expected:#010x} but received {received:#010x}")]
    ClassRegistryMismatch { expected: u32, received: u32 },

    #[error("Peer registered unknown class '{name}'")]
    UnknownClass { name: String },

    #[error("Channel {channel_id} went away during establishment")]
    ChannelLost { channel_id: ChannelId },

    #[error("Game rejected client on channel {channel_id}")]
    ClientRejected { channel_id: ChannelId },

    #[error("{reason}")]
    Disconnect {
        cause: DisconnectCause,
        reason: String,
    },
}

impl EstablishmentError {
    /// The cause the owning channel is disconnected with
    pub fn disconnect_cause(&self) -> DisconnectCause {
        match self {
            EstablishmentError::LevelLoadFailed { .. }
            | EstablishmentError::LevelLoaderPanicked { .. }
            | EstablishmentError::ClientRejected { .. } => DisconnectCause::GameError,
            EstablishmentError::ClassRegistryMismatch { .. }
            | EstablishmentError::UnknownClass { .. } => DisconnectCause::ContextCorruption,
            EstablishmentError::ChannelLost { .. } => DisconnectCause::NubDestroyed,
            EstablishmentError::Disconnect { cause, .. } => *cause,
        }
    }
}
