use actnet_shared::{establishment::EstablishmentError, ChannelId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Client is not connected to a server")]
    NotConnected,

    #[error("Client is already connected on channel {channel_id}")]
    AlreadyConnected { channel_id: ChannelId },

    /// The server's class registry doesn't match ours. The client has been
    /// disconnected.
    #[error("Context corruption: {cause}")]
    ContextCorruption { cause: EstablishmentError },
}
