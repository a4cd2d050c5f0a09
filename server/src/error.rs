use actnet_shared::ChannelId;
use thiserror::Error;

use crate::ban_list::BanTarget;

/// Errors returned by the server's channel registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// The connecting client is on the ban list
    #[error("Connection refused, {target} is banned")]
    Banned { target: BanTarget },

    /// No live channel has this id
    #[error("Channel {channel_id} does not exist")]
    UnknownChannel { channel_id: ChannelId },

    /// The session handle maps to an id a live channel already uses
    #[error("Channel id {channel_id} is already in use")]
    ChannelIdInUse { channel_id: ChannelId },

    /// Every channel id is taken by a live or held channel
    #[error("No free channel id, every id is live or held")]
    ChannelIdsExhausted,

    /// Banning needs a profile id or an address to remember
    #[error("Channel {channel_id} has neither a profile id nor an address to ban")]
    NoBanTarget { channel_id: ChannelId },
}
