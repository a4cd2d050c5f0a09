use actnet_shared::{ChannelId, DisconnectCause};

/// Gets told about clients leaving the server, and decides whether a
/// disconnected client's channel is held for a reconnect
pub trait ServerListener {
    /// Votes on holding the channel. One vote to keep is enough.
    fn should_keep_client(&mut self, _channel_id: ChannelId, _cause: DisconnectCause) -> bool {
        false
    }

    /// Called once a client is gone for good: right away when its channel
    /// isn't held, or when the hold expires
    fn on_client_disconnected(&mut self, channel_id: ChannelId, cause: DisconnectCause, reason: &str);
}
