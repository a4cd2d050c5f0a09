use crate::{
    disconnect::DisconnectCause,
    game_context::ContextMessage,
    rmi::RmiBody,
    types::{ChannelId, EntityId},
};

/// Identifies one reliable send so a later task can wait for its
/// acknowledgement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SendHandle(u32);

impl SendHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// One peer connection, as seen by the replication core
pub trait NetChannel {
    fn channel_id(&self) -> ChannelId;

    /// True for the loopback channel between a server and its own client
    fn is_local(&self) -> bool;

    fn dispatch_rmi(&mut self, body: &RmiBody);

    /// Sends a handshake message reliably
    fn send(&mut self, message: ContextMessage) -> SendHandle;

    fn is_acknowledged(&self, handle: SendHandle) -> bool;

    fn disconnect(&mut self, cause: DisconnectCause, reason: &str);
}

/// The channel state context establishment reads and updates
pub trait EstablishChannel: NetChannel {
    /// True on the server's end of a connection
    fn is_server_channel(&self) -> bool;

    /// True while the channel is moving to a new host
    fn is_migrating(&self) -> bool {
        false
    }

    fn is_on_hold(&self) -> bool {
        false
    }

    fn clear_on_hold(&mut self) {}

    fn is_file_sync_complete(&self) -> bool {
        true
    }

    fn is_time_synced(&self) -> bool {
        true
    }

    fn level_loaded(&self) -> bool;

    fn set_level_loaded(&mut self, loaded: bool);

    /// The actor spawned for the peer, 0 before it is spawned
    fn player_id(&self) -> EntityId;

    fn set_player_id(&mut self, player_id: EntityId);
}
