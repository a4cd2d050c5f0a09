use actnet_shared::{
    game_context::ContextMessage, rmi::RmiBody, ChannelId, DisconnectCause, EntityId,
    EstablishChannel, NetChannel, SendHandle, INVALID_ENTITY_ID,
};

/// The client's end of its connection to the server
pub struct ClientChannel {
    link: Box<dyn NetChannel>,
    player_id: EntityId,
    level_loaded: bool,
    migrating: bool,
    time_synced: bool,
    file_sync_complete: bool,
}

impl ClientChannel {
    pub(crate) fn new(link: Box<dyn NetChannel>) -> Self {
        Self {
            link,
            player_id: INVALID_ENTITY_ID,
            level_loaded: false,
            migrating: false,
            time_synced: true,
            file_sync_complete: true,
        }
    }

    pub fn set_time_synced(&mut self, synced: bool) {
        self.time_synced = synced;
    }

    pub fn set_file_sync_complete(&mut self, complete: bool) {
        self.file_sync_complete = complete;
    }

    pub fn set_migrating(&mut self, migrating: bool) {
        self.migrating = migrating;
    }
}

impl NetChannel for ClientChannel {
    fn channel_id(&self) -> ChannelId {
        self.link.channel_id()
    }

    fn is_local(&self) -> bool {
        self.link.is_local()
    }

    fn dispatch_rmi(&mut self, body: &RmiBody) {
        self.link.dispatch_rmi(body);
    }

    fn send(&mut self, message: ContextMessage) -> SendHandle {
        self.link.send(message)
    }

    fn is_acknowledged(&self, handle: SendHandle) -> bool {
        self.link.is_acknowledged(handle)
    }

    fn disconnect(&mut self, cause: DisconnectCause, reason: &str) {
        self.link.disconnect(cause, reason);
    }
}

impl EstablishChannel for ClientChannel {
    fn is_server_channel(&self) -> bool {
        false
    }

    fn is_migrating(&self) -> bool {
        self.migrating
    }

    fn is_file_sync_complete(&self) -> bool {
        self.file_sync_complete
    }

    fn is_time_synced(&self) -> bool {
        self.time_synced
    }

    fn level_loaded(&self) -> bool {
        self.level_loaded
    }

    fn set_level_loaded(&mut self, loaded: bool) {
        self.level_loaded = loaded;
    }

    fn player_id(&self) -> EntityId {
        self.player_id
    }

    fn set_player_id(&mut self, player_id: EntityId) {
        self.player_id = player_id;
    }
}
