use std::net::IpAddr;

use log::warn;

use actnet_shared::{
    game_context::ContextMessage, rmi::RmiBody, ChannelId, DisconnectCause, EntityId,
    EstablishChannel, NetChannel, ProfileId, SendHandle, INVALID_ENTITY_ID,
};

/// The server's end of one client connection.
///
/// A held channel keeps its record (id, player, level state) but loses its
/// link until the same profile reconnects.
pub struct ServerChannel {
    channel_id: ChannelId,
    profile_id: Option<ProfileId>,
    address: Option<IpAddr>,
    link: Option<Box<dyn NetChannel>>,
    player_id: EntityId,
    level_loaded: bool,
    on_hold: bool,
    migrating: bool,
}

impl ServerChannel {
    pub(crate) fn new(
        channel_id: ChannelId,
        profile_id: Option<ProfileId>,
        address: Option<IpAddr>,
        link: Box<dyn NetChannel>,
    ) -> Self {
        Self {
            channel_id,
            profile_id,
            address,
            link: Some(link),
            player_id: INVALID_ENTITY_ID,
            level_loaded: false,
            on_hold: false,
            migrating: false,
        }
    }

    pub fn profile_id(&self) -> Option<ProfileId> {
        self.profile_id
    }

    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }

    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }

    pub fn set_migrating(&mut self, migrating: bool) {
        self.migrating = migrating;
    }

    /// Drops the link and marks the record as held
    pub(crate) fn hold(&mut self) {
        self.link = None;
        self.on_hold = true;
        self.level_loaded = false;
    }

    /// Attaches a reconnected client. The on-hold flag stays set until
    /// establishment clears it.
    pub(crate) fn rebind(&mut self, address: Option<IpAddr>, link: Box<dyn NetChannel>) {
        self.address = address;
        self.link = Some(link);
    }

    pub(crate) fn link_mut(&mut self) -> Option<&mut dyn NetChannel> {
        match self.link.as_mut() {
            Some(link) => Some(link.as_mut()),
            None => None,
        }
    }
}

impl NetChannel for ServerChannel {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn is_local(&self) -> bool {
        self.link.as_ref().is_some_and(|link| link.is_local())
    }

    fn dispatch_rmi(&mut self, body: &RmiBody) {
        match self.link.as_mut() {
            Some(link) => link.dispatch_rmi(body),
            None => warn!("Dropping RMI for channel {} while it is on hold", self.channel_id),
        }
    }

    fn send(&mut self, message: ContextMessage) -> SendHandle {
        match self.link.as_mut() {
            Some(link) => link.send(message),
            None => {
                warn!("Dropping message for channel {} while it is on hold", self.channel_id);
                SendHandle::new(0)
            }
        }
    }

    fn is_acknowledged(&self, handle: SendHandle) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| link.is_acknowledged(handle))
    }

    fn disconnect(&mut self, cause: DisconnectCause, reason: &str) {
        if let Some(link) = self.link.as_mut() {
            link.disconnect(cause, reason);
        }
    }
}

impl EstablishChannel for ServerChannel {
    fn is_server_channel(&self) -> bool {
        true
    }

    fn is_migrating(&self) -> bool {
        self.migrating
    }

    fn is_on_hold(&self) -> bool {
        self.on_hold
    }

    fn clear_on_hold(&mut self) {
        self.on_hold = false;
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

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Default)]
    struct Sent {
        messages: Vec<ContextMessage>,
        disconnects: Vec<DisconnectCause>,
    }

    struct SharedLink(Rc<RefCell<Sent>>);

    impl NetChannel for SharedLink {
        fn channel_id(&self) -> ChannelId {
            99
        }

        fn is_local(&self) -> bool {
            false
        }

        fn dispatch_rmi(&mut self, _body: &RmiBody) {}

        fn send(&mut self, message: ContextMessage) -> SendHandle {
            let mut sent = self.0.borrow_mut();
            sent.messages.push(message);
            SendHandle::new(sent.messages.len() as u32)
        }

        fn is_acknowledged(&self, _handle: SendHandle) -> bool {
            true
        }

        fn disconnect(&mut self, cause: DisconnectCause, _reason: &str) {
            self.0.borrow_mut().disconnects.push(cause);
        }
    }

    #[test]
    fn held_channel_drops_traffic() {
        let sent = Rc::new(RefCell::new(Sent::default()));
        let mut channel = ServerChannel::new(3, Some(11), None, Box::new(SharedLink(sent.clone())));
        assert_eq!(channel.channel_id(), 3);

        let handle = channel.send(ContextMessage::ClassHash(1));
        assert!(channel.is_acknowledged(handle));

        channel.set_level_loaded(true);
        channel.hold();
        assert!(channel.is_on_hold());
        assert!(!channel.level_loaded());
        assert!(!channel.has_link());

        let handle = channel.send(ContextMessage::ClassHash(2));
        assert_eq!(handle, SendHandle::new(0));
        assert!(!channel.is_acknowledged(handle));
        assert_eq!(sent.borrow().messages.len(), 1);
    }

    #[test]
    fn rebind_keeps_the_record() {
        let sent = Rc::new(RefCell::new(Sent::default()));
        let mut channel = ServerChannel::new(3, Some(11), None, Box::new(SharedLink(sent.clone())));
        channel.set_player_id(42);
        channel.hold();

        channel.rebind(None, Box::new(SharedLink(sent.clone())));
        assert!(channel.has_link());
        assert!(channel.is_on_hold());
        assert_eq!(channel.player_id(), 42);

        channel.clear_on_hold();
        assert!(!channel.is_on_hold());

        channel.disconnect(DisconnectCause::Kicked, "bye");
        assert_eq!(sent.borrow().disconnects, vec![DisconnectCause::Kicked]);
    }
}
