/// In-memory channel for end-to-end tests
/// Records what a peer sends instead of putting it on a wire

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use actnet_shared::{
    game_context::ContextMessage, rmi::RmiBody, ChannelId, DisconnectCause, NetChannel,
    SendHandle,
};

#[derive(Default)]
struct LinkState {
    outbox: VecDeque<ContextMessage>,
    rmis: Vec<RmiBody>,
    next_handle: u32,
    unacknowledged: HashSet<u32>,
    manual_ack: bool,
    disconnected: Option<(DisconnectCause, String)>,
}

/// One end of a connection. Hand it to a server or client; keep the
/// matching [`LinkProbe`] to look at the traffic.
pub struct LoopbackChannel {
    channel_id: ChannelId,
    local: bool,
    state: Arc<Mutex<LinkState>>,
}

impl LoopbackChannel {
    pub fn new(channel_id: ChannelId) -> (Self, LinkProbe) {
        Self::build(channel_id, false)
    }

    /// The channel between a server and its own client
    pub fn local(channel_id: ChannelId) -> (Self, LinkProbe) {
        Self::build(channel_id, true)
    }

    fn build(channel_id: ChannelId, local: bool) -> (Self, LinkProbe) {
        let state = Arc::new(Mutex::new(LinkState::default()));
        let channel = Self {
            channel_id,
            local,
            state: state.clone(),
        };
        (channel, LinkProbe { state })
    }
}

impl NetChannel for LoopbackChannel {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn dispatch_rmi(&mut self, body: &RmiBody) {
        self.state.lock().unwrap().rmis.push(body.clone());
    }

    fn send(&mut self, message: ContextMessage) -> SendHandle {
        let mut state = self.state.lock().unwrap();
        state.next_handle += 1;
        let handle = state.next_handle;
        if state.manual_ack {
            state.unacknowledged.insert(handle);
        }
        state.outbox.push_back(message);
        SendHandle::new(handle)
    }

    fn is_acknowledged(&self, handle: SendHandle) -> bool {
        !self.state.lock().unwrap().unacknowledged.contains(&handle.id())
    }

    fn disconnect(&mut self, cause: DisconnectCause, reason: &str) {
        self.state.lock().unwrap().disconnected = Some((cause, reason.to_string()));
    }
}

/// The test's view of a [`LoopbackChannel`]
#[derive(Clone)]
pub struct LinkProbe {
    state: Arc<Mutex<LinkState>>,
}

impl LinkProbe {
    /// Sends stay unacknowledged until `acknowledge_all`
    pub fn set_manual_ack(&self, manual: bool) {
        self.state.lock().unwrap().manual_ack = manual;
    }

    pub fn acknowledge_all(&self) {
        self.state.lock().unwrap().unacknowledged.clear();
    }

    /// Takes every message sent so far
    pub fn take_sent(&self) -> Vec<ContextMessage> {
        self.state.lock().unwrap().outbox.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().outbox.len()
    }

    pub fn rmi_count(&self) -> usize {
        self.state.lock().unwrap().rmis.len()
    }

    pub fn disconnect_cause(&self) -> Option<DisconnectCause> {
        self.state
            .lock()
            .unwrap()
            .disconnected
            .as_ref()
            .map(|(cause, _)| *cause)
    }
}
