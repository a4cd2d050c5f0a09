use std::ops::BitOr;

use log::warn;

use crate::{net_channel::NetChannel, rmi::rmi_message::RmiBody, types::ChannelId};

/// Where an outgoing call should be delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RmiDestinations(u32);

impl RmiDestinations {
    pub const NONE: RmiDestinations = RmiDestinations(0);
    pub const TO_CLIENT_CHANNEL: RmiDestinations = RmiDestinations(0x01);
    pub const TO_OWN_CLIENT: RmiDestinations = RmiDestinations(0x02);
    pub const TO_OTHER_CLIENTS: RmiDestinations = RmiDestinations(0x04);
    pub const TO_ALL_CLIENTS: RmiDestinations = RmiDestinations(0x08);
    pub const TO_SERVER: RmiDestinations = RmiDestinations(0x100);
    pub const NO_LOCAL_CALLS: RmiDestinations = RmiDestinations(0x10000);
    pub const NO_REMOTE_CALLS: RmiDestinations = RmiDestinations(0x20000);
    pub const TO_REMOTE_CLIENTS: RmiDestinations = RmiDestinations(0x10000 | 0x08);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: RmiDestinations) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    fn intersects(&self, other: RmiDestinations) -> bool {
        self.0 & other.0 != 0
    }

    fn without(self, other: RmiDestinations) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether a channel with the given locality passes the NoLocalCalls /
    /// NoRemoteCalls filters
    pub fn allows_locality(&self, is_local: bool) -> bool {
        if is_local {
            !self.contains(RmiDestinations::NO_LOCAL_CALLS)
        } else {
            !self.contains(RmiDestinations::NO_REMOTE_CALLS)
        }
    }
}

impl BitOr for RmiDestinations {
    type Output = RmiDestinations;

    fn bitor(self, rhs: RmiDestinations) -> RmiDestinations {
        RmiDestinations(self.0 | rhs.0)
    }
}

/// Why a call was dropped before reaching any channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RmiRejection {
    /// ToClientChannel without a valid channel
    NoChannel,
    /// ToClientChannel and ToOwnClient both requested
    OwnClientAndChannel,
    /// ToOwnClient on an object that no client owns
    NoOwnClient,
}

/// What `invoke_rmi` did with a call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RmiInvokeReport {
    pub rejected: Option<RmiRejection>,
    pub to_server: bool,
    pub channels: Vec<ChannelId>,
}

impl RmiInvokeReport {
    fn rejected(rejection: RmiRejection) -> Self {
        Self {
            rejected: Some(rejection),
            ..Default::default()
        }
    }

    pub fn dispatch_count(&self) -> usize {
        self.channels.len() + usize::from(self.to_server)
    }
}

/// The server's live channels, as far as call fan-out is concerned
pub trait RmiChannelSet {
    fn channel_ids(&self) -> Vec<ChannelId>;

    /// The transport of a channel, or None while it has none (on hold)
    fn net_channel(&mut self, channel_id: ChannelId) -> Option<&mut dyn NetChannel>;
}

/// Sends `body` to every destination `destinations` selects.
///
/// `channel` is the explicit target channel, `own_channel` the channel of
/// the client that owns the object (0 if none). `client` is this process's
/// connection to a server, `server` its set of client connections.
pub fn invoke_rmi(
    body: &RmiBody,
    destinations: RmiDestinations,
    channel: Option<ChannelId>,
    own_channel: ChannelId,
    client: Option<&mut dyn NetChannel>,
    server: Option<&mut dyn RmiChannelSet>,
) -> RmiInvokeReport {
    let mut destinations = destinations;
    let mut channel = channel.filter(|id| *id != 0);

    if destinations.contains(RmiDestinations::TO_CLIENT_CHANNEL) {
        if channel.is_none() {
            warn!("InvokeRMI: ToClientChannel specified, but no channel specified");
            return RmiInvokeReport::rejected(RmiRejection::NoChannel);
        }
        if destinations.contains(RmiDestinations::TO_OWN_CLIENT) {
            warn!("InvokeRMI: ToOwnClient and ToClientChannel specified - not supported");
            return RmiInvokeReport::rejected(RmiRejection::OwnClientAndChannel);
        }
    }

    if destinations.contains(RmiDestinations::TO_OWN_CLIENT) {
        if own_channel == 0 {
            warn!("InvokeRMI: ToOwnClient specified, but no own client");
            return RmiInvokeReport::rejected(RmiRejection::NoOwnClient);
        }
        destinations = destinations.without(RmiDestinations::TO_OWN_CLIENT)
            | RmiDestinations::TO_CLIENT_CHANNEL;
        channel = Some(own_channel);
    }

    if destinations.contains(RmiDestinations::TO_ALL_CLIENTS) {
        destinations = destinations.without(RmiDestinations::TO_ALL_CLIENTS)
            | RmiDestinations::TO_OTHER_CLIENTS;
        channel = None;
    }

    let mut report = RmiInvokeReport::default();

    if destinations.contains(RmiDestinations::TO_SERVER) {
        if let Some(client) = client {
            if destinations.allows_locality(client.is_local()) {
                client.dispatch_rmi(body);
                report.to_server = true;
            }
        }
        if !report.to_server {
            warn!("InvokeRMI: Call to server requested but nothing was called");
        }
    }

    if destinations
        .intersects(RmiDestinations::TO_CLIENT_CHANNEL | RmiDestinations::TO_OTHER_CLIENTS)
    {
        let Some(server) = server else {
            warn!("InvokeRMI: Call to clients requested but we are not a server");
            return report;
        };

        for channel_id in server.channel_ids() {
            let is_target = channel == Some(channel_id);
            if is_target && !destinations.contains(RmiDestinations::TO_CLIENT_CHANNEL) {
                continue;
            }
            if !is_target && !destinations.contains(RmiDestinations::TO_OTHER_CLIENTS) {
                continue;
            }
            let Some(net_channel) = server.net_channel(channel_id) else {
                continue;
            };
            if !destinations.allows_locality(net_channel.is_local()) {
                continue;
            }
            net_channel.dispatch_rmi(body);
            report.channels.push(channel_id);
        }
    }

    report
}
