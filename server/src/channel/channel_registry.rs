use std::{
    collections::HashMap,
    net::IpAddr,
    time::{Duration, Instant},
};

use log::{info, warn};

use actnet_shared::{
    rmi::RmiChannelSet, ChannelId, DisconnectCause, NetChannel, ProfileId, INVALID_CHANNEL_ID,
};

use crate::{
    ban_list::{BanList, BanStatus, BanTarget},
    channel::server_channel::ServerChannel,
    error::ServerError,
    listener::ServerListener,
};

/// Session handles carry the channel id in their low 16 bits
const SESSION_HANDLE_CHANNEL_MASK: u32 = 0x0000_ffff;

/// A client asking for a channel
pub struct ConnectRequest {
    /// Matchmaking session handle, if the client came through a lobby
    pub session_handle: Option<u32>,
    pub profile_id: Option<ProfileId>,
    pub address: Option<IpAddr>,
    pub link: Box<dyn NetChannel>,
}

/// What `ChannelRegistry::create_channel` did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelCreated {
    New(ChannelId),
    /// A held channel was handed back to its profile
    Rebound(ChannelId),
}

impl ChannelCreated {
    pub fn channel_id(&self) -> ChannelId {
        match self {
            ChannelCreated::New(channel_id) | ChannelCreated::Rebound(channel_id) => *channel_id,
        }
    }
}

/// What `ChannelRegistry::disconnect` did with the channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectOutcome {
    Held,
    Destroyed,
}

struct HeldChannel {
    channel: ServerChannel,
    since: Instant,
    cause: DisconnectCause,
    reason: String,
}

/// Live channels, channels held for a reconnect, and the ban list
pub struct ChannelRegistry {
    channels: HashMap<ChannelId, ServerChannel>,
    held: HashMap<ProfileId, HeldChannel>,
    bans: BanList,
    listeners: Vec<Box<dyn ServerListener>>,
    hold_grace_period: Option<Duration>,
    ban_timeout: Duration,
    next_channel_id: ChannelId,
}

impl ChannelRegistry {
    pub fn new(hold_grace_period: Option<Duration>, ban_timeout: Duration) -> Self {
        Self {
            channels: HashMap::new(),
            held: HashMap::new(),
            bans: BanList::new(),
            listeners: Vec::new(),
            hold_grace_period,
            ban_timeout,
            next_channel_id: INVALID_CHANNEL_ID,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn ServerListener>) {
        self.listeners.push(listener);
    }

    // Channels

    /// Turns a connection into a channel.
    ///
    /// Banned clients are refused before anything is built. A profile with a
    /// held channel gets that channel back, with its id and player.
    pub fn create_channel(
        &mut self,
        request: ConnectRequest,
        now: Instant,
    ) -> Result<ChannelCreated, ServerError> {
        let ConnectRequest {
            session_handle,
            profile_id,
            address,
            link,
        } = request;

        if let Some(target) = self.bans.check(profile_id, address, now) {
            info!("Refusing connection from banned {}", target);
            return Err(ServerError::Banned { target });
        }

        if let Some(held) = profile_id.and_then(|profile_id| self.held.remove(&profile_id)) {
            let mut channel = held.channel;
            let channel_id = channel.channel_id();
            channel.rebind(address, link);
            info!(
                "Profile {:?} reconnected, rebinding held channel {}",
                profile_id, channel_id
            );
            self.channels.insert(channel_id, channel);
            return Ok(ChannelCreated::Rebound(channel_id));
        }

        let channel_id = match session_handle {
            Some(handle) => {
                let channel_id = (handle & SESSION_HANDLE_CHANNEL_MASK) as ChannelId;
                if channel_id == INVALID_CHANNEL_ID {
                    self.allocate_channel_id()?
                } else if self.is_channel_id_in_use(channel_id) {
                    return Err(ServerError::ChannelIdInUse { channel_id });
                } else {
                    channel_id
                }
            }
            None => self.allocate_channel_id()?,
        };

        info!("Created channel {} for profile {:?}", channel_id, profile_id);
        self.channels.insert(
            channel_id,
            ServerChannel::new(channel_id, profile_id, address, link),
        );
        Ok(ChannelCreated::New(channel_id))
    }

    fn is_channel_id_in_use(&self, channel_id: ChannelId) -> bool {
        self.channels.contains_key(&channel_id)
            || self
                .held
                .values()
                .any(|held| held.channel.channel_id() == channel_id)
    }

    fn allocate_channel_id(&mut self) -> Result<ChannelId, ServerError> {
        // one full wrap of the id space
        for _ in 0..=ChannelId::MAX {
            self.next_channel_id = self.next_channel_id.wrapping_add(1);
            let channel_id = self.next_channel_id;
            if channel_id != INVALID_CHANNEL_ID && !self.is_channel_id_in_use(channel_id) {
                return Ok(channel_id);
            }
        }
        warn!("Every channel id is live or held");
        Err(ServerError::ChannelIdsExhausted)
    }

    /// Closes a channel. It is held for its profile if a grace period is
    /// configured, the cause allows reconnecting, and a listener asks to keep
    /// the client. Otherwise it is destroyed and listeners are told.
    pub fn disconnect(
        &mut self,
        channel_id: ChannelId,
        cause: DisconnectCause,
        reason: &str,
        now: Instant,
    ) -> Result<DisconnectOutcome, ServerError> {
        let Some(mut channel) = self.channels.remove(&channel_id) else {
            return Err(ServerError::UnknownChannel { channel_id });
        };
        channel.disconnect(cause, reason);

        let hold_profile = match (self.hold_grace_period, channel.profile_id()) {
            (Some(_), Some(profile_id)) if cause.allows_reconnect() => {
                let mut keep = false;
                for listener in self.listeners.iter_mut() {
                    keep |= listener.should_keep_client(channel_id, cause);
                }
                keep.then_some(profile_id)
            }
            _ => None,
        };

        match hold_profile {
            Some(profile_id) => {
                info!(
                    "Holding channel {} for profile {} ({}: {})",
                    channel_id, profile_id, cause, reason
                );
                channel.hold();
                self.held.insert(
                    profile_id,
                    HeldChannel {
                        channel,
                        since: now,
                        cause,
                        reason: reason.to_string(),
                    },
                );
                Ok(DisconnectOutcome::Held)
            }
            None => {
                info!("Channel {} disconnected ({}: {})", channel_id, cause, reason);
                self.notify_disconnected(channel_id, cause, reason);
                Ok(DisconnectOutcome::Destroyed)
            }
        }
    }

    /// Drops held channels whose grace period ran out and returns their ids
    pub fn sweep_on_hold(&mut self, now: Instant) -> Vec<ChannelId> {
        let Some(grace) = self.hold_grace_period else {
            return Vec::new();
        };

        let expired: Vec<ProfileId> = self
            .held
            .iter()
            .filter(|(_, held)| now.saturating_duration_since(held.since) >= grace)
            .map(|(profile_id, _)| *profile_id)
            .collect();

        let mut swept = Vec::with_capacity(expired.len());
        for profile_id in expired {
            if let Some(held) = self.held.remove(&profile_id) {
                let channel_id = held.channel.channel_id();
                info!("Hold on channel {} expired", channel_id);
                self.notify_disconnected(channel_id, held.cause, &held.reason);
                swept.push(channel_id);
            }
        }
        swept
    }

    /// Drops every held channel
    pub fn reset_on_hold_channels(&mut self) {
        let held: Vec<HeldChannel> = self.held.drain().map(|(_, held)| held).collect();
        for held in held {
            self.notify_disconnected(held.channel.channel_id(), held.cause, &held.reason);
        }
    }

    pub fn is_channel_on_hold(&self, channel_id: ChannelId) -> bool {
        self.held
            .values()
            .any(|held| held.channel.channel_id() == channel_id)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    fn notify_disconnected(&mut self, channel_id: ChannelId, cause: DisconnectCause, reason: &str) {
        for listener in self.listeners.iter_mut() {
            listener.on_client_disconnected(channel_id, cause, reason);
        }
    }

    pub fn channel(&self, channel_id: ChannelId) -> Option<&ServerChannel> {
        self.channels.get(&channel_id)
    }

    pub fn channel_mut(&mut self, channel_id: ChannelId) -> Option<&mut ServerChannel> {
        self.channels.get_mut(&channel_id)
    }

    /// Live channel ids, sorted
    pub fn channel_ids(&self) -> Vec<ChannelId> {
        let mut channel_ids: Vec<ChannelId> = self.channels.keys().copied().collect();
        channel_ids.sort_unstable();
        channel_ids
    }

    /// The loopback channel to this process's own client
    pub fn local_channel_id(&self) -> Option<ChannelId> {
        self.channel_ids().into_iter().find(|channel_id| {
            self.channels
                .get(channel_id)
                .is_some_and(|channel| channel.is_local())
        })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    // Bans

    /// Bans the channel's profile, or its address when it has no profile,
    /// for the configured ban timeout, then disconnects it
    pub fn ban_player(
        &mut self,
        channel_id: ChannelId,
        reason: &str,
        now: Instant,
    ) -> Result<BanTarget, ServerError> {
        let Some(channel) = self.channels.get(&channel_id) else {
            return Err(ServerError::UnknownChannel { channel_id });
        };
        let target = match (channel.profile_id(), channel.address()) {
            (Some(profile_id), _) => BanTarget::Profile(profile_id),
            (None, Some(address)) => BanTarget::Address(address),
            (None, None) => return Err(ServerError::NoBanTarget { channel_id }),
        };

        self.bans.ban(target, self.ban_timeout, reason, now);
        self.disconnect(channel_id, DisconnectCause::Banned, reason, now)?;
        Ok(target)
    }

    /// Bans `target` without touching live channels
    pub fn ban(&mut self, target: BanTarget, duration: Duration, reason: &str, now: Instant) {
        if let BanTarget::Profile(profile_id) = target {
            if let Some(held) = self.held.remove(&profile_id) {
                self.notify_disconnected(held.channel.channel_id(), DisconnectCause::Banned, reason);
            }
        }
        self.bans.ban(target, duration, reason, now);
    }

    pub fn unban(&mut self, target: BanTarget) -> bool {
        let removed = self.bans.unban(target);
        if !removed {
            warn!("Can't unban {}, it isn't banned", target);
        }
        removed
    }

    pub fn banned_status(&mut self, now: Instant) -> Vec<BanStatus> {
        self.bans.status(now)
    }
}

impl RmiChannelSet for ChannelRegistry {
    fn channel_ids(&self) -> Vec<ChannelId> {
        ChannelRegistry::channel_ids(self)
    }

    fn net_channel(&mut self, channel_id: ChannelId) -> Option<&mut dyn NetChannel> {
        self.channels
            .get_mut(&channel_id)
            .and_then(|channel| channel.link_mut())
    }
}
