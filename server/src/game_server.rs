use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use log::{info, warn};

use actnet_shared::{
    establishment::{Clock, EstablisherStatus, EstablishmentError, LevelLoader},
    extension::ExtensionRegistry,
    game_context::{
        init_channel_establishment_tasks, init_global_establishment_tasks, EstablishmentHost,
        GameContext, GameWorld, HostEstablisher,
    },
    rmi::{invoke_rmi, RmiBody, RmiChannelSet, RmiDestinations, RmiInvokeReport},
    ChannelId, DisconnectCause, EstablishChannel,
};

use crate::{
    ban_list::{BanStatus, BanTarget},
    channel::{ChannelCreated, ChannelRegistry, ConnectRequest, DisconnectOutcome, ServerChannel},
    error::ServerError,
    listener::ServerListener,
    server_config::ServerConfig,
};

/// Things that happened during `GameServer::update`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    ContextEstablished,
    ContextFailed {
        task: String,
        cause: EstablishmentError,
    },
    ChannelEstablished {
        channel_id: ChannelId,
    },
    /// The channel's pipeline failed and the channel was disconnected
    ChannelFailed {
        channel_id: ChannelId,
        task: String,
        cause: EstablishmentError,
    },
    HoldExpired {
        channel_id: ChannelId,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GlobalState {
    Idle,
    Running,
    Established,
    Failed,
}

// What establishment tasks get to touch
struct ServerCore {
    context: GameContext,
    channels: ChannelRegistry,
    now: Instant,
    pending_connections: usize,
}

impl Clock for ServerCore {
    fn now(&self) -> Instant {
        self.now
    }
}

impl EstablishmentHost for ServerCore {
    fn context(&mut self) -> &mut GameContext {
        &mut self.context
    }

    fn context_and_channel(
        &mut self,
        channel_id: ChannelId,
    ) -> (&mut GameContext, Option<&mut dyn EstablishChannel>) {
        let channel: Option<&mut dyn EstablishChannel> = match self.channels.channel_mut(channel_id) {
            Some(channel) => Some(channel),
            None => None,
        };
        (&mut self.context, channel)
    }

    fn pending_connections(&self) -> usize {
        self.pending_connections
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

/// The server session: owns the game context and the channel registry, and
/// steps one establishment pipeline for the context plus one per channel
pub struct GameServer {
    core: ServerCore,
    global: HostEstablisher,
    global_state: GlobalState,
    channel_establishers: HashMap<ChannelId, HostEstablisher>,
    context_token: u32,
    next_token: u32,
}

impl GameServer {
    pub fn new(
        config: ServerConfig,
        world: Box<dyn GameWorld>,
        level_loader: Arc<dyn LevelLoader>,
        extensions: Arc<ExtensionRegistry>,
        now: Instant,
    ) -> Self {
        let is_client = !config.context.dedicated;
        let mut context = GameContext::new(
            config.context,
            true,
            is_client,
            world,
            level_loader,
            extensions,
        );
        for class in context.world().entity_classes() {
            context.class_registry_mut().register(&class);
        }

        Self {
            core: ServerCore {
                context,
                channels: ChannelRegistry::new(config.hold_grace_period, config.ban_timeout),
                now,
                pending_connections: 0,
            },
            global: HostEstablisher::new(),
            global_state: GlobalState::Idle,
            channel_establishers: HashMap::new(),
            context_token: 0,
            next_token: 0,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn ServerListener>) {
        self.core.channels.add_listener(listener);
    }

    // Establishment

    /// Starts establishing `level`. Every live channel goes through its own
    /// pipeline again once the context is established.
    pub fn establish_context(&mut self, level: &str) {
        self.next_token += 1;
        self.context_token = self.next_token;
        info!("Establishing context for level '{}'", level);

        self.core.context.change_level(level);
        self.global = HostEstablisher::new();
        init_global_establishment_tasks(&self.core.context, &mut self.global, self.context_token);
        self.global_state = GlobalState::Running;

        self.channel_establishers.clear();
        for channel_id in self.core.channels.channel_ids() {
            self.build_channel_pipeline(channel_id);
        }
    }

    pub fn is_context_established(&self) -> bool {
        self.global_state == GlobalState::Established
    }

    /// Accepts a client. Its pipeline starts once the context is established.
    pub fn connect(
        &mut self,
        request: ConnectRequest,
        now: Instant,
    ) -> Result<ChannelCreated, ServerError> {
        self.core.now = now;
        let created = self.core.channels.create_channel(request, now)?;
        self.build_channel_pipeline(created.channel_id());
        Ok(created)
    }

    fn build_channel_pipeline(&mut self, channel_id: ChannelId) {
        let core = &mut self.core;
        let Some(channel) = core.channels.channel(channel_id) else {
            return;
        };
        let mut establisher = HostEstablisher::new();
        init_channel_establishment_tasks(
            &mut core.context,
            channel,
            &mut establisher,
            self.context_token,
        );
        self.channel_establishers.insert(channel_id, establisher);
    }

    /// Whether the channel's pipeline still has tasks to run
    pub fn is_channel_establishing(&self, channel_id: ChannelId) -> bool {
        self.channel_establishers.contains_key(&channel_id)
    }

    /// Steps every pipeline once, then sweeps expired holds
    pub fn update(&mut self, now: Instant) -> Vec<ServerEvent> {
        self.core.now = now;
        let mut events = Vec::new();

        if self.global_state == GlobalState::Running {
            match self.global.step(&mut self.core) {
                EstablisherStatus::Working(_) => {}
                EstablisherStatus::Done => {
                    info!("Context established");
                    self.global_state = GlobalState::Established;
                    events.push(ServerEvent::ContextEstablished);
                }
                EstablisherStatus::Failed { task, cause } => {
                    warn!("Context establishment failed in '{}': {}", task, cause);
                    self.global_state = GlobalState::Failed;
                    events.push(ServerEvent::ContextFailed { task, cause });
                }
            }
        }

        if self.global_state == GlobalState::Established {
            self.step_channels(now, &mut events);
        }

        for channel_id in self.core.channels.sweep_on_hold(now) {
            events.push(ServerEvent::HoldExpired { channel_id });
        }

        events
    }

    fn step_channels(&mut self, now: Instant, events: &mut Vec<ServerEvent>) {
        let mut channel_ids: Vec<ChannelId> = self.channel_establishers.keys().copied().collect();
        channel_ids.sort_unstable();

        for channel_id in channel_ids {
            let Some(establisher) = self.channel_establishers.get_mut(&channel_id) else {
                continue;
            };
            match establisher.step(&mut self.core) {
                EstablisherStatus::Working(_) => {}
                EstablisherStatus::Done => {
                    self.channel_establishers.remove(&channel_id);
                    info!("Channel {} is in game", channel_id);
                    events.push(ServerEvent::ChannelEstablished { channel_id });
                }
                EstablisherStatus::Failed { task, cause } => {
                    self.channel_establishers.remove(&channel_id);
                    let reason = cause.to_string();
                    if let Err(error) = self.core.channels.disconnect(
                        channel_id,
                        cause.disconnect_cause(),
                        &reason,
                        now,
                    ) {
                        warn!("Failed channel {} already gone: {}", channel_id, error);
                    }
                    events.push(ServerEvent::ChannelFailed {
                        channel_id,
                        task,
                        cause,
                    });
                }
            }
        }
    }

    /// Re-establishes a channel on the level it already has loaded
    pub fn reset_channel(&mut self, channel_id: ChannelId) -> Result<(), ServerError> {
        if self.core.channels.channel(channel_id).is_none() {
            return Err(ServerError::UnknownChannel { channel_id });
        }
        self.core.context.reset_channel(channel_id);
        self.build_channel_pipeline(channel_id);
        Ok(())
    }

    // Channels

    /// Disconnects a client. An unfinished pipeline is dropped.
    pub fn disconnect(
        &mut self,
        channel_id: ChannelId,
        cause: DisconnectCause,
        reason: &str,
        now: Instant,
    ) -> Result<DisconnectOutcome, ServerError> {
        self.core.now = now;
        self.channel_establishers.remove(&channel_id);
        self.core.channels.disconnect(channel_id, cause, reason, now)
    }

    pub fn is_channel_on_hold(&self, channel_id: ChannelId) -> bool {
        self.core.channels.is_channel_on_hold(channel_id)
    }

    pub fn reset_on_hold_channels(&mut self) {
        self.core.channels.reset_on_hold_channels();
    }

    pub fn channel(&self, channel_id: ChannelId) -> Option<&ServerChannel> {
        self.core.channels.channel(channel_id)
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.core.channels.channel_ids()
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.core.channels
    }

    /// Connections accepted by the transport but not yet turned into
    /// channels. A starting server waits for them.
    pub fn set_pending_connections(&mut self, pending: usize) {
        self.core.pending_connections = pending;
    }

    // Bans

    pub fn ban_player(
        &mut self,
        channel_id: ChannelId,
        reason: &str,
        now: Instant,
    ) -> Result<BanTarget, ServerError> {
        self.channel_establishers.remove(&channel_id);
        self.core.channels.ban_player(channel_id, reason, now)
    }

    pub fn ban(&mut self, target: BanTarget, duration: Duration, reason: &str, now: Instant) {
        self.core.channels.ban(target, duration, reason, now);
    }

    pub fn unban(&mut self, target: BanTarget) -> bool {
        self.core.channels.unban(target)
    }

    pub fn banned_status(&mut self, now: Instant) -> Vec<BanStatus> {
        self.core.channels.banned_status(now)
    }

    // RMI

    /// Sends a call to the clients `destinations` selects. `own_channel` is
    /// the channel of the client owning the object, 0 for none.
    pub fn invoke_rmi(
        &mut self,
        body: &RmiBody,
        destinations: RmiDestinations,
        channel: Option<ChannelId>,
        own_channel: ChannelId,
    ) -> RmiInvokeReport {
        let channels: &mut dyn RmiChannelSet = &mut self.core.channels;
        invoke_rmi(body, destinations, channel, own_channel, None, Some(channels))
    }

    // Context

    pub fn context(&self) -> &GameContext {
        &self.core.context
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.core.context
    }
}
