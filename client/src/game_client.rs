use std::{sync::Arc, time::Instant};

use log::{info, warn};

use actnet_shared::{
    establishment::{Clock, EstablisherStatus, EstablishmentError, LevelLoader},
    extension::ExtensionRegistry,
    game_context::{
        init_channel_establishment_tasks, ContextMessage, EstablishmentHost, GameContext,
        GameWorld, HostEstablisher,
    },
    rmi::{invoke_rmi, RmiBody, RmiDestinations, RmiInvokeReport},
    ChannelId, DisconnectCause, EstablishChannel, NetChannel,
};

use crate::{client_channel::ClientChannel, client_config::ClientConfig, error::ClientError};

/// Things that happened during `GameClient::update`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    InGame,
    /// Establishment failed and the client disconnected
    EstablishmentFailed {
        task: String,
        cause: EstablishmentError,
    },
}

struct ClientCore {
    context: GameContext,
    channel: Option<ClientChannel>,
    now: Instant,
}

impl Clock for ClientCore {
    fn now(&self) -> Instant {
        self.now
    }
}

impl EstablishmentHost for ClientCore {
    fn context(&mut self) -> &mut GameContext {
        &mut self.context
    }

    fn context_and_channel(
        &mut self,
        channel_id: ChannelId,
    ) -> (&mut GameContext, Option<&mut dyn EstablishChannel>) {
        let channel: Option<&mut dyn EstablishChannel> = match self.channel.as_mut() {
            Some(channel) if channel.channel_id() == channel_id => Some(channel),
            _ => None,
        };
        (&mut self.context, channel)
    }

    fn channel_count(&self) -> usize {
        usize::from(self.channel.is_some())
    }
}

/// The client session: checks the server's class registry and runs the
/// channel's establishment pipeline each time the server sends a game type
pub struct GameClient {
    core: ClientCore,
    establisher: Option<HostEstablisher>,
    game_rules: Option<String>,
    in_game: bool,
    next_token: u32,
}

impl GameClient {
    pub fn new(
        config: ClientConfig,
        world: Box<dyn GameWorld>,
        level_loader: Arc<dyn LevelLoader>,
        extensions: Arc<ExtensionRegistry>,
        now: Instant,
    ) -> Self {
        let mut context = GameContext::new(config.context, false, true, world, level_loader, extensions);
        for class in context.world().entity_classes() {
            context.class_registry_mut().register(&class);
        }

        Self {
            core: ClientCore {
                context,
                channel: None,
                now,
            },
            establisher: None,
            game_rules: None,
            in_game: false,
            next_token: 0,
        }
    }

    /// Attaches the connection to the server
    pub fn connect(&mut self, link: Box<dyn NetChannel>) -> Result<ChannelId, ClientError> {
        if let Some(channel) = self.core.channel.as_ref() {
            return Err(ClientError::AlreadyConnected {
                channel_id: channel.channel_id(),
            });
        }
        let channel = ClientChannel::new(link);
        let channel_id = channel.channel_id();
        info!("Connected to server on channel {}", channel_id);
        self.core.channel = Some(channel);
        Ok(channel_id)
    }

    pub fn is_connected(&self) -> bool {
        self.core.channel.is_some()
    }

    pub fn is_in_game(&self) -> bool {
        self.in_game
    }

    /// Handles a handshake message from the server. A class registry that
    /// doesn't match ours disconnects with `ContextCorruption`.
    pub fn receive(&mut self, message: ContextMessage, now: Instant) -> Result<(), ClientError> {
        self.core.now = now;
        let Some(channel_id) = self.core.channel.as_ref().map(|channel| channel.channel_id()) else {
            return Err(ClientError::NotConnected);
        };

        match message {
            ContextMessage::ClassHash(hash) => {
                let result = self.core.context.class_registry().check_hash(hash);
                self.check_registry(result)
            }
            ContextMessage::ClassRegistration(table) => {
                let result = self
                    .core
                    .context
                    .class_registry_mut()
                    .apply_remote_table(&table);
                self.check_registry(result)
            }
            ContextMessage::GameType {
                rules,
                level,
                load_new_level,
            } => {
                info!("Server is playing '{}' on '{}'", rules, level);
                let context = &mut self.core.context;
                if load_new_level || context.level() != level {
                    context.change_level(&level);
                } else {
                    context.reset_channel(channel_id);
                }
                self.game_rules = Some(rules);
                self.build_pipeline();
                Ok(())
            }
        }
    }

    fn check_registry(&mut self, result: Result<(), EstablishmentError>) -> Result<(), ClientError> {
        match result {
            Ok(()) => Ok(()),
            Err(cause) => {
                warn!("Server class registry doesn't match: {}", cause);
                self.disconnect(DisconnectCause::ContextCorruption, &cause.to_string());
                Err(ClientError::ContextCorruption { cause })
            }
        }
    }

    fn build_pipeline(&mut self) {
        let core = &mut self.core;
        let Some(channel) = core.channel.as_ref() else {
            return;
        };
        self.next_token += 1;
        let mut establisher = HostEstablisher::new();
        init_channel_establishment_tasks(&mut core.context, channel, &mut establisher, self.next_token);
        self.establisher = Some(establisher);
        self.in_game = false;
    }

    /// Steps the establishment pipeline once
    pub fn update(&mut self, now: Instant) -> Vec<ClientEvent> {
        self.core.now = now;
        let mut events = Vec::new();

        let Some(establisher) = self.establisher.as_mut() else {
            return events;
        };
        match establisher.step(&mut self.core) {
            EstablisherStatus::Working(_) => {}
            EstablisherStatus::Done => {
                info!("Client is in game");
                self.establisher = None;
                self.in_game = true;
                events.push(ClientEvent::InGame);
            }
            EstablisherStatus::Failed { task, cause } => {
                self.disconnect(cause.disconnect_cause(), &cause.to_string());
                events.push(ClientEvent::EstablishmentFailed { task, cause });
            }
        }

        events
    }

    /// Closes the connection and drops any unfinished establishment
    pub fn disconnect(&mut self, cause: DisconnectCause, reason: &str) {
        if let Some(mut channel) = self.core.channel.take() {
            info!("Disconnecting from server ({}: {})", cause, reason);
            channel.disconnect(cause, reason);
        }
        self.establisher = None;
        self.in_game = false;
    }

    /// Sends a call to the server
    pub fn invoke_rmi(&mut self, body: &RmiBody, destinations: RmiDestinations) -> RmiInvokeReport {
        let client: Option<&mut dyn NetChannel> = match self.core.channel.as_mut() {
            Some(channel) => Some(channel),
            None => None,
        };
        invoke_rmi(body, destinations, None, 0, client, None)
    }

    pub fn channel(&self) -> Option<&ClientChannel> {
        self.core.channel.as_ref()
    }

    pub fn channel_mut(&mut self) -> Option<&mut ClientChannel> {
        self.core.channel.as_mut()
    }

    /// Rules class name from the last game type the server sent
    pub fn game_rules(&self) -> Option<&str> {
        self.game_rules.as_deref()
    }

    pub fn context(&self) -> &GameContext {
        &self.core.context
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.core.context
    }
}
