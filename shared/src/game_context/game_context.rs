use std::{collections::HashSet, sync::Arc};

use log::info;

use crate::{
    aspect::{AspectRegistry, AspectSerializer},
    config::{ContextConfig, SchedulingProfileTable},
    establishment::LevelLoader,
    extension::ExtensionRegistry,
    game_context::{class_registry::ClassRegistry, game_world::GameWorld},
    rmi::RmiDispatcher,
    types::ChannelId,
};

/// What establishment has to do about the level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadFlags {
    /// A level is already loaded
    pub level_loaded: bool,
    /// A (possibly different) level has to be loaded
    pub load_new_level: bool,
}

impl LoadFlags {
    /// Nothing loaded yet
    pub const NEW_LEVEL: LoadFlags = LoadFlags {
        level_loaded: false,
        load_new_level: true,
    };

    /// Reset the already loaded level in place
    pub const RESET: LoadFlags = LoadFlags {
        level_loaded: true,
        load_new_level: false,
    };

    /// Whether establishment goes down the reset path
    pub fn is_reset(&self) -> bool {
        self.level_loaded && !self.load_new_level
    }
}

/// The root of one game session: roles, level state, and the registries
/// every networked object shares
pub struct GameContext {
    config: ContextConfig,
    is_server: bool,
    is_client: bool,
    level: String,
    load_flags: LoadFlags,

    started: bool,
    in_level_load: bool,
    allow_send_client_connect: bool,
    broadcast_action_event_in_game: i32,
    established_token: Option<u32>,
    reset_channels: HashSet<ChannelId>,

    class_registry: ClassRegistry,
    aspects: AspectRegistry,
    rmi: RmiDispatcher,
    aspect_serializer: AspectSerializer,
    extensions: Arc<ExtensionRegistry>,
    scheduling: SchedulingProfileTable,

    world: Box<dyn GameWorld>,
    level_loader: Arc<dyn LevelLoader>,
}

impl GameContext {
    pub fn new(
        config: ContextConfig,
        is_server: bool,
        is_client: bool,
        world: Box<dyn GameWorld>,
        level_loader: Arc<dyn LevelLoader>,
        extensions: Arc<ExtensionRegistry>,
    ) -> Self {
        let mut aspects = AspectRegistry::new();
        aspects.declare_default_aspects();

        Self {
            config,
            is_server,
            is_client,
            level: String::new(),
            load_flags: LoadFlags::NEW_LEVEL,
            started: false,
            in_level_load: false,
            allow_send_client_connect: false,
            broadcast_action_event_in_game: -1,
            established_token: None,
            reset_channels: HashSet::new(),
            class_registry: ClassRegistry::new(),
            aspects,
            rmi: RmiDispatcher::new(),
            aspect_serializer: AspectSerializer::new(),
            extensions,
            scheduling: SchedulingProfileTable::default(),
            world,
            level_loader,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn is_server(&self) -> bool {
        self.is_server
    }

    pub fn is_client(&self) -> bool {
        self.is_client
    }

    pub fn is_editor(&self) -> bool {
        self.config.editor
    }

    pub fn is_dedicated(&self) -> bool {
        self.config.dedicated
    }

    // Level

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn load_flags(&self) -> LoadFlags {
        self.load_flags
    }

    /// Starts a new level; the next establishment loads it from scratch
    pub fn change_level(&mut self, level: &str) {
        info!("Changing level to '{}'", level);
        self.level = level.to_string();
        self.load_flags = LoadFlags {
            level_loaded: self.established_token.is_some(),
            load_new_level: true,
        };
    }

    pub fn set_load_flags(&mut self, flags: LoadFlags) {
        self.load_flags = flags;
    }

    /// Marks a channel so its next establishment resets the loaded level
    /// instead of loading a new one
    pub fn reset_channel(&mut self, channel_id: ChannelId) {
        self.reset_channels.insert(channel_id);
    }

    pub(crate) fn take_reset_channel(&mut self, channel_id: ChannelId) -> bool {
        self.reset_channels.remove(&channel_id)
    }

    // Values set by establishment tasks

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub(crate) fn set_started(&mut self, started: bool) {
        self.started = started;
    }

    pub fn is_in_level_load(&self) -> bool {
        self.in_level_load
    }

    pub(crate) fn set_in_level_load(&mut self, in_level_load: bool) {
        self.in_level_load = in_level_load;
    }

    pub fn allow_send_client_connect(&self) -> bool {
        self.allow_send_client_connect
    }

    pub fn set_allow_send_client_connect(&mut self, allow: bool) {
        self.allow_send_client_connect = allow;
    }

    /// The action event broadcast once a client is in game, -1 for none
    pub fn broadcast_action_event_in_game(&self) -> i32 {
        self.broadcast_action_event_in_game
    }

    pub(crate) fn set_broadcast_action_event_in_game(&mut self, event: i32) {
        self.broadcast_action_event_in_game = event;
    }

    pub fn established_token(&self) -> Option<u32> {
        self.established_token
    }

    pub(crate) fn set_established_token(&mut self, token: u32) {
        self.established_token = Some(token);
    }

    // Shared registries

    pub fn class_registry(&self) -> &ClassRegistry {
        &self.class_registry
    }

    pub fn class_registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.class_registry
    }

    pub fn aspects(&self) -> &AspectRegistry {
        &self.aspects
    }

    pub fn rmi(&self) -> &RmiDispatcher {
        &self.rmi
    }

    pub fn rmi_mut(&mut self) -> &mut RmiDispatcher {
        &mut self.rmi
    }

    pub fn aspect_serializer_mut(&mut self) -> &mut AspectSerializer {
        &mut self.aspect_serializer
    }

    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    pub fn scheduling(&self) -> &SchedulingProfileTable {
        &self.scheduling
    }

    pub fn set_scheduling(&mut self, scheduling: SchedulingProfileTable) {
        self.scheduling = scheduling;
    }

    pub fn world(&self) -> &dyn GameWorld {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> &mut dyn GameWorld {
        self.world.as_mut()
    }

    pub fn level_loader(&self) -> Arc<dyn LevelLoader> {
        self.level_loader.clone()
    }
}
