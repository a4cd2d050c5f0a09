use std::time::{Duration, Instant};

use log::info;

use crate::{
    establishment::{
        ContextViewState, EstablishmentError, EstablishmentTask, FnTask, LevelLoadTask, SendTokens,
        TaskResult, WaitValue,
    },
    game_context::{
        context_message::ContextMessage,
        game_context::{GameContext, LoadFlags},
        game_world::{ActionEvent, FakeSpawn, GameWorld},
        host::{DynHost, HostEstablisher, HostTask},
    },
    net_channel::EstablishChannel,
    types::ChannelId,
};

/// Action event a joining client broadcasts once it is in game
pub const BROADCAST_IN_GAME: i32 = 4;

fn task<F: FnMut(&mut DynHost) -> TaskResult + 'static>(name: &str, step: F) -> HostTask {
    Box::new(FnTask::new(name, step))
}

fn world_task<F: FnMut(&mut dyn GameWorld) + 'static>(name: &str, mut step: F) -> HostTask {
    task(name, move |host| {
        step(host.context().world_mut());
        TaskResult::Ok
    })
}

fn channel_task<F>(name: &str, channel_id: ChannelId, mut step: F) -> HostTask
where
    F: FnMut(&mut GameContext, &mut dyn EstablishChannel) -> TaskResult + 'static,
{
    task(name, move |host| match host.context_and_channel(channel_id) {
        (context, Some(channel)) => step(context, channel),
        (_, None) => TaskResult::Failed(EstablishmentError::ChannelLost { channel_id }),
    })
}

fn action_event(event: ActionEvent) -> HostTask {
    world_task("ActionEvent", move |world| world.action_event(event))
}

fn established_context(token: u32) -> HostTask {
    task("EstablishedContext", move |host| {
        host.context().set_established_token(token);
        TaskResult::Ok
    })
}

fn set_in_level_load(name: &str, value: bool) -> HostTask {
    task(name, move |host| {
        host.context().set_in_level_load(value);
        TaskResult::Ok
    })
}

fn pause_game(pause: bool) -> HostTask {
    world_task("PauseGame", move |world| world.pause_game(pause))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingState {
    WaitForPending,
    WaitUntilConnected,
}

/// Holds a starting server back while clients are still connecting, so
/// they can join before the level loads
struct WaitForPendingConnections {
    state: PendingState,
    started: Option<Instant>,
    previous_channels: usize,
    wait: Duration,
    extension: Duration,
}

impl WaitForPendingConnections {
    fn new(wait: Duration, extension: Duration) -> Self {
        Self {
            state: PendingState::WaitForPending,
            started: None,
            previous_channels: 0,
            wait,
            extension,
        }
    }
}

impl EstablishmentTask<DynHost> for WaitForPendingConnections {
    fn name(&self) -> &str {
        "WaitForPendingConnections"
    }

    fn step(&mut self, host: &mut DynHost) -> TaskResult {
        let now = host.now();
        let elapsed = now.duration_since(*self.started.get_or_insert(now));
        let has_pending = host.pending_connections() > 0;

        match self.state {
            PendingState::WaitForPending => {
                if has_pending {
                    self.state = PendingState::WaitUntilConnected;
                }
            }
            PendingState::WaitUntilConnected => {
                let expected = host.context().world().expected_clients();
                let channels = host.channel_count();
                if channels > self.previous_channels {
                    self.previous_channels = channels;
                    self.wait = self.wait.max(elapsed + self.extension);
                }
                if channels >= expected && !has_pending {
                    return TaskResult::Ok;
                }
            }
        }

        if elapsed < self.wait {
            TaskResult::Wait
        } else {
            info!(
                "Waited more than {:.1}s for pending connections, continuing",
                self.wait.as_secs_f32()
            );
            TaskResult::Ok
        }
    }
}

/// Tasks run once per context, before any channel is established
pub fn init_global_establishment_tasks(
    context: &GameContext,
    establisher: &mut HostEstablisher,
    token: u32,
) {
    establisher.add_task(
        ContextViewState::Begin,
        task("GameNotStarted", |host| {
            host.context().set_started(false);
            TaskResult::Ok
        }),
    );

    let config = context.config();
    if context.is_server() && !config.pending_connection_wait.is_zero() {
        establisher.add_task(
            ContextViewState::Begin,
            Box::new(WaitForPendingConnections::new(
                config.pending_connection_wait,
                config.pending_connection_extension,
            )),
        );
    }

    if context.is_editor() {
        establisher.add_task(ContextViewState::EstablishContext, established_context(token));
        establisher.add_task(
            ContextViewState::EstablishContext,
            world_task("FakeSpawn", |world| world.fake_spawn(FakeSpawn::All, false)),
        );
    } else if context.is_server() {
        let flags = context.load_flags();
        add_load_level_tasks(context, establisher, flags, token, false);
        if context.is_dedicated() || !context.is_client() {
            add_loading_complete_tasks(context, establisher, flags, false, None);
        }
        establisher.add_task(
            ContextViewState::InGame,
            world_task("GameplayStart", |world| world.gameplay_start()),
        );
    }
}

fn add_load_level_tasks(
    context: &GameContext,
    establisher: &mut HostEstablisher,
    flags: LoadFlags,
    token: u32,
    migrating: bool,
) {
    if migrating {
        return;
    }

    if context.is_client() && !flags.load_new_level {
        establisher.add_task(ContextViewState::Begin, action_event(ActionEvent::ResetBegin));
        establisher.add_task(ContextViewState::Begin, action_event(ActionEvent::ResetProgress(0)));
    }
    if flags.level_loaded {
        let loading_new_level = flags.load_new_level;
        establisher.add_task(
            ContextViewState::Begin,
            world_task("RandomSystemReset", move |world| {
                world.random_system_reset(loading_new_level)
            }),
        );
    }
    if flags.load_new_level {
        establisher.add_task(
            ContextViewState::Begin,
            task("PrepareLevelLoad", |host| {
                let context = host.context();
                let level = context.level().to_string();
                context.world_mut().prepare_level_load(&level);
                TaskResult::Ok
            }),
        );
    }
    if flags.level_loaded {
        let skip_game_rules = !flags.load_new_level;
        establisher.add_task(
            ContextViewState::Begin,
            world_task("EntitySystemReset", move |world| {
                world.entity_system_reset(skip_game_rules)
            }),
        );
    }
    if flags.load_new_level {
        establisher.add_task(
            ContextViewState::Begin,
            world_task("ClearPlayerIds", |world| world.clear_player_ids()),
        );
    }

    establisher.add_task(
        ContextViewState::EstablishContext,
        set_in_level_load("BeginLevelLoad", true),
    );
    if flags.load_new_level {
        establisher.add_task(
            ContextViewState::EstablishContext,
            Box::new(LevelLoadTask::new(context.level_loader(), context.level())),
        );
    } else {
        establisher.add_task(
            ContextViewState::EstablishContext,
            world_task("FakeSpawn", |world| world.fake_spawn(FakeSpawn::GameRules, true)),
        );
        establisher.add_task(
            ContextViewState::EstablishContext,
            world_task("LoadLevelEntities", |world| world.load_level_entities()),
        );
    }
    if !context.is_editor() {
        establisher.add_task(
            ContextViewState::EstablishContext,
            world_task("ResetAreas", |world| world.reset_areas()),
        );
    }
    establisher.add_task(
        ContextViewState::EstablishContext,
        set_in_level_load("EndLevelLoad", false),
    );
    establisher.add_task(ContextViewState::EstablishContext, established_context(token));
}

fn add_loading_complete_tasks(
    context: &GameContext,
    establisher: &mut HostEstablisher,
    flags: LoadFlags,
    migrating: bool,
    client_channel: Option<ChannelId>,
) {
    if context.is_server() && !migrating {
        establisher.add_task(ContextViewState::Begin, pause_game(true));
    }

    if !migrating {
        if flags.load_new_level {
            establisher.add_task(
                ContextViewState::InGame,
                world_task("StartLevel", |world| world.start_level()),
            );
        }
        if !context.is_editor() {
            establisher.add_task(
                ContextViewState::InGame,
                world_task("ResetAreas", |world| world.reset_areas()),
            );
        }
        if !flags.load_new_level {
            establisher.add_task(
                ContextViewState::InGame,
                world_task("GameRulesReset", |world| world.game_rules_reset()),
            );
        }
        if !context.is_editor() && flags.load_new_level {
            establisher.add_task(
                ContextViewState::InGame,
                world_task("LoadingComplete", |world| world.loading_complete()),
            );
        }
        if context.is_server() {
            establisher.add_task(ContextViewState::InGame, pause_game(false));
        }
    }

    establisher.add_task(
        ContextViewState::InGame,
        task("WaitForPrecachingToFinish", |host| {
            let context = host.context();
            if context.world().is_precaching_done() {
                context.set_started(true);
                TaskResult::Ok
            } else {
                TaskResult::Wait
            }
        }),
    );

    if let (false, Some(channel_id)) = (migrating, client_channel) {
        establisher.add_task(ContextViewState::InGame, update_level_loaded(channel_id));
    }
}

fn update_level_loaded(channel_id: ChannelId) -> HostTask {
    channel_task("UpdateLevelLoaded", channel_id, |_, channel| {
        channel.set_level_loaded(true);
        TaskResult::Ok
    })
}

/// Tasks that bring one channel into the game. Run after the global tasks
/// have established the context.
pub fn init_channel_establishment_tasks(
    context: &mut GameContext,
    channel: &dyn EstablishChannel,
    establisher: &mut HostEstablisher,
    token: u32,
) {
    // Local channels of a dedicated server only record demos
    if context.is_dedicated() && channel.is_local() {
        return;
    }

    let channel_id = channel.channel_id();
    let is_local = channel.is_local();
    let is_server = channel.is_server_channel();
    let is_client = !is_server;
    let level_loaded = channel.level_loaded();
    let migrating = channel.is_migrating();
    let is_reset = context.take_reset_channel(channel_id) && level_loaded;
    let flags = LoadFlags {
        level_loaded,
        load_new_level: !is_reset,
    };
    let sync_class_registry = context.config().sync_class_registry;

    if sync_class_registry && is_server && !is_reset && !level_loaded {
        establisher.add_task(
            ContextViewState::Begin,
            task("RegisterAllClasses", |host| {
                let context = host.context();
                for class in context.world().entity_classes() {
                    context.class_registry_mut().register(&class);
                }
                TaskResult::Ok
            }),
        );
    }

    if is_server && !is_local && !is_reset {
        let tokens = SendTokens::new();
        if !level_loaded {
            let registration_tokens = tokens.clone();
            let registration = if sync_class_registry {
                channel_task("SendClassRegistration", channel_id, move |context, channel| {
                    let table = context.class_registry().table();
                    registration_tokens.record(channel.send(ContextMessage::ClassRegistration(table)));
                    TaskResult::Ok
                })
            } else {
                channel_task("SendClassHashRegistration", channel_id, move |context, channel| {
                    let hash = context.class_registry().hash();
                    registration_tokens.record(channel.send(ContextMessage::ClassHash(hash)));
                    TaskResult::Ok
                })
            };
            establisher.add_task(ContextViewState::Begin, registration);
        }
        if !migrating {
            establisher.add_task(
                ContextViewState::Begin,
                channel_task("SendGameType", channel_id, move |context, channel| {
                    if !tokens.all_acknowledged(|handle| channel.is_acknowledged(handle)) {
                        return TaskResult::Wait;
                    }
                    channel.send(ContextMessage::GameType {
                        rules: context.world().game_rules(),
                        level: context.level().to_string(),
                        load_new_level: flags.load_new_level,
                    });
                    TaskResult::Ok
                }),
            );
        }
    }

    establisher.add_task(
        ContextViewState::Begin,
        channel_task("WaitForFileSync", channel_id, |_, channel| {
            if channel.is_file_sync_complete() {
                TaskResult::Ok
            } else {
                TaskResult::Wait
            }
        }),
    );

    if is_client {
        establisher.add_task(
            ContextViewState::Begin,
            channel_task("ClientTimeSync", channel_id, |_, channel| {
                if channel.is_time_synced() {
                    TaskResult::Ok
                } else {
                    TaskResult::Wait
                }
            }),
        );
    }

    if is_server {
        if context.is_editor() {
            establisher.add_task(
                ContextViewState::PostSpawnEntities,
                Box::new(
                    WaitValue::new("WaitForAllowSendClientConnect", |host: &mut DynHost| {
                        host.context().allow_send_client_connect()
                    })
                    .with_soft_deadline(context.config().allow_connect_deadline),
                ),
            );
        }
        establisher.add_task(
            ContextViewState::PostSpawnEntities,
            channel_task("OnClientConnect", channel_id, move |context, channel| {
                match context.world_mut().on_client_connect(channel_id, is_reset) {
                    Some(actor) => {
                        channel.set_player_id(actor);
                        TaskResult::Ok
                    }
                    None => TaskResult::Failed(EstablishmentError::ClientRejected { channel_id }),
                }
            }),
        );
        establisher.add_task(
            ContextViewState::InGame,
            task("OnClientEnteredGame", move |host| {
                if host
                    .context()
                    .world_mut()
                    .on_client_entered_game(channel_id, is_reset)
                {
                    TaskResult::Ok
                } else {
                    TaskResult::Failed(EstablishmentError::ClientRejected { channel_id })
                }
            }),
        );
        if channel.is_on_hold() {
            establisher.add_task(
                ContextViewState::InGame,
                channel_task("ClearOnHold", channel_id, |_, channel| {
                    channel.clear_on_hold();
                    TaskResult::Ok
                }),
            );
        }
        establisher.add_task(
            ContextViewState::InGame,
            channel_task("DelegateAuthorityToClientActor", channel_id, move |context, channel| {
                context
                    .world_mut()
                    .delegate_authority(channel_id, channel.player_id());
                TaskResult::Ok
            }),
        );
    }

    if is_client && !context.is_server() {
        add_load_level_tasks(context, establisher, flags, token, migrating);
    }
    if is_client {
        add_loading_complete_tasks(context, establisher, flags, migrating, Some(channel_id));
    }
    if is_client && !context.is_server() {
        establisher.add_task(
            ContextViewState::InGame,
            world_task("GameplayStart", |world| world.gameplay_start()),
        );
    }

    if is_client {
        if is_reset {
            let first = ContextViewState::EstablishContext as usize;
            let last = ContextViewState::PostSpawnEntities as usize;
            for milestone in first..last {
                let percent = (100 * (milestone - first) / (last - first)) as u8;
                establisher.add_task(
                    ContextViewState::Begin,
                    action_event(ActionEvent::ResetProgress(percent)),
                );
            }
            establisher.add_task(ContextViewState::InGame, action_event(ActionEvent::ResetEnd));
        } else {
            establisher.add_task(
                ContextViewState::InGame,
                task("BroadcastInGame", |host| {
                    host.context().set_broadcast_action_event_in_game(BROADCAST_IN_GAME);
                    TaskResult::Ok
                }),
            );
        }
    }

    if context.is_editor() && context.is_server() {
        establisher.add_task(ContextViewState::Begin, pause_game(false));
    }

    if is_server {
        establisher.add_task(ContextViewState::InGame, update_level_loaded(channel_id));
    }
}
