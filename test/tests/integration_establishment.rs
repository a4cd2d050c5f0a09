/// End-to-end context establishment between a GameServer and a GameClient
/// connected through loopback channels

use std::time::{Duration, Instant};

use actnet_client::{ClientError, ClientEvent};
use actnet_server::{ServerConfig, ServerEvent};
use actnet_shared::{
    config::ContextConfig,
    establishment::EstablishmentError,
    game_context::{ActionEvent, ContextMessage, FakeSpawn},
    DisconnectCause, EstablishChannel,
};
use actnet_test::{
    test_server_config, TestClient, TestLevelLoader, TestServer, WorldCall,
};

const CLASSES: &[&str] = &["Player", "Door", "Vehicle"];

fn established_server(now: Instant) -> TestServer {
    let mut server = TestServer::new(test_server_config(), CLASSES, TestLevelLoader::new(true));
    server.establish("harbor", now);
    server
}

#[test]
fn server_loads_level_once() {
    let now = Instant::now();
    let server = established_server(now);

    assert_eq!(server.loader.loaded_levels(), vec!["harbor".to_string()]);
    assert!(server.server.is_context_established());
    assert!(server.server.context().has_started());

    let calls = server.world.calls();
    assert!(calls.contains(&WorldCall::PrepareLevelLoad("harbor".to_string())));
    assert!(calls.contains(&WorldCall::StartLevel));
    assert!(calls.contains(&WorldCall::LoadingComplete));
    assert_eq!(calls.last(), Some(&WorldCall::GameplayStart));
    // paused while loading, resumed in game
    let pause = calls.iter().position(|call| *call == WorldCall::PauseGame(true));
    let resume = calls.iter().position(|call| *call == WorldCall::PauseGame(false));
    assert!(pause < resume);
}

#[test]
fn client_joins_through_handshake() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let now = Instant::now();
    let mut server = established_server(now);
    let (channel_id, link) = server.connect(Some(1), now);
    assert!(server.server.is_channel_establishing(channel_id));

    let event = server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));
    assert_eq!(event, Some(ServerEvent::ChannelEstablished { channel_id }));

    let channel = server.server.channel(channel_id).unwrap();
    assert!(channel.level_loaded());
    assert_eq!(channel.player_id(), 1000);
    let calls = server.world.calls();
    assert!(calls.contains(&WorldCall::ClientConnect(channel_id, false)));
    assert!(calls.contains(&WorldCall::ClientEnteredGame(channel_id, false)));
    assert!(calls.contains(&WorldCall::DelegateAuthority(channel_id, 1000)));

    let mut client = TestClient::new(channel_id, CLASSES, TestLevelLoader::new(true));
    assert_eq!(client.receive_from(&link, now), Ok(2));
    assert_eq!(client.client.game_rules(), Some("TeamInstantAction"));
    assert_eq!(client.run_until_event(now), Some(ClientEvent::InGame));

    assert_eq!(client.loader.loaded_levels(), vec!["harbor".to_string()]);
    assert_eq!(client.client.context().broadcast_action_event_in_game(), 4);
    assert!(client.world.calls().contains(&WorldCall::GameplayStart));
}

#[test]
fn game_type_waits_for_class_registration_ack() {
    let now = Instant::now();
    let mut server = established_server(now);
    let (channel_id, link) = server.connect(Some(1), now);
    link.set_manual_ack(true);

    for _ in 0..10 {
        assert!(server.server.update(now).is_empty());
    }
    assert!(server.server.is_channel_establishing(channel_id));
    let sent = link.take_sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(sent[0], ContextMessage::ClassHash(_)));

    link.acknowledge_all();
    let events = server.server.update(now);
    assert_eq!(events, vec![ServerEvent::ChannelEstablished { channel_id }]);
    assert!(matches!(
        link.take_sent().as_slice(),
        [ContextMessage::GameType {
            load_new_level: true,
            ..
        }]
    ));
}

#[test]
fn class_hash_mismatch_disconnects_client() {
    let now = Instant::now();
    let mut server = established_server(now);
    let (channel_id, link) = server.connect(Some(1), now);
    server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));

    let mut client = TestClient::new(channel_id, &["Player", "Vehicle", "Door"], TestLevelLoader::new(true));
    let result = client.receive_from(&link, now);
    assert!(matches!(
        result,
        Err(ClientError::ContextCorruption {
            cause: EstablishmentError::ClassRegistryMismatch { .. }
        })
    ));
    assert!(!client.client.is_connected());
    assert_eq!(client.link.disconnect_cause(), Some(DisconnectCause::ContextCorruption));
    assert!(client.loader.loaded_levels().is_empty());
}

#[test]
fn synced_class_registry_is_adopted() {
    let now = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            sync_class_registry: true,
            ..test_server_config().context
        },
        ..test_server_config()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.establish("harbor", now);
    let (channel_id, link) = server.connect(Some(1), now);
    server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));

    // same classes, different local order
    let mut client = TestClient::new(channel_id, &["Vehicle", "Door", "Player"], TestLevelLoader::new(true));
    assert_eq!(client.receive_from(&link, now), Ok(2));
    let registry = client.client.context().class_registry();
    assert_eq!(registry.id("Player"), Some(0));
    assert_eq!(registry.id("Vehicle"), Some(2));
    assert_eq!(client.run_until_event(now), Some(ClientEvent::InGame));
}

#[test]
fn synced_class_registry_with_unknown_class() {
    let now = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            sync_class_registry: true,
            ..test_server_config().context
        },
        ..test_server_config()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.establish("harbor", now);
    let (channel_id, link) = server.connect(Some(1), now);
    server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));

    let mut client = TestClient::new(channel_id, &["Player", "Door"], TestLevelLoader::new(true));
    assert_eq!(
        client.receive_from(&link, now),
        Err(ClientError::ContextCorruption {
            cause: EstablishmentError::UnknownClass {
                name: "Vehicle".to_string()
            }
        })
    );
}

#[test]
fn level_load_failure_fails_context() {
    let now = Instant::now();
    let mut server = TestServer::new(test_server_config(), CLASSES, TestLevelLoader::new(false));
    let (channel_id, link) = server.connect(Some(1), now);
    server.server.establish_context("harbor");

    let event = server.run_until(now, |event| matches!(event, ServerEvent::ContextFailed { .. }));
    assert_eq!(
        event,
        Some(ServerEvent::ContextFailed {
            task: "LoadLevel".to_string(),
            cause: EstablishmentError::LevelLoadFailed {
                level: "harbor".to_string()
            },
        })
    );
    assert!(!server.server.is_context_established());

    // channel pipelines never start
    for _ in 0..5 {
        assert!(server.server.update(now).is_empty());
    }
    assert!(server.server.is_channel_establishing(channel_id));
    assert_eq!(link.pending_count(), 0);
}

#[test]
fn client_level_load_failure() {
    let now = Instant::now();
    let mut server = established_server(now);
    let (channel_id, link) = server.connect(Some(1), now);
    server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));

    let mut client = TestClient::new(channel_id, CLASSES, TestLevelLoader::new(false));
    client.receive_from(&link, now).unwrap();
    let event = client.run_until_event(now);
    assert!(matches!(
        event,
        Some(ClientEvent::EstablishmentFailed {
            cause: EstablishmentError::LevelLoadFailed { .. },
            ..
        })
    ));
    assert_eq!(client.link.disconnect_cause(), Some(DisconnectCause::GameError));
}

#[test]
fn rejected_client_is_disconnected() {
    let now = Instant::now();
    let mut server = established_server(now);
    server.world.set_reject_clients(true);
    let (channel_id, link) = server.connect(Some(1), now);

    let event = server.run_until(now, |event| matches!(event, ServerEvent::ChannelFailed { .. }));
    assert_eq!(
        event,
        Some(ServerEvent::ChannelFailed {
            channel_id,
            task: "OnClientConnect".to_string(),
            cause: EstablishmentError::ClientRejected { channel_id },
        })
    );
    assert_eq!(link.disconnect_cause(), Some(DisconnectCause::GameError));
    assert!(server.server.channel(channel_id).is_none());
}

#[test]
fn reset_path_skips_level_load() {
    let now = Instant::now();
    let mut server = established_server(now);
    let (channel_id, link) = server.connect(Some(1), now);
    server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));

    let mut client = TestClient::new(channel_id, CLASSES, TestLevelLoader::new(true));
    client.receive_from(&link, now).unwrap();
    assert_eq!(client.run_until_event(now), Some(ClientEvent::InGame));
    client.world.clear_calls();

    client
        .client
        .receive(
            ContextMessage::GameType {
                rules: "TeamInstantAction".to_string(),
                level: "harbor".to_string(),
                load_new_level: false,
            },
            now,
        )
        .unwrap();
    assert_eq!(client.run_until_event(now), Some(ClientEvent::InGame));

    assert_eq!(client.loader.loaded_levels().len(), 1);
    let calls = client.world.calls();
    assert!(calls.contains(&WorldCall::EntitySystemReset(true)));
    assert!(calls.contains(&WorldCall::FakeSpawn(FakeSpawn::GameRules, true)));
    assert!(calls.contains(&WorldCall::LoadLevelEntities));
    assert!(calls.contains(&WorldCall::GameRulesReset));
    assert_eq!(calls.first(), Some(&WorldCall::ActionEvent(ActionEvent::ResetBegin)));
    assert!(calls.contains(&WorldCall::ActionEvent(ActionEvent::ResetEnd)));
    assert!(!calls.iter().any(|call| matches!(call, WorldCall::PrepareLevelLoad(_))));
    assert!(!calls.contains(&WorldCall::ClearPlayerIds));
    assert!(!calls.contains(&WorldCall::StartLevel));

    // the server side re-runs the join without resending the handshake
    server.world.clear_calls();
    server.server.reset_channel(channel_id).unwrap();
    let event = server.run_until(now, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));
    assert_eq!(event, Some(ServerEvent::ChannelEstablished { channel_id }));
    assert!(server.world.calls().contains(&WorldCall::ClientConnect(channel_id, true)));
    assert_eq!(link.pending_count(), 0);
}

#[test]
fn editor_connect_notification_soft_deadline() {
    let start = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            editor: true,
            allow_connect_deadline: Duration::from_secs(20),
            ..test_server_config().context
        },
        ..test_server_config()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.establish("sandbox", start);
    assert!(server.loader.loaded_levels().is_empty());
    assert!(server
        .world
        .calls()
        .contains(&WorldCall::FakeSpawn(FakeSpawn::All, false)));

    let (channel_id, _link) = server.connect(Some(1), start);
    assert!(server.server.update(start).is_empty());
    assert!(server.server.update(start + Duration::from_secs(19)).is_empty());
    assert_eq!(server.world.count(&WorldCall::ClientConnect(channel_id, false)), 0);

    let events = server.server.update(start + Duration::from_secs(20));
    assert_eq!(events, vec![ServerEvent::ChannelEstablished { channel_id }]);
}

#[test]
fn editor_connect_notification_allowed() {
    let start = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            editor: true,
            ..test_server_config().context
        },
        ..test_server_config()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.establish("sandbox", start);
    let (channel_id, _link) = server.connect(Some(1), start);
    assert!(server.server.update(start).is_empty());

    server.server.context_mut().set_allow_send_client_connect(true);
    let events = server.server.update(start);
    assert_eq!(events, vec![ServerEvent::ChannelEstablished { channel_id }]);
}

#[test]
fn default_server_does_not_wait_for_connections() {
    let start = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            dedicated: true,
            ..ContextConfig::default()
        },
        ..ServerConfig::default()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.server.establish_context("harbor");

    // the clock never moves, so no wait can run out
    let event = server.run_until(start, |event| *event == ServerEvent::ContextEstablished);
    assert_eq!(event, Some(ServerEvent::ContextEstablished));
    assert_eq!(server.loader.loaded_levels(), vec!["harbor".to_string()]);
}

#[test]
fn server_waits_for_pending_connections() {
    let start = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            pending_connection_wait: Duration::from_secs(10),
            ..test_server_config().context
        },
        ..test_server_config()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.server.establish_context("harbor");

    assert!(server.server.update(start).is_empty());
    server.server.set_pending_connections(1);
    assert!(server.server.update(start + Duration::from_secs(1)).is_empty());
    assert!(server.loader.loaded_levels().is_empty());

    let connected = start + Duration::from_secs(2);
    server.connect(Some(1), connected);
    server.server.set_pending_connections(0);
    let event = server.run_until(connected, |event| *event == ServerEvent::ContextEstablished);
    assert_eq!(event, Some(ServerEvent::ContextEstablished));
}

#[test]
fn server_stops_waiting_after_timeout() {
    let start = Instant::now();
    let config = ServerConfig {
        context: ContextConfig {
            pending_connection_wait: Duration::from_secs(10),
            ..test_server_config().context
        },
        ..test_server_config()
    };
    let mut server = TestServer::new(config, CLASSES, TestLevelLoader::new(true));
    server.server.establish_context("harbor");

    assert!(server.server.update(start).is_empty());
    assert!(server.server.update(start + Duration::from_secs(9)).is_empty());
    assert!(server.loader.loaded_levels().is_empty());

    let event = server.run_until(start + Duration::from_secs(10), |event| {
        *event == ServerEvent::ContextEstablished
    });
    assert_eq!(event, Some(ServerEvent::ContextEstablished));
}
