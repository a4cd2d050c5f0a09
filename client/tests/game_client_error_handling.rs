/// Tests for client session error handling
///
/// The client refuses handshake messages it can't act on, and drops the
/// connection with `ContextCorruption` when the server's class registry
/// disagrees with its own.
use std::{
    cell::RefCell,
    rc::Rc,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use actnet_client::{ClientConfig, ClientError, ClientEvent, GameClient};
use actnet_shared::{
    establishment::{EstablishmentError, LevelLoader},
    extension::ExtensionRegistry,
    game_context::{ClassRegistry, ContextMessage, FakeSpawn, GameWorld},
    rmi::RmiBody,
    ChannelId, DisconnectCause, EntityId, EstablishChannel, NetChannel, SendHandle,
};

struct World;

impl GameWorld for World {
    fn game_rules(&self) -> String {
        "DeathMatch".to_string()
    }

    fn entity_classes(&self) -> Vec<String> {
        vec!["Player".to_string(), "Door".to_string()]
    }

    fn entity_system_reset(&mut self, _skip_game_rules: bool) {}

    fn fake_spawn(&mut self, _what: FakeSpawn, _rebind: bool) {}

    fn on_client_connect(&mut self, _channel_id: ChannelId, _is_reset: bool) -> Option<EntityId> {
        Some(1)
    }
}

struct Loader(bool);

impl LevelLoader for Loader {
    fn load_level(&self, _level: &str) -> bool {
        self.0
    }
}

struct Link {
    disconnects: Rc<RefCell<Vec<DisconnectCause>>>,
}

impl NetChannel for Link {
    fn channel_id(&self) -> ChannelId {
        1
    }

    fn is_local(&self) -> bool {
        false
    }

    fn dispatch_rmi(&mut self, _body: &RmiBody) {}

    fn send(&mut self, _message: ContextMessage) -> SendHandle {
        SendHandle::new(1)
    }

    fn is_acknowledged(&self, _handle: SendHandle) -> bool {
        true
    }

    fn disconnect(&mut self, cause: DisconnectCause, _reason: &str) {
        self.disconnects.borrow_mut().push(cause);
    }
}

fn client(loads: bool) -> (GameClient, Rc<RefCell<Vec<DisconnectCause>>>) {
    let mut client = GameClient::new(
        ClientConfig::default(),
        Box::new(World),
        Arc::new(Loader(loads)),
        Arc::new(ExtensionRegistry::new()),
        Instant::now(),
    );
    let disconnects = Rc::new(RefCell::new(Vec::new()));
    client
        .connect(Box::new(Link {
            disconnects: disconnects.clone(),
        }))
        .unwrap();
    (client, disconnects)
}

fn server_registry(names: &[&str]) -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    for name in names {
        registry.register(name);
    }
    registry
}

fn game_type() -> ContextMessage {
    ContextMessage::GameType {
        rules: "DeathMatch".to_string(),
        level: "harbor".to_string(),
        load_new_level: true,
    }
}

fn run_until_event(client: &mut GameClient) -> Vec<ClientEvent> {
    for _ in 0..1000 {
        let events = client.update(Instant::now());
        if !events.is_empty() {
            return events;
        }
        thread::sleep(Duration::from_millis(1));
    }
    Vec::new()
}

#[test]
fn test_not_connected() {
    let mut client = GameClient::new(
        ClientConfig::default(),
        Box::new(World),
        Arc::new(Loader(true)),
        Arc::new(ExtensionRegistry::new()),
        Instant::now(),
    );
    assert!(!client.is_connected());
    assert_eq!(
        client.receive(game_type(), Instant::now()),
        Err(ClientError::NotConnected)
    );
    assert!(client.update(Instant::now()).is_empty());
}

#[test]
fn test_already_connected() {
    let (mut client, _) = client(true);
    let result = client.connect(Box::new(Link {
        disconnects: Rc::new(RefCell::new(Vec::new())),
    }));
    assert_eq!(result, Err(ClientError::AlreadyConnected { channel_id: 1 }));
}

#[test]
fn test_class_hash_mismatch_disconnects() {
    let (mut client, disconnects) = client(true);

    let matching = server_registry(&["Player", "Door"]).hash();
    assert_eq!(client.receive(ContextMessage::ClassHash(matching), Instant::now()), Ok(()));
    assert!(client.is_connected());

    let other = server_registry(&["Door", "Player"]).hash();
    let result = client.receive(ContextMessage::ClassHash(other), Instant::now());
    assert!(matches!(
        result,
        Err(ClientError::ContextCorruption {
            cause: EstablishmentError::ClassRegistryMismatch { received, .. }
        }) if received == other
    ));
    assert!(!client.is_connected());
    assert_eq!(*disconnects.borrow(), vec![DisconnectCause::ContextCorruption]);
}

#[test]
fn test_class_table_with_unknown_class() {
    let (mut client, disconnects) = client(true);
    let table = server_registry(&["Player", "Vehicle"]).table();

    let result = client.receive(ContextMessage::ClassRegistration(table), Instant::now());
    assert_eq!(
        result,
        Err(ClientError::ContextCorruption {
            cause: EstablishmentError::UnknownClass {
                name: "Vehicle".to_string()
            }
        })
    );
    assert_eq!(*disconnects.borrow(), vec![DisconnectCause::ContextCorruption]);
}

#[test]
fn test_class_table_reassigns_ids() {
    let (mut client, _) = client(true);
    let table = server_registry(&["Door", "Player"]).table();

    assert_eq!(
        client.receive(ContextMessage::ClassRegistration(table), Instant::now()),
        Ok(())
    );
    assert_eq!(client.context().class_registry().id("Door"), Some(0));
    assert_eq!(client.context().class_registry().id("Player"), Some(1));
}

#[test]
fn test_game_type_brings_client_in_game() {
    let (mut client, _) = client(true);
    client.receive(game_type(), Instant::now()).unwrap();
    assert_eq!(client.game_rules(), Some("DeathMatch"));
    assert_eq!(client.context().level(), "harbor");

    assert_eq!(run_until_event(&mut client), vec![ClientEvent::InGame]);
    assert!(client.is_in_game());
    assert!(client.context().has_started());
    assert_eq!(client.context().broadcast_action_event_in_game(), 4);
    assert!(client.channel().unwrap().level_loaded());
}

#[test]
fn test_level_load_failure_disconnects() {
    let (mut client, disconnects) = client(false);
    client.receive(game_type(), Instant::now()).unwrap();

    let events = run_until_event(&mut client);
    assert_eq!(
        events,
        vec![ClientEvent::EstablishmentFailed {
            task: "LoadLevel".to_string(),
            cause: EstablishmentError::LevelLoadFailed {
                level: "harbor".to_string()
            },
        }]
    );
    assert!(!client.is_connected());
    assert!(!client.is_in_game());
    assert_eq!(*disconnects.borrow(), vec![DisconnectCause::GameError]);
}

#[test]
fn test_time_sync_holds_establishment() {
    let (mut client, _) = client(true);
    client.channel_mut().unwrap().set_time_synced(false);
    client.receive(game_type(), Instant::now()).unwrap();

    for _ in 0..5 {
        assert!(client.update(Instant::now()).is_empty());
    }
    assert!(!client.context().is_in_level_load());

    client.channel_mut().unwrap().set_time_synced(true);
    assert_eq!(run_until_event(&mut client), vec![ClientEvent::InGame]);
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ClientError::NotConnected.to_string(),
        "Client is not connected to a server"
    );
    let error = ClientError::ContextCorruption {
        cause: EstablishmentError::UnknownClass {
            name: "Vehicle".to_string(),
        },
    };
    assert_eq!(
        error.to_string(),
        "Context corruption: Peer registered unknown class 'Vehicle'"
    );
}
