/// Builders and drivers shared by the end-to-end tests

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use actnet_client::{ClientConfig, ClientError, ClientEvent, GameClient};
use actnet_server::{ConnectRequest, GameServer, ServerConfig, ServerEvent};
use actnet_shared::{
    config::ContextConfig, extension::ExtensionRegistry, ChannelId, ProfileId,
};

use crate::{
    level_loader::TestLevelLoader,
    loopback::{LinkProbe, LoopbackChannel},
    test_world::{TestWorld, WorldProbe},
};

/// Upper bound on ticks a driver runs before giving up
pub const MAX_TICKS: usize = 2000;

/// Context settings for a plain game session
pub fn test_context_config() -> ContextConfig {
    ContextConfig::default()
}

pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        context: ContextConfig {
            dedicated: true,
            ..test_context_config()
        },
        ..Default::default()
    }
}

pub fn test_extensions() -> Arc<ExtensionRegistry> {
    let registry = ExtensionRegistry::new();
    registry.lock();
    Arc::new(registry)
}

/// A server whose world knows `classes`
pub struct TestServer {
    pub server: GameServer,
    pub world: WorldProbe,
    pub loader: TestLevelLoader,
}

impl TestServer {
    pub fn new(config: ServerConfig, classes: &[&str], loader: TestLevelLoader) -> Self {
        let (world, probe) = TestWorld::new(classes);
        let server = GameServer::new(
            config,
            Box::new(world),
            Arc::new(loader.clone()),
            test_extensions(),
            Instant::now(),
        );
        Self {
            server,
            world: probe,
            loader,
        }
    }

    /// Connects a remote client and returns its channel and the probe on
    /// the server's end of the link
    pub fn connect(
        &mut self,
        profile_id: Option<ProfileId>,
        now: Instant,
    ) -> (ChannelId, LinkProbe) {
        let (link, probe) = LoopbackChannel::new(0);
        let created = self
            .server
            .connect(
                ConnectRequest {
                    session_handle: None,
                    profile_id,
                    address: None,
                    link: Box::new(link),
                },
                now,
            )
            .unwrap();
        (created.channel_id(), probe)
    }

    /// Updates until `done` matches an event, sleeping between ticks so the
    /// level loading thread can finish
    pub fn run_until<F: Fn(&ServerEvent) -> bool>(&mut self, now: Instant, done: F) -> Option<ServerEvent> {
        for _ in 0..MAX_TICKS {
            if let Some(event) = self.server.update(now).into_iter().find(|event| done(event)) {
                return Some(event);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }

    pub fn establish(&mut self, level: &str, now: Instant) {
        self.server.establish_context(level);
        let event = self.run_until(now, |event| *event == ServerEvent::ContextEstablished);
        assert_eq!(event, Some(ServerEvent::ContextEstablished));
    }
}

pub struct TestClient {
    pub client: GameClient,
    pub world: WorldProbe,
    pub loader: TestLevelLoader,
    pub link: LinkProbe,
}

impl TestClient {
    pub fn new(channel_id: ChannelId, classes: &[&str], loader: TestLevelLoader) -> Self {
        let (world, probe) = TestWorld::new(classes);
        let mut client = GameClient::new(
            ClientConfig {
                context: test_context_config(),
            },
            Box::new(world),
            Arc::new(loader.clone()),
            test_extensions(),
            Instant::now(),
        );
        let (link, link_probe) = LoopbackChannel::new(channel_id);
        client.connect(Box::new(link)).unwrap();
        Self {
            client,
            world: probe,
            loader,
            link: link_probe,
        }
    }

    /// Feeds everything the server sent on `server_link` to the client
    pub fn receive_from(&mut self, server_link: &LinkProbe, now: Instant) -> Result<usize, ClientError> {
        let messages = server_link.take_sent();
        let count = messages.len();
        for message in messages {
            self.client.receive(message, now)?;
        }
        Ok(count)
    }

    pub fn run_until_event(&mut self, now: Instant) -> Option<ClientEvent> {
        for _ in 0..MAX_TICKS {
            if let Some(event) = self.client.update(now).into_iter().next() {
                return Some(event);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }
}
