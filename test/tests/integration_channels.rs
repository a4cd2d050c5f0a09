/// End-to-end channel lifecycle on a GameServer: holding a disconnected
/// client, rebinding it on reconnect, and fanning calls out to clients

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use actnet_server::{
    BanTarget, ConnectRequest, DisconnectOutcome, ServerConfig, ServerError, ServerEvent,
    ServerListener,
};
use actnet_shared::{
    rmi::{RmiBody, RmiDestinations, RmiMessage, RmiRejection, RmiReliability},
    ChannelId, DisconnectCause, EstablishChannel,
};
use actnet_test::{test_server_config, LoopbackChannel, TestLevelLoader, TestServer, WorldCall};

const GRACE: Duration = Duration::from_secs(30);

#[derive(Default)]
struct Departures {
    final_disconnects: Vec<ChannelId>,
}

struct KeepEveryone(Rc<RefCell<Departures>>);

impl ServerListener for KeepEveryone {
    fn should_keep_client(&mut self, _channel_id: ChannelId, _cause: DisconnectCause) -> bool {
        true
    }

    fn on_client_disconnected(&mut self, channel_id: ChannelId, _cause: DisconnectCause, _reason: &str) {
        self.0.borrow_mut().final_disconnects.push(channel_id);
    }
}

fn holding_server(now: Instant) -> (TestServer, Rc<RefCell<Departures>>) {
    let config = ServerConfig {
        hold_grace_period: Some(GRACE),
        ..test_server_config()
    };
    let mut server = TestServer::new(config, &["Player"], TestLevelLoader::new(true));
    let departures = Rc::new(RefCell::new(Departures::default()));
    server
        .server
        .add_listener(Box::new(KeepEveryone(departures.clone())));
    server.establish("harbor", now);
    (server, departures)
}

fn join(server: &mut TestServer, profile_id: u64, now: Instant) -> (ChannelId, actnet_test::LinkProbe) {
    let (channel_id, link) = server.connect(Some(profile_id), now);
    let event = server.run_until(now, |event| {
        *event == ServerEvent::ChannelEstablished { channel_id }
    });
    assert_eq!(event, Some(ServerEvent::ChannelEstablished { channel_id }));
    (channel_id, link)
}

fn call() -> RmiBody {
    RmiBody::new(RmiMessage::new(3, 77, vec![1, 2]), RmiReliability::ReliableOrdered)
}

#[test]
fn reconnect_rebinds_held_channel() {
    let start = Instant::now();
    let (mut server, departures) = holding_server(start);
    let (channel_id, old_link) = join(&mut server, 42, start);
    let actor = server.server.channel(channel_id).unwrap().player_id();

    let outcome = server
        .server
        .disconnect(channel_id, DisconnectCause::Timeout, "connection lost", start)
        .unwrap();
    assert_eq!(outcome, DisconnectOutcome::Held);
    assert_eq!(old_link.disconnect_cause(), Some(DisconnectCause::Timeout));
    assert!(server.server.is_channel_on_hold(channel_id));
    assert!(server.server.channel_ids().is_empty());

    let later = start + Duration::from_secs(10);
    let (rebound_id, new_link) = server.connect(Some(42), later);
    assert_eq!(rebound_id, channel_id);
    assert!(!server.server.is_channel_on_hold(channel_id));
    assert!(server.server.channel(channel_id).unwrap().is_on_hold());

    let event = server.run_until(later, |event| matches!(event, ServerEvent::ChannelEstablished { .. }));
    assert_eq!(event, Some(ServerEvent::ChannelEstablished { channel_id }));

    let channel = server.server.channel(channel_id).unwrap();
    assert!(!channel.is_on_hold());
    assert_eq!(channel.player_id(), actor);
    assert_eq!(server.world.count(&WorldCall::ClientConnect(channel_id, false)), 2);
    // the handshake is sent again on the new link
    assert_eq!(new_link.take_sent().len(), 2);
    assert!(departures.borrow().final_disconnects.is_empty());
}

#[test]
fn expired_hold_is_swept() {
    let start = Instant::now();
    let (mut server, departures) = holding_server(start);
    let (channel_id, _link) = join(&mut server, 42, start);

    server
        .server
        .disconnect(channel_id, DisconnectCause::Timeout, "", start)
        .unwrap();
    assert!(server.server.update(start + GRACE - Duration::from_secs(1)).is_empty());

    let events = server.server.update(start + GRACE);
    assert_eq!(events, vec![ServerEvent::HoldExpired { channel_id }]);
    assert!(!server.server.is_channel_on_hold(channel_id));
    assert_eq!(departures.borrow().final_disconnects, vec![channel_id]);

    // a fresh channel, and a fresh join
    let (channel_id, _link) = server.connect(Some(42), start + GRACE);
    assert!(server.server.is_channel_establishing(channel_id));
}

#[test]
fn reset_on_hold_channels_drops_everyone() {
    let start = Instant::now();
    let (mut server, departures) = holding_server(start);
    let (first, _) = join(&mut server, 1, start);
    let (second, _) = join(&mut server, 2, start);
    server.server.disconnect(first, DisconnectCause::Timeout, "", start).unwrap();
    server.server.disconnect(second, DisconnectCause::Timeout, "", start).unwrap();

    server.server.reset_on_hold_channels();
    assert!(!server.server.is_channel_on_hold(first));
    assert!(!server.server.is_channel_on_hold(second));
    let mut dropped = departures.borrow().final_disconnects.clone();
    dropped.sort_unstable();
    assert_eq!(dropped, vec![first, second]);
}

#[test]
fn disconnect_mid_handshake_drops_pipeline() {
    let start = Instant::now();
    let (mut server, _) = holding_server(start);
    let (channel_id, link) = server.connect(None, start);
    link.set_manual_ack(true);
    server.server.update(start);
    assert!(server.server.is_channel_establishing(channel_id));

    let outcome = server
        .server
        .disconnect(channel_id, DisconnectCause::UserRequested, "", start)
        .unwrap();
    assert_eq!(outcome, DisconnectOutcome::Destroyed);
    assert!(!server.server.is_channel_establishing(channel_id));
    assert_eq!(
        server.server.disconnect(channel_id, DisconnectCause::UserRequested, "", start),
        Err(ServerError::UnknownChannel { channel_id })
    );
}

#[test]
fn banned_player_cannot_rejoin() {
    let start = Instant::now();
    let (mut server, departures) = holding_server(start);
    let (channel_id, link) = join(&mut server, 42, start);

    assert_eq!(
        server.server.ban_player(channel_id, "team killing", start),
        Ok(BanTarget::Profile(42))
    );
    assert_eq!(link.disconnect_cause(), Some(DisconnectCause::Banned));
    assert!(!server.server.is_channel_on_hold(channel_id));
    assert_eq!(departures.borrow().final_disconnects, vec![channel_id]);

    let (retry, _) = LoopbackChannel::new(0);
    let result = server.server.connect(
        ConnectRequest {
            session_handle: None,
            profile_id: Some(42),
            address: None,
            link: Box::new(retry),
        },
        start + Duration::from_secs(60),
    );
    assert_eq!(
        result,
        Err(ServerError::Banned {
            target: BanTarget::Profile(42)
        })
    );

    assert!(server.server.unban(BanTarget::Profile(42)));
    assert!(server.server.banned_status(start).is_empty());
    let (channel_id, _) = server.connect(Some(42), start + Duration::from_secs(61));
    assert!(server.server.is_channel_establishing(channel_id));
}

#[test]
fn calls_reach_live_clients() {
    let start = Instant::now();
    let (mut server, _) = holding_server(start);
    let (first, first_link) = join(&mut server, 1, start);
    let (second, second_link) = join(&mut server, 2, start);

    let report = server
        .server
        .invoke_rmi(&call(), RmiDestinations::TO_ALL_CLIENTS, None, 0);
    assert_eq!(report.channels, vec![first, second]);
    assert_eq!(first_link.rmi_count(), 1);
    assert_eq!(second_link.rmi_count(), 1);

    let report = server
        .server
        .invoke_rmi(&call(), RmiDestinations::TO_OWN_CLIENT, None, second);
    assert_eq!(report.channels, vec![second]);

    let report = server.server.invoke_rmi(
        &call(),
        RmiDestinations::TO_CLIENT_CHANNEL | RmiDestinations::TO_OWN_CLIENT,
        Some(first),
        second,
    );
    assert_eq!(report.rejected, Some(RmiRejection::OwnClientAndChannel));
    assert_eq!(report.dispatch_count(), 0);

    // held channels have no link to send on
    server.server.disconnect(first, DisconnectCause::Timeout, "", start).unwrap();
    let report = server
        .server
        .invoke_rmi(&call(), RmiDestinations::TO_ALL_CLIENTS, None, 0);
    assert_eq!(report.channels, vec![second]);
    assert_eq!(first_link.rmi_count(), 1);
}

#[test]
fn calls_to_server_are_dropped() {
    let start = Instant::now();
    let (mut server, _) = holding_server(start);
    join(&mut server, 1, start);

    let report = server
        .server
        .invoke_rmi(&call(), RmiDestinations::TO_SERVER, None, 0);
    assert!(!report.to_server);
    assert_eq!(report.dispatch_count(), 0);
}
