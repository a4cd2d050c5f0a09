/// PROPERTY-BASED TESTS: channel id allocation
///
/// Uses proptest to drive random connect / disconnect sequences through a
/// ChannelRegistry that holds every disconnected profile.
///
/// Key invariants:
/// 1. Channel ids are never zero and never shared between live or held channels
/// 2. A held profile that reconnects gets its old channel id back

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use proptest::prelude::*;

use actnet_server::{
    ChannelCreated, ChannelRegistry, ConnectRequest, DisconnectOutcome, ServerListener,
};
use actnet_shared::{ChannelId, DisconnectCause, ProfileId};
use actnet_test::LoopbackChannel;

struct KeepAll;

impl ServerListener for KeepAll {
    fn should_keep_client(&mut self, _channel_id: ChannelId, _cause: DisconnectCause) -> bool {
        true
    }

    fn on_client_disconnected(&mut self, _channel_id: ChannelId, _cause: DisconnectCause, _reason: &str) {}
}

#[derive(Clone, Debug)]
enum Op {
    Connect(ProfileId),
    Disconnect(ProfileId),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..6u64).prop_map(Op::Connect),
        (1u64..6u64).prop_map(Op::Disconnect),
    ]
}

fn request(profile_id: ProfileId) -> ConnectRequest {
    let (link, _probe) = LoopbackChannel::new(0);
    ConnectRequest {
        session_handle: None,
        profile_id: Some(profile_id),
        address: None,
        link: Box::new(link),
    }
}

proptest! {
    #[test]
    fn prop_channel_ids_stay_unique(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let now = Instant::now();
        let mut registry = ChannelRegistry::new(Some(Duration::from_secs(60)), Duration::from_secs(60));
        registry.add_listener(Box::new(KeepAll));

        let mut live: HashMap<ProfileId, ChannelId> = HashMap::new();
        let mut held: HashMap<ProfileId, ChannelId> = HashMap::new();

        for op in ops {
            match op {
                Op::Connect(profile_id) => {
                    if live.contains_key(&profile_id) {
                        continue;
                    }
                    let created = registry.create_channel(request(profile_id), now);
                    prop_assert!(created.is_ok());
                    let Ok(created) = created else { continue };
                    match held.remove(&profile_id) {
                        Some(old_id) => {
                            prop_assert_eq!(created, ChannelCreated::Rebound(old_id));
                        }
                        None => {
                            let channel_id = created.channel_id();
                            prop_assert!(matches!(created, ChannelCreated::New(_)));
                            prop_assert_ne!(channel_id, 0);
                            prop_assert!(!live.values().any(|id| *id == channel_id));
                            prop_assert!(!held.values().any(|id| *id == channel_id));
                        }
                    }
                    live.insert(profile_id, created.channel_id());
                }
                Op::Disconnect(profile_id) => {
                    let Some(channel_id) = live.remove(&profile_id) else {
                        continue;
                    };
                    let outcome = registry.disconnect(channel_id, DisconnectCause::Timeout, "", now);
                    prop_assert_eq!(outcome, Ok(DisconnectOutcome::Held));
                    prop_assert!(registry.is_channel_on_hold(channel_id));
                    held.insert(profile_id, channel_id);
                }
            }
        }

        prop_assert_eq!(registry.len(), live.len());
        prop_assert_eq!(registry.held_count(), held.len());
    }
}
