use crate::types::{ChannelId, EntityId};

/// What a "fake spawn" re-announces to the network after a reset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeSpawn {
    GameRules,
    Players,
    All,
}

/// Game-wide notifications raised during establishment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionEvent {
    ResetBegin,
    /// Percentage of the reset completed
    ResetProgress(u8),
    ResetEnd,
}

/// The game side of context establishment: entity system, game rules and
/// their listeners
pub trait GameWorld {
    /// Name of the game rules class sent to joining clients
    fn game_rules(&self) -> String;

    /// Entity classes registered when the class registry is synced
    fn entity_classes(&self) -> Vec<String> {
        Vec::new()
    }

    fn random_system_reset(&mut self, _loading_new_level: bool) {}

    fn prepare_level_load(&mut self, _level: &str) {}

    fn entity_system_reset(&mut self, skip_game_rules: bool);

    fn clear_player_ids(&mut self) {}

    fn fake_spawn(&mut self, what: FakeSpawn, rebind: bool);

    fn load_level_entities(&mut self) {}

    fn reset_areas(&mut self) {}

    fn pause_game(&mut self, _pause: bool) {}

    /// Sent to every entity once a new level has loaded
    fn start_level(&mut self) {}

    fn game_rules_reset(&mut self) {}

    fn loading_complete(&mut self) {}

    fn is_precaching_done(&self) -> bool {
        true
    }

    fn gameplay_start(&mut self) {}

    fn action_event(&mut self, _event: ActionEvent) {}

    /// Creates the client's actor. None rejects the client.
    fn on_client_connect(&mut self, channel_id: ChannelId, is_reset: bool) -> Option<EntityId>;

    /// Returns false to reject the client
    fn on_client_entered_game(&mut self, _channel_id: ChannelId, _is_reset: bool) -> bool {
        true
    }

    fn delegate_authority(&mut self, _channel_id: ChannelId, _actor: EntityId) {}

    fn expected_clients(&self) -> usize {
        1
    }
}
