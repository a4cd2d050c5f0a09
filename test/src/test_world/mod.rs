/// Game world stand-in that records every hook establishment calls

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actnet_shared::{
    game_context::{ActionEvent, FakeSpawn, GameWorld},
    ChannelId, EntityId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldCall {
    RandomSystemReset(bool),
    PrepareLevelLoad(String),
    EntitySystemReset(bool),
    ClearPlayerIds,
    FakeSpawn(FakeSpawn, bool),
    LoadLevelEntities,
    ResetAreas,
    PauseGame(bool),
    StartLevel,
    GameRulesReset,
    LoadingComplete,
    GameplayStart,
    ActionEvent(ActionEvent),
    ClientConnect(ChannelId, bool),
    ClientEnteredGame(ChannelId, bool),
    DelegateAuthority(ChannelId, EntityId),
}

#[derive(Default)]
struct WorldState {
    calls: Vec<WorldCall>,
    actors: HashMap<ChannelId, EntityId>,
    reject_clients: bool,
    precaching_done: bool,
}

pub struct TestWorld {
    classes: Vec<String>,
    expected_clients: usize,
    state: Arc<Mutex<WorldState>>,
}

impl TestWorld {
    pub fn new(classes: &[&str]) -> (Self, WorldProbe) {
        let state = Arc::new(Mutex::new(WorldState {
            precaching_done: true,
            ..Default::default()
        }));
        let world = Self {
            classes: classes.iter().map(|class| class.to_string()).collect(),
            expected_clients: 1,
            state: state.clone(),
        };
        (world, WorldProbe { state })
    }

    pub fn with_expected_clients(mut self, expected: usize) -> Self {
        self.expected_clients = expected;
        self
    }

    fn record(&self, call: WorldCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl GameWorld for TestWorld {
    fn game_rules(&self) -> String {
        "TeamInstantAction".to_string()
    }

    fn entity_classes(&self) -> Vec<String> {
        self.classes.clone()
    }

    fn random_system_reset(&mut self, loading_new_level: bool) {
        self.record(WorldCall::RandomSystemReset(loading_new_level));
    }

    fn prepare_level_load(&mut self, level: &str) {
        self.record(WorldCall::PrepareLevelLoad(level.to_string()));
    }

    fn entity_system_reset(&mut self, skip_game_rules: bool) {
        self.record(WorldCall::EntitySystemReset(skip_game_rules));
    }

    fn clear_player_ids(&mut self) {
        self.record(WorldCall::ClearPlayerIds);
    }

    fn fake_spawn(&mut self, what: FakeSpawn, rebind: bool) {
        self.record(WorldCall::FakeSpawn(what, rebind));
    }

    fn load_level_entities(&mut self) {
        self.record(WorldCall::LoadLevelEntities);
    }

    fn reset_areas(&mut self) {
        self.record(WorldCall::ResetAreas);
    }

    fn pause_game(&mut self, pause: bool) {
        self.record(WorldCall::PauseGame(pause));
    }

    fn start_level(&mut self) {
        self.record(WorldCall::StartLevel);
    }

    fn game_rules_reset(&mut self) {
        self.record(WorldCall::GameRulesReset);
    }

    fn loading_complete(&mut self) {
        self.record(WorldCall::LoadingComplete);
    }

    fn is_precaching_done(&self) -> bool {
        self.state.lock().unwrap().precaching_done
    }

    fn gameplay_start(&mut self) {
        self.record(WorldCall::GameplayStart);
    }

    fn action_event(&mut self, event: ActionEvent) {
        self.record(WorldCall::ActionEvent(event));
    }

    fn on_client_connect(&mut self, channel_id: ChannelId, is_reset: bool) -> Option<EntityId> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(WorldCall::ClientConnect(channel_id, is_reset));
        if state.reject_clients {
            return None;
        }
        let next = 1000 + state.actors.len() as EntityId;
        Some(*state.actors.entry(channel_id).or_insert(next))
    }

    fn on_client_entered_game(&mut self, channel_id: ChannelId, is_reset: bool) -> bool {
        self.record(WorldCall::ClientEnteredGame(channel_id, is_reset));
        true
    }

    fn delegate_authority(&mut self, channel_id: ChannelId, actor: EntityId) {
        self.record(WorldCall::DelegateAuthority(channel_id, actor));
    }

    fn expected_clients(&self) -> usize {
        self.expected_clients
    }
}

/// The test's view of a [`TestWorld`] after it was handed to a context
#[derive(Clone)]
pub struct WorldProbe {
    state: Arc<Mutex<WorldState>>,
}

impl WorldProbe {
    pub fn calls(&self) -> Vec<WorldCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, call: &WorldCall) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|recorded| *recorded == call)
            .count()
    }

    pub fn set_reject_clients(&self, reject: bool) {
        self.state.lock().unwrap().reject_clients = reject;
    }

    pub fn set_precaching_done(&self, done: bool) {
        self.state.lock().unwrap().precaching_done = done;
    }

    pub fn actor(&self, channel_id: ChannelId) -> Option<EntityId> {
        self.state.lock().unwrap().actors.get(&channel_id).copied()
    }
}
