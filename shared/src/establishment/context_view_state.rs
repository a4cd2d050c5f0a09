/// Milestones of context establishment, in the order they are reached
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextViewState {
    Initial,
    Begin,
    EstablishContext,
    ConfigureContext,
    SpawnEntities,
    PostSpawnEntities,
    InGame,
}

impl ContextViewState {
    pub const ALL: [ContextViewState; 7] = [
        ContextViewState::Initial,
        ContextViewState::Begin,
        ContextViewState::EstablishContext,
        ContextViewState::ConfigureContext,
        ContextViewState::SpawnEntities,
        ContextViewState::PostSpawnEntities,
        ContextViewState::InGame,
    ];

    pub fn next(self) -> Option<ContextViewState> {
        Self::ALL.get(self as usize + 1).copied()
    }
}
