/// Timer value used for states that never time out
pub const UPDATE_TIMEOUT_HUGE: f32 = 1e20;

/// Camera distance at or beyond which an object is considered far away
pub const FAR_AWAY_DISTANCE: f32 = 150.0;

/// Visibility/distance estimate of a game object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateState {
    VisibleClose,
    VisibleFar,
    NotVisibleClose,
    NotVisibleFar,
    CheckVisibilityClose,
    CheckVisibilityFar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateStateEvent {
    BecomeVisible,
    BecomeClose,
    BecomeFar,
    Timeout,
}

impl UpdateState {
    pub const ALL: [UpdateState; 6] = [
        UpdateState::VisibleClose,
        UpdateState::VisibleFar,
        UpdateState::NotVisibleClose,
        UpdateState::NotVisibleFar,
        UpdateState::CheckVisibilityClose,
        UpdateState::CheckVisibilityFar,
    ];

    pub fn timeout(self) -> f32 {
        match self {
            UpdateState::VisibleClose => 3.0,
            UpdateState::VisibleFar => 5.0,
            UpdateState::NotVisibleClose | UpdateState::NotVisibleFar => UPDATE_TIMEOUT_HUGE,
            UpdateState::CheckVisibilityClose => 27.0,
            UpdateState::CheckVisibilityFar => 13.0,
        }
    }

    /// Next state for `event`, or `None` if the event does not apply here
    pub fn transition(self, event: UpdateStateEvent) -> Option<UpdateState> {
        TRANSITIONS[self.index()][event.index()]
    }

    pub fn to_u8(self) -> u8 {
        self.index() as u8
    }

    pub fn from_u8(value: u8) -> Option<UpdateState> {
        Self::ALL.get(value as usize).copied()
    }

    fn index(self) -> usize {
        match self {
            UpdateState::VisibleClose => 0,
            UpdateState::VisibleFar => 1,
            UpdateState::NotVisibleClose => 2,
            UpdateState::NotVisibleFar => 3,
            UpdateState::CheckVisibilityClose => 4,
            UpdateState::CheckVisibilityFar => 5,
        }
    }
}

impl UpdateStateEvent {
    pub const ALL: [UpdateStateEvent; 4] = [
        UpdateStateEvent::BecomeVisible,
        UpdateStateEvent::BecomeClose,
        UpdateStateEvent::BecomeFar,
        UpdateStateEvent::Timeout,
    ];

    fn index(self) -> usize {
        match self {
            UpdateStateEvent::BecomeVisible => 0,
            UpdateStateEvent::BecomeClose => 1,
            UpdateStateEvent::BecomeFar => 2,
            UpdateStateEvent::Timeout => 3,
        }
    }
}

use UpdateState::*;

const TRANSITIONS: [[Option<UpdateState>; 4]; 6] = [
    // BecomeVisible, BecomeClose, BecomeFar, Timeout
    [None, Some(VisibleClose), Some(VisibleFar), Some(CheckVisibilityClose)],
    [None, Some(VisibleClose), Some(VisibleFar), Some(CheckVisibilityFar)],
    [Some(VisibleClose), Some(NotVisibleClose), Some(NotVisibleFar), Some(NotVisibleClose)],
    [Some(VisibleFar), Some(NotVisibleClose), Some(NotVisibleFar), Some(NotVisibleFar)],
    [Some(VisibleClose), Some(CheckVisibilityClose), Some(CheckVisibilityFar), Some(NotVisibleClose)],
    [Some(VisibleFar), Some(CheckVisibilityClose), Some(CheckVisibilityFar), Some(NotVisibleFar)],
];

pub fn test_is_probably_visible(state: UpdateState) -> bool {
    matches!(
        state,
        VisibleClose | VisibleFar | CheckVisibilityClose | CheckVisibilityFar
    )
}

pub fn test_is_probably_distant(state: UpdateState) -> bool {
    matches!(state, VisibleFar | NotVisibleFar | CheckVisibilityFar)
}

/// Whether the object should keep receiving render notifications in `state`
pub fn wants_render_event(state: UpdateState) -> bool {
    state.transition(UpdateStateEvent::BecomeVisible).is_some()
}
