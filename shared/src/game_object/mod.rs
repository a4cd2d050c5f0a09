//! # Game Objects
//!
//! | Piece | Role |
//! |-------|------|
//! | `UpdateState` | visibility/distance estimate, driven by a fixed transition table |
//! | `ExtensionRecord` | one attached extension with its slot counters and condition bits |
//! | `GameObject` | owns the records and decides, every frame, which slots update |
//! | `GameObjectNotice` | activation/physics side effects for the simulation to apply |

mod distance_checker;
mod error;
mod event;
mod extension_record;
mod game_object;
mod notice;
mod physics_gate;
mod update_policy;
mod update_state;

pub use distance_checker::{DistanceChecker, DISTANCE_CHECKER_TIMEOUT};
pub use error::GameObjectError;
pub use event::{GameObjectEvent, EVENT_TO_EXTENSIONS, EVENT_TO_GAME_OBJECT};
pub use extension_record::{ExtensionRecord, MAX_UPDATE_SLOTS};
pub use game_object::{GameObject, MAX_PENDING_CHANGES};
pub use notice::GameObjectNotice;
pub use physics_gate::PhysicsCallbackGate;
pub use update_policy::{
    AiActivationMode, PhysicsDisablePolicy, PrePhysicsUpdateRule, SlotConditions,
    UpdateEnableCondition,
};
pub use update_state::{
    test_is_probably_distant, test_is_probably_visible, wants_render_event, UpdateState,
    UpdateStateEvent, FAR_AWAY_DISTANCE, UPDATE_TIMEOUT_HUGE,
};
