//! # Context Establishment
//! A resumable, ordered list of tasks that brings a context or a channel
//! from "just connected" to "in game". The owner calls
//! [`ContextEstablisher::step`] once per tick; tasks that need more time
//! return [`TaskResult::Wait`] and are stepped again on the next tick.

mod context_view_state;
mod error;
mod establisher;
mod level_load;
mod send_tokens;
mod task;
mod wait_value;

pub use context_view_state::ContextViewState;
pub use error::EstablishmentError;
pub use establisher::{ContextEstablisher, EstablisherStatus};
pub use level_load::{LevelLoadStatus, LevelLoadTask, LevelLoader};
pub use send_tokens::SendTokens;
pub use task::{Clock, EstablishmentTask, FnTask, TaskResult};
pub use wait_value::WaitValue;
