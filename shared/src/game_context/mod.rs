//! # Game Context
//! The root object of a session and the establishment pipelines built
//! from it.
//!
//! | Pipeline | Built by | Runs |
//! |----------|----------|------|
//! | Global   | [`init_global_establishment_tasks`]  | once per level, before channels |
//! | Channel  | [`init_channel_establishment_tasks`] | once per connection |

mod class_registry;
mod context_message;
mod game_context;
mod game_world;
mod host;
mod tasks;

pub use class_registry::ClassRegistry;
pub use context_message::ContextMessage;
pub use game_context::{GameContext, LoadFlags};
pub use game_world::{ActionEvent, FakeSpawn, GameWorld};
pub use host::{DynHost, EstablishmentHost, HostEstablisher, HostTask};
pub use tasks::{init_channel_establishment_tasks, init_global_establishment_tasks, BROADCAST_IN_GAME};
