mod context_config;
mod error;
mod scheduling;
mod serialization_order;

pub use context_config::ContextConfig;
pub use error::ConfigError;
pub use scheduling::{pack_tag, SchedulingProfileTable, SchedulingProfiles};
pub use serialization_order::SerializationOrder;
