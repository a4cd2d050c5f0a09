mod aspect;
mod aspect_registry;
mod aspect_serializer;
mod script_sync;

pub use aspect::{Aspect, AspectFlags, AspectMask, DEFAULT_ASPECT_PROFILE, NUM_ASPECTS};
pub use aspect_registry::{AspectInfo, AspectRegistry};
pub use aspect_serializer::{
    AspectSerializer, NetEntityWorld, NetSerializable, PhysicsSync, SynchResult,
    SERIALIZE_COMPENSATE_TIME_DIFF,
};
pub use script_sync::{
    serialize_synced_properties, ScriptComponent, SyncPropertyType, SyncValue, SyncedProperty,
};
