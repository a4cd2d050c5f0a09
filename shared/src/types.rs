pub type EntityId = u32;
pub type ChannelId = u16;
pub type ProfileId = u64;
pub type ClassId = u16;

/// Entity id used to mean "no entity"
pub const INVALID_ENTITY_ID: EntityId = 0;

/// Channel id used to mean "no channel"
pub const INVALID_CHANNEL_ID: ChannelId = 0;
