mod channel_registry;
mod server_channel;

pub use channel_registry::{ChannelCreated, ChannelRegistry, ConnectRequest, DisconnectOutcome};
pub use server_channel::ServerChannel;
