//! # Actnet Server
//! The server side of a session: a registry of live client channels with a
//! reconnect grace period and a ban list, and the [`GameServer`] host that
//! steps context establishment for the level and for every joining client.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use actnet_shared::{
        config::ContextConfig, ChannelId, DisconnectCause, EntityId, NetChannel, ProfileId,
    };
}

mod ban_list;
mod channel;
mod error;
mod game_server;
mod listener;
mod server_config;

pub use ban_list::{BanList, BanStatus, BanTarget};
pub use channel::{ChannelCreated, ChannelRegistry, ConnectRequest, DisconnectOutcome, ServerChannel};
pub use error::ServerError;
pub use game_server::{GameServer, ServerEvent};
pub use listener::ServerListener;
pub use server_config::ServerConfig;
