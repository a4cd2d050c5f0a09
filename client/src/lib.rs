//! # Actnet Client
//! The client side of a session: validates the server's class registry and
//! runs the establishment pipeline that brings the client into the game
//! whenever the server announces a level.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use actnet_shared::{
        config::ContextConfig, game_context::ContextMessage, ChannelId, DisconnectCause,
        NetChannel,
    };
}

mod client_channel;
mod client_config;
mod error;
mod game_client;

pub use client_channel::ClientChannel;
pub use client_config::ClientConfig;
pub use error::ClientError;
pub use game_client::{ClientEvent, GameClient};
