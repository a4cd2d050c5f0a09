//! # Actnet Shared
//! Common functionality shared between actnet-server & actnet-client crates:
//! per-object update activation, the RMI dispatch tables, aspect
//! serialization and context establishment.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use actnet_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, SignedInteger,
    SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};

pub mod aspect;
pub mod config;
pub mod establishment;
pub mod extension;
pub mod game_context;
pub mod game_object;
pub mod rmi;
pub mod serialize;

mod disconnect;
mod net_channel;
mod types;

pub use disconnect::DisconnectCause;
pub use net_channel::{EstablishChannel, NetChannel, SendHandle};
pub use types::{
    ChannelId, ClassId, EntityId, ProfileId, INVALID_CHANNEL_ID, INVALID_ENTITY_ID,
};
