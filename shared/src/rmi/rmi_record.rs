use std::{fmt, sync::Arc};

use actnet_serde::{BitReader, SerdeErr};

use crate::{aspect::SyncPropertyType, types::EntityId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RmiDirection {
    /// Client to server
    ToServer,
    /// Server to client
    ToClient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RmiReliability {
    UnreliableOrdered,
    ReliableOrdered,
    ReliableUnordered,
}

/// How a call is ordered relative to the object's own state updates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RmiAttachment {
    NoAttach,
    PreAttach,
    PostAttach,
    Urgent,
    Independent,
}

impl RmiAttachment {
    /// Attached calls travel with the object's updates and share their
    /// delivery guarantee
    pub fn follows_object(self) -> bool {
        matches!(self, RmiAttachment::PreAttach | RmiAttachment::PostAttach)
    }
}

/// Follow-up work produced by decoding a call, applied at the next sync point
pub trait AtSyncItem {
    /// Returns false if the item could not be applied
    fn sync(&mut self) -> bool;
}

pub type NativeDecoder = Arc<
    dyn Fn(&mut BitReader, EntityId) -> Result<Option<Box<dyn AtSyncItem>>, SerdeErr>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub enum RmiHandler {
    Native(NativeDecoder),
    Script {
        class: String,
        function: String,
        format: String,
        /// `format` parsed at registration
        types: Vec<SyncPropertyType>,
    },
}

impl fmt::Debug for RmiHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RmiHandler::Native(_) => f.write_str("Native"),
            RmiHandler::Script {
                class,
                function,
                format,
                ..
            } => write!(f, "Script({}::{} '{}')", class, function, format),
        }
    }
}

/// One native call an interface declares
#[derive(Clone)]
pub struct RmiDeclaration {
    pub description: String,
    pub direction: RmiDirection,
    pub reliability: RmiReliability,
    pub attachment: RmiAttachment,
    pub low_delay: bool,
    pub decoder: NativeDecoder,
}

impl RmiDeclaration {
    pub fn new(
        description: &str,
        direction: RmiDirection,
        reliability: RmiReliability,
        attachment: RmiAttachment,
        decoder: NativeDecoder,
    ) -> Self {
        Self {
            description: description.to_string(),
            direction,
            reliability,
            attachment,
            low_delay: false,
            decoder,
        }
    }

    pub fn low_delay(mut self) -> Self {
        self.low_delay = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct RmiRecord {
    pub description: String,
    pub handler: RmiHandler,
    pub reliability: RmiReliability,
    pub attachment: RmiAttachment,
    pub index: u8,
    pub is_server_call: bool,
    pub low_delay: bool,
}

impl RmiRecord {
    /// The delivery guarantee to use when the object itself currently
    /// replicates with `object_mode`
    pub fn effective_reliability(&self, object_mode: RmiReliability) -> RmiReliability {
        if self.attachment.follows_object() {
            object_mode
        } else {
            self.reliability
        }
    }

    pub fn direction(&self) -> RmiDirection {
        if self.is_server_call {
            RmiDirection::ToServer
        } else {
            RmiDirection::ToClient
        }
    }
}
