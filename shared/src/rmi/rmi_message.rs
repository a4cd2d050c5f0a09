use actnet_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{rmi::rmi_record::RmiReliability, types::EntityId};

/// The single generic entity RMI message. The one-byte table index is
/// encoded first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RmiMessage {
    pub index: u8,
    pub object: EntityId,
    pub payload: Vec<u8>,
}

impl RmiMessage {
    pub fn new(index: u8, object: EntityId, payload: Vec<u8>) -> Self {
        Self {
            index,
            object,
            payload,
        }
    }

    /// Builds a message whose payload is written by `write`
    pub fn with_payload<F: FnOnce(&mut BitWriter)>(index: u8, object: EntityId, write: F) -> Self {
        let mut writer = BitWriter::new();
        write(&mut writer);
        Self::new(index, object, writer.to_bytes())
    }
}

impl Serde for RmiMessage {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.index.ser(writer);
        self.object.ser(writer);
        self.payload.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let index = u8::de(reader)?;
        let object = EntityId::de(reader)?;
        let payload = Vec::<u8>::de(reader)?;
        Ok(Self {
            index,
            object,
            payload,
        })
    }

    fn bit_length(&self) -> u32 {
        self.index.bit_length() + self.object.bit_length() + self.payload.bit_length()
    }
}

/// A message ready to go out on a channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RmiBody {
    pub message: RmiMessage,
    pub reliability: RmiReliability,
}

impl RmiBody {
    pub fn new(message: RmiMessage, reliability: RmiReliability) -> Self {
        Self {
            message,
            reliability,
        }
    }
}
