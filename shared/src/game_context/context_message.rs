use actnet_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::types::ClassId;

/// Handshake messages exchanged while establishing a context
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextMessage {
    /// The server's full class table
    ClassRegistration(Vec<(String, ClassId)>),
    /// CRC32 of the server's class table
    ClassHash(u32),
    /// The rules and level the client should load
    GameType {
        rules: String,
        level: String,
        load_new_level: bool,
    },
}

impl ContextMessage {
    fn kind(&self) -> u8 {
        match self {
            ContextMessage::ClassRegistration(_) => 0,
            ContextMessage::ClassHash(_) => 1,
            ContextMessage::GameType { .. } => 2,
        }
    }
}

impl Serde for ContextMessage {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.kind().ser(writer);
        match self {
            ContextMessage::ClassRegistration(table) => table.ser(writer),
            ContextMessage::ClassHash(hash) => hash.ser(writer),
            ContextMessage::GameType {
                rules,
                level,
                load_new_level,
            } => {
                rules.ser(writer);
                level.ser(writer);
                load_new_level.ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            0 => Ok(ContextMessage::ClassRegistration(Vec::de(reader)?)),
            1 => Ok(ContextMessage::ClassHash(u32::de(reader)?)),
            2 => Ok(ContextMessage::GameType {
                rules: String::de(reader)?,
                level: String::de(reader)?,
                load_new_level: bool::de(reader)?,
            }),
            _ => Err(SerdeErr::OutOfRange {
                type_name: "ContextMessage",
            }),
        }
    }

    fn bit_length(&self) -> u32 {
        let body = match self {
            ContextMessage::ClassRegistration(table) => table.bit_length(),
            ContextMessage::ClassHash(hash) => hash.bit_length(),
            ContextMessage::GameType {
                rules,
                level,
                load_new_level,
            } => rules.bit_length() + level.bit_length() + load_new_level.bit_length(),
        };
        self.kind().bit_length() + body
    }
}
