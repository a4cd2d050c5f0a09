use actnet_serde::{BitReader, BitWriter, Serde, SerdeErr};

use crate::{
    serialize::value_serializer::{SerializationTarget, ValueSerializer},
    types::EntityId,
};

/// Writes values to the wire. Names are not transmitted.
pub struct WireWriter {
    writer: BitWriter,
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            writer: BitWriter::new(),
        }
    }

    pub fn bits_written(&self) -> u32 {
        self.writer.bits_written()
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.writer.to_bytes()
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! write_values {
    ($($method:ident: $t:ty),*) => {$(
        fn $method(&mut self, _name: &str, value: &mut $t) {
            value.ser(&mut self.writer);
        }
    )*};
}

impl ValueSerializer for WireWriter {
    fn is_reading(&self) -> bool {
        false
    }

    fn target(&self) -> SerializationTarget {
        SerializationTarget::Network
    }

    fn is_ok(&self) -> bool {
        true
    }

    write_values!(
        value_bool: bool,
        value_u8: u8,
        value_u16: u16,
        value_u32: u32,
        value_i8: i8,
        value_i16: i16,
        value_i32: i32,
        value_f32: f32,
        value_string: String,
        value_vec3: [f32; 3],
        value_entity: EntityId
    );

    fn begin_group(&mut self, _name: &str) {}

    fn end_group(&mut self) {}

    fn begin_optional_group(&mut self, _name: &str, condition: bool) -> bool {
        condition.ser(&mut self.writer);
        condition
    }
}

/// Reads values written by a `WireWriter`. The first failure is latched;
/// later reads are skipped.
pub struct WireReader<'b> {
    reader: BitReader<'b>,
    error: Option<SerdeErr>,
    commit: bool,
}

impl<'b> WireReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            reader: BitReader::new(buffer),
            error: None,
            commit: true,
        }
    }

    /// A reader whose values are parsed but should not be applied
    pub fn new_uncommitted(buffer: &'b [u8]) -> Self {
        let mut reader = Self::new(buffer);
        reader.commit = false;
        reader
    }

    pub fn error(&self) -> Option<&SerdeErr> {
        self.error.as_ref()
    }

    fn read<T: Serde>(&mut self, value: &mut T) {
        if self.error.is_some() {
            return;
        }
        match T::de(&mut self.reader) {
            Ok(read) => *value = read,
            Err(err) => self.error = Some(err),
        }
    }
}

macro_rules! read_values {
    ($($method:ident: $t:ty),*) => {$(
        fn $method(&mut self, _name: &str, value: &mut $t) {
            self.read(value);
        }
    )*};
}

impl<'b> ValueSerializer for WireReader<'b> {
    fn is_reading(&self) -> bool {
        true
    }

    fn target(&self) -> SerializationTarget {
        SerializationTarget::Network
    }

    fn should_commit_values(&self) -> bool {
        self.commit
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    read_values!(
        value_bool: bool,
        value_u8: u8,
        value_u16: u16,
        value_u32: u32,
        value_i8: i8,
        value_i16: i16,
        value_i32: i32,
        value_f32: f32,
        value_string: String,
        value_vec3: [f32; 3],
        value_entity: EntityId
    );

    fn begin_group(&mut self, _name: &str) {}

    fn end_group(&mut self) {}

    fn begin_optional_group(&mut self, _name: &str, _condition: bool) -> bool {
        let mut present = false;
        self.read(&mut present);
        present
    }
}
