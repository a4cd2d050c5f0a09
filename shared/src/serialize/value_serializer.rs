use crate::types::EntityId;

/// Where the serialized values are headed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializationTarget {
    Network,
    SaveGame,
}

/// Reads or writes named, typed values. The same code path serves both
/// directions: when reading, each `value_*` call overwrites its argument.
pub trait ValueSerializer {
    fn is_reading(&self) -> bool;

    fn is_writing(&self) -> bool {
        !self.is_reading()
    }

    fn target(&self) -> SerializationTarget;

    /// False while reading a value that will be discarded (e.g. a
    /// snapshot that is only being skipped over)
    fn should_commit_values(&self) -> bool {
        true
    }

    /// False once a read has failed; later reads leave their values as-is
    fn is_ok(&self) -> bool;

    fn value_bool(&mut self, name: &str, value: &mut bool);
    fn value_u8(&mut self, name: &str, value: &mut u8);
    fn value_u16(&mut self, name: &str, value: &mut u16);
    fn value_u32(&mut self, name: &str, value: &mut u32);
    fn value_i8(&mut self, name: &str, value: &mut i8);
    fn value_i16(&mut self, name: &str, value: &mut i16);
    fn value_i32(&mut self, name: &str, value: &mut i32);
    fn value_f32(&mut self, name: &str, value: &mut f32);
    fn value_string(&mut self, name: &str, value: &mut String);
    fn value_vec3(&mut self, name: &str, value: &mut [f32; 3]);
    fn value_entity(&mut self, name: &str, value: &mut EntityId);

    /// Like `value_u8`, but serializers that support it may omit the value
    /// when it equals `default`
    fn value_u8_with_default(&mut self, name: &str, value: &mut u8, _default: u8) {
        self.value_u8(name, value);
    }

    fn begin_group(&mut self, name: &str);
    fn end_group(&mut self);

    /// Opens a group only if `condition` holds (when writing) or if the
    /// group is present (when reading)
    fn begin_optional_group(&mut self, name: &str, condition: bool) -> bool;
}
