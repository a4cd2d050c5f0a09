use crate::{
    serialize::value_serializer::{SerializationTarget, ValueSerializer},
    types::EntityId,
};

#[derive(Clone, Debug, PartialEq)]
pub enum SavedValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    String(String),
    Vec3([f32; 3]),
    Entity(EntityId),
    BeginGroup,
    EndGroup,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedField {
    pub name: String,
    pub value: SavedValue,
}

/// Records named values and groups in the order they are written
#[derive(Default)]
pub struct SaveGameWriter {
    fields: Vec<SavedField>,
}

impl SaveGameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[SavedField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<SavedField> {
        self.fields
    }

    fn push(&mut self, name: &str, value: SavedValue) {
        self.fields.push(SavedField {
            name: name.to_string(),
            value,
        });
    }
}

macro_rules! save_values {
    ($($method:ident: $t:ty => $variant:ident),*) => {$(
        fn $method(&mut self, name: &str, value: &mut $t) {
            self.push(name, SavedValue::$variant(value.clone()));
        }
    )*};
}

impl ValueSerializer for SaveGameWriter {
    fn is_reading(&self) -> bool {
        false
    }

    fn target(&self) -> SerializationTarget {
        SerializationTarget::SaveGame
    }

    fn is_ok(&self) -> bool {
        true
    }

    save_values!(
        value_bool: bool => Bool,
        value_u8: u8 => U8,
        value_u16: u16 => U16,
        value_u32: u32 => U32,
        value_i8: i8 => I8,
        value_i16: i16 => I16,
        value_i32: i32 => I32,
        value_f32: f32 => F32,
        value_string: String => String,
        value_vec3: [f32; 3] => Vec3,
        value_entity: EntityId => Entity
    );

    fn value_u8_with_default(&mut self, name: &str, value: &mut u8, default: u8) {
        if *value != default {
            self.push(name, SavedValue::U8(*value));
        }
    }

    fn begin_group(&mut self, name: &str) {
        self.push(name, SavedValue::BeginGroup);
    }

    fn end_group(&mut self) {
        self.push("", SavedValue::EndGroup);
    }

    fn begin_optional_group(&mut self, name: &str, condition: bool) -> bool {
        if condition {
            self.begin_group(name);
        }
        condition
    }
}

/// Reads fields recorded by a `SaveGameWriter`. Each read must match the
/// next field by name and type, except defaulted values which may be absent.
pub struct SaveGameReader {
    fields: Vec<SavedField>,
    cursor: usize,
    failed: bool,
}

impl SaveGameReader {
    pub fn new(fields: Vec<SavedField>) -> Self {
        Self {
            fields,
            cursor: 0,
            failed: false,
        }
    }

    fn next_named(&self, name: &str) -> Option<&SavedValue> {
        self.fields
            .get(self.cursor)
            .filter(|field| field.name == name)
            .map(|field| &field.value)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }
}

macro_rules! load_values {
    ($($method:ident: $t:ty => $variant:ident),*) => {$(
        fn $method(&mut self, name: &str, value: &mut $t) {
            if self.failed {
                return;
            }
            match self.next_named(name) {
                Some(SavedValue::$variant(saved)) => {
                    *value = saved.clone();
                    self.advance();
                }
                _ => self.failed = true,
            }
        }
    )*};
}

impl ValueSerializer for SaveGameReader {
    fn is_reading(&self) -> bool {
        true
    }

    fn target(&self) -> SerializationTarget {
        SerializationTarget::SaveGame
    }

    fn is_ok(&self) -> bool {
        !self.failed
    }

    load_values!(
        value_bool: bool => Bool,
        value_u8: u8 => U8,
        value_u16: u16 => U16,
        value_u32: u32 => U32,
        value_i8: i8 => I8,
        value_i16: i16 => I16,
        value_i32: i32 => I32,
        value_f32: f32 => F32,
        value_string: String => String,
        value_vec3: [f32; 3] => Vec3,
        value_entity: EntityId => Entity
    );

    fn value_u8_with_default(&mut self, name: &str, value: &mut u8, default: u8) {
        if self.failed {
            return;
        }
        match self.next_named(name) {
            Some(SavedValue::U8(saved)) => {
                *value = *saved;
                self.advance();
            }
            Some(_) => self.failed = true,
            None => *value = default,
        }
    }

    fn begin_group(&mut self, name: &str) {
        if self.failed {
            return;
        }
        match self.next_named(name) {
            Some(SavedValue::BeginGroup) => self.advance(),
            _ => self.failed = true,
        }
    }

    fn end_group(&mut self) {
        if self.failed {
            return;
        }
        match self.fields.get(self.cursor).map(|field| &field.value) {
            Some(SavedValue::EndGroup) => self.advance(),
            _ => self.failed = true,
        }
    }

    fn begin_optional_group(&mut self, name: &str, _condition: bool) -> bool {
        if self.failed {
            return false;
        }
        match self.next_named(name) {
            Some(SavedValue::BeginGroup) => {
                self.advance();
                true
            }
            _ => false,
        }
    }
}
