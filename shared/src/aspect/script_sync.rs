use crate::{serialize::value_serializer::ValueSerializer, types::EntityId};

/// Wire type of a script-exposed synchronized property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPropertyType {
    Bool,
    Float,
    Int8,
    Int16,
    Int32,
    String,
    EntityId,
    Vec3,
    StringTable,
}

impl SyncPropertyType {
    /// Parses one character of an RMI parameter format string
    pub fn from_format_char(tag: char) -> Option<SyncPropertyType> {
        match tag {
            'b' => Some(SyncPropertyType::Bool),
            'f' => Some(SyncPropertyType::Float),
            'c' => Some(SyncPropertyType::Int8),
            'h' => Some(SyncPropertyType::Int16),
            'i' => Some(SyncPropertyType::Int32),
            's' => Some(SyncPropertyType::String),
            'e' => Some(SyncPropertyType::EntityId),
            'v' => Some(SyncPropertyType::Vec3),
            't' => Some(SyncPropertyType::StringTable),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SyncValue {
    Bool(bool),
    Float(f32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    String(String),
    EntityId(EntityId),
    Vec3([f32; 3]),
    StringTable(String),
}

impl SyncValue {
    pub fn property_type(&self) -> SyncPropertyType {
        match self {
            SyncValue::Bool(_) => SyncPropertyType::Bool,
            SyncValue::Float(_) => SyncPropertyType::Float,
            SyncValue::Int8(_) => SyncPropertyType::Int8,
            SyncValue::Int16(_) => SyncPropertyType::Int16,
            SyncValue::Int32(_) => SyncPropertyType::Int32,
            SyncValue::String(_) => SyncPropertyType::String,
            SyncValue::EntityId(_) => SyncPropertyType::EntityId,
            SyncValue::Vec3(_) => SyncPropertyType::Vec3,
            SyncValue::StringTable(_) => SyncPropertyType::StringTable,
        }
    }

    pub fn default_for(property_type: SyncPropertyType) -> SyncValue {
        match property_type {
            SyncPropertyType::Bool => SyncValue::Bool(false),
            SyncPropertyType::Float => SyncValue::Float(0.0),
            SyncPropertyType::Int8 => SyncValue::Int8(0),
            SyncPropertyType::Int16 => SyncValue::Int16(0),
            SyncPropertyType::Int32 => SyncValue::Int32(0),
            SyncPropertyType::String => SyncValue::String(String::new()),
            SyncPropertyType::EntityId => SyncValue::EntityId(0),
            SyncPropertyType::Vec3 => SyncValue::Vec3([0.0; 3]),
            SyncPropertyType::StringTable => SyncValue::StringTable(String::new()),
        }
    }

    /// Reads or writes the value under `name`
    pub fn serialize(&mut self, name: &str, serializer: &mut dyn ValueSerializer) {
        match self {
            SyncValue::Bool(value) => serializer.value_bool(name, value),
            SyncValue::Float(value) => serializer.value_f32(name, value),
            SyncValue::Int8(value) => serializer.value_i8(name, value),
            SyncValue::Int16(value) => serializer.value_i16(name, value),
            SyncValue::Int32(value) => serializer.value_i32(name, value),
            SyncValue::String(value) | SyncValue::StringTable(value) => {
                serializer.value_string(name, value)
            }
            SyncValue::EntityId(value) => serializer.value_entity(name, value),
            SyncValue::Vec3(value) => serializer.value_vec3(name, value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncedProperty {
    pub name: String,
    pub declared: SyncPropertyType,
    pub value: SyncValue,
}

impl SyncedProperty {
    pub fn new(name: &str, value: SyncValue) -> Self {
        Self {
            name: name.to_string(),
            declared: value.property_type(),
            value,
        }
    }
}

/// The script-side state of an entity
pub trait ScriptComponent {
    /// Engine-level script state, serialized before the synced properties
    fn game_serialize(&mut self, serializer: &mut dyn ValueSerializer);

    fn synced_properties(&mut self) -> &mut Vec<SyncedProperty>;
}

/// Serializes every synced property against its declared type. Returns
/// false if a property's value no longer matches its declaration or the
/// serializer fails.
pub fn serialize_synced_properties(
    properties: &mut [SyncedProperty],
    serializer: &mut dyn ValueSerializer,
) -> bool {
    serializer.begin_group("ScriptProperties");
    for property in properties.iter_mut() {
        if property.value.property_type() != property.declared {
            return false;
        }
        let mut value = property.value.clone();
        value.serialize(&property.name, serializer);
        if !serializer.is_ok() {
            return false;
        }
        if serializer.is_writing() || serializer.should_commit_values() {
            property.value = value;
        }
    }
    serializer.end_group();
    serializer.is_ok()
}
