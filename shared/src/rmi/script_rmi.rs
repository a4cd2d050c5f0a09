use std::sync::Arc;

use actnet_serde::{BitReader, BitWriter, Serde, SerdeErr};

use crate::{
    aspect::{SyncPropertyType, SyncValue},
    rmi::{
        error::RmiError,
        rmi_record::{AtSyncItem, RmiAttachment, RmiReliability},
    },
    types::EntityId,
};

/// The scripting runtime, as far as remote calls are concerned
pub trait ScriptEnvironment: Send + Sync {
    fn has_function(&self, class: &str, function: &str) -> bool;

    /// Invokes a script method on an entity. Returns false if the call failed.
    fn call_function(&self, entity: EntityId, function: &str, args: &[SyncValue]) -> bool;
}

/// One call a script class declares in its server or client table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptRmiDeclaration {
    pub function: String,
    /// One type tag character per parameter
    pub format: String,
    pub reliability: RmiReliability,
    pub attachment: RmiAttachment,
}

impl ScriptRmiDeclaration {
    pub fn new(function: &str, format: &str, reliability: RmiReliability) -> Self {
        Self {
            function: function.to_string(),
            format: format.to_string(),
            reliability,
            attachment: RmiAttachment::NoAttach,
        }
    }
}

/// Table indices assigned to a validated script class
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptRmiBinding {
    pub server_calls: Vec<(String, u8)>,
    pub client_calls: Vec<(String, u8)>,
}

impl ScriptRmiBinding {
    pub fn server_index(&self, function: &str) -> Option<u8> {
        find_index(&self.server_calls, function)
    }

    pub fn client_index(&self, function: &str) -> Option<u8> {
        find_index(&self.client_calls, function)
    }
}

fn find_index(calls: &[(String, u8)], function: &str) -> Option<u8> {
    calls
        .iter()
        .find(|(name, _)| name == function)
        .map(|(_, index)| *index)
}

pub(crate) fn parse_format(function: &str, format: &str) -> Result<Vec<SyncPropertyType>, RmiError> {
    format
        .chars()
        .map(SyncPropertyType::from_format_char)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| RmiError::InvalidFormat {
            function: function.to_string(),
            format: format.to_string(),
        })
}

/// Encodes script call arguments according to `format`
pub fn encode_script_args(
    function: &str,
    format: &str,
    args: &[SyncValue],
) -> Result<Vec<u8>, RmiError> {
    let types = parse_format(function, format)?;
    let mismatch = || RmiError::ArgumentMismatch {
        function: function.to_string(),
        format: format.to_string(),
    };
    if types.len() != args.len() {
        return Err(mismatch());
    }

    let mut writer = BitWriter::new();
    for (property_type, arg) in types.iter().zip(args) {
        if arg.property_type() != *property_type {
            return Err(mismatch());
        }
        match arg {
            SyncValue::Bool(value) => value.ser(&mut writer),
            SyncValue::Float(value) => value.ser(&mut writer),
            SyncValue::Int8(value) => value.ser(&mut writer),
            SyncValue::Int16(value) => value.ser(&mut writer),
            SyncValue::Int32(value) => value.ser(&mut writer),
            SyncValue::String(value) | SyncValue::StringTable(value) => value.ser(&mut writer),
            SyncValue::EntityId(value) => value.ser(&mut writer),
            SyncValue::Vec3(value) => value.ser(&mut writer),
        }
    }
    Ok(writer.to_bytes())
}

/// Decodes script call arguments according to already-parsed type tags
pub fn decode_script_args(
    types: &[SyncPropertyType],
    reader: &mut BitReader,
) -> Result<Vec<SyncValue>, SerdeErr> {
    types
        .iter()
        .map(|property_type| {
            Ok(match property_type {
                SyncPropertyType::Bool => SyncValue::Bool(bool::de(reader)?),
                SyncPropertyType::Float => SyncValue::Float(f32::de(reader)?),
                SyncPropertyType::Int8 => SyncValue::Int8(i8::de(reader)?),
                SyncPropertyType::Int16 => SyncValue::Int16(i16::de(reader)?),
                SyncPropertyType::Int32 => SyncValue::Int32(i32::de(reader)?),
                SyncPropertyType::String => SyncValue::String(String::de(reader)?),
                SyncPropertyType::EntityId => SyncValue::EntityId(EntityId::de(reader)?),
                SyncPropertyType::Vec3 => SyncValue::Vec3(<[f32; 3]>::de(reader)?),
                SyncPropertyType::StringTable => SyncValue::StringTable(String::de(reader)?),
            })
        })
        .collect()
}

/// A decoded script call waiting to be run
pub struct ScriptCall {
    pub entity: EntityId,
    pub function: String,
    pub args: Vec<SyncValue>,
    environment: Arc<dyn ScriptEnvironment>,
}

impl ScriptCall {
    pub(crate) fn new(
        entity: EntityId,
        function: String,
        args: Vec<SyncValue>,
        environment: Arc<dyn ScriptEnvironment>,
    ) -> Self {
        Self {
            entity,
            function,
            args,
            environment,
        }
    }
}

impl AtSyncItem for ScriptCall {
    fn sync(&mut self) -> bool {
        self.environment
            .call_function(self.entity, &self.function, &self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_follow_the_format() {
        let args = vec![
            SyncValue::Int32(-4),
            SyncValue::String("door_07".to_string()),
            SyncValue::EntityId(12),
        ];
        let payload = encode_script_args("Open", "ise", &args).unwrap();

        let types = parse_format("Open", "ise").unwrap();
        let mut reader = BitReader::new(&payload);
        assert_eq!(decode_script_args(&types, &mut reader), Ok(args));
    }

    #[test]
    fn wrong_argument_type_is_rejected() {
        let result = encode_script_args("Open", "i", &[SyncValue::Float(1.0)]);
        assert!(matches!(result, Err(RmiError::ArgumentMismatch { .. })));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            parse_format("Open", "iq"),
            Err(RmiError::InvalidFormat { .. })
        ));
    }
}
