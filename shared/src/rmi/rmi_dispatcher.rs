use std::{collections::HashMap, sync::Arc};

use log::warn;

use actnet_serde::BitReader;

use crate::rmi::{
    error::RmiError,
    rmi_message::RmiMessage,
    rmi_record::{AtSyncItem, RmiDeclaration, RmiDirection, RmiHandler, RmiRecord},
    script_rmi::{
        decode_script_args, parse_format, ScriptCall, ScriptEnvironment, ScriptRmiBinding,
        ScriptRmiDeclaration,
    },
    sealed_table::{SealedTable, RMI_TABLE_CAPACITY},
};

/// Read-only view of both call tables, handed to each connection
#[derive(Clone, Copy, Debug)]
pub struct ProtocolDefinition<'a> {
    pub server_calls: &'a [RmiRecord],
    pub client_calls: &'a [RmiRecord],
}

/// Owns the server-bound and client-bound call tables. Interfaces register
/// during startup; the first `protocol_definition` seals both tables.
pub struct RmiDispatcher {
    server_calls: SealedTable<RmiRecord>,
    client_calls: SealedTable<RmiRecord>,
    interfaces: HashMap<String, Vec<(RmiDirection, u8)>>,
    script_classes: HashMap<String, ScriptRmiBinding>,
    script_validation: HashMap<String, Result<(), RmiError>>,
    script_environment: Option<Arc<dyn ScriptEnvironment>>,
}

impl RmiDispatcher {
    pub fn new() -> Self {
        Self {
            server_calls: SealedTable::new(),
            client_calls: SealedTable::new(),
            interfaces: HashMap::new(),
            script_classes: HashMap::new(),
            script_validation: HashMap::new(),
            script_environment: None,
        }
    }

    /// Registers every call of a native interface. Registering the same base
    /// twice returns the indices assigned the first time.
    ///
    /// Panics if the tables are sealed or full; see `try_register_interface`.
    pub fn register_interface(
        &mut self,
        base: &str,
        declarations: Vec<RmiDeclaration>,
    ) -> Vec<(RmiDirection, u8)> {
        match self.try_register_interface(base, declarations) {
            Ok(indices) => indices,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_register_interface(
        &mut self,
        base: &str,
        declarations: Vec<RmiDeclaration>,
    ) -> Result<Vec<(RmiDirection, u8)>, RmiError> {
        if let Some(indices) = self.interfaces.get(base) {
            return Ok(indices.clone());
        }

        let server_count = declarations
            .iter()
            .filter(|declaration| declaration.direction == RmiDirection::ToServer)
            .count();
        self.check_room(server_count, declarations.len() - server_count)?;

        let mut indices = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let direction = declaration.direction;
            let record = RmiRecord {
                description: declaration.description,
                handler: RmiHandler::Native(declaration.decoder),
                reliability: declaration.reliability,
                attachment: declaration.attachment,
                index: 0,
                is_server_call: direction == RmiDirection::ToServer,
                low_delay: declaration.low_delay,
            };
            indices.push((direction, self.push_record(direction, record)?));
        }

        self.interfaces.insert(base.to_string(), indices.clone());
        Ok(indices)
    }

    /// Registers the calls a script class declares. They share the native
    /// index space and are validated against the script environment the
    /// first time the class is set up for networking.
    ///
    /// Panics if the tables are sealed or full, or a format is malformed.
    pub fn register_script_class(
        &mut self,
        class: &str,
        server_calls: Vec<ScriptRmiDeclaration>,
        client_calls: Vec<ScriptRmiDeclaration>,
    ) -> ScriptRmiBinding {
        match self.try_register_script_class(class, server_calls, client_calls) {
            Ok(binding) => binding,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_register_script_class(
        &mut self,
        class: &str,
        server_calls: Vec<ScriptRmiDeclaration>,
        client_calls: Vec<ScriptRmiDeclaration>,
    ) -> Result<ScriptRmiBinding, RmiError> {
        if let Some(binding) = self.script_classes.get(class) {
            return Ok(binding.clone());
        }

        let mut server_types = Vec::with_capacity(server_calls.len());
        for declaration in &server_calls {
            server_types.push(parse_format(&declaration.function, &declaration.format)?);
        }
        let mut client_types = Vec::with_capacity(client_calls.len());
        for declaration in &client_calls {
            client_types.push(parse_format(&declaration.function, &declaration.format)?);
        }
        self.check_room(server_calls.len(), client_calls.len())?;

        let mut binding = ScriptRmiBinding::default();
        for (direction, declarations, types) in [
            (RmiDirection::ToServer, server_calls, server_types),
            (RmiDirection::ToClient, client_calls, client_types),
        ] {
            for (declaration, types) in declarations.into_iter().zip(types) {
                let record = RmiRecord {
                    description: format!("{}::{}", class, declaration.function),
                    handler: RmiHandler::Script {
                        class: class.to_string(),
                        function: declaration.function.clone(),
                        format: declaration.format,
                        types,
                    },
                    reliability: declaration.reliability,
                    attachment: declaration.attachment,
                    index: 0,
                    is_server_call: direction == RmiDirection::ToServer,
                    low_delay: false,
                };
                let index = self.push_record(direction, record)?;
                match direction {
                    RmiDirection::ToServer => binding.server_calls.push((declaration.function, index)),
                    RmiDirection::ToClient => binding.client_calls.push((declaration.function, index)),
                }
            }
        }

        self.script_classes.insert(class.to_string(), binding.clone());
        Ok(binding)
    }

    /// Replaces the scripting environment. Previous validation results are
    /// discarded.
    pub fn set_script_environment(&mut self, environment: Option<Arc<dyn ScriptEnvironment>>) {
        self.script_environment = environment;
        self.script_validation.clear();
    }

    /// Validates a script class's declared calls against the scripting
    /// environment. The outcome is computed once per class and remembered.
    pub fn setup_class_for_network(&mut self, class: &str) -> Result<&ScriptRmiBinding, RmiError> {
        let Some(binding) = self.script_classes.get(class) else {
            return Err(RmiError::UnknownScriptClass {
                class: class.to_string(),
            });
        };

        let environment = self.script_environment.as_ref();
        let outcome = self
            .script_validation
            .entry(class.to_string())
            .or_insert_with(|| {
                binding
                    .server_calls
                    .iter()
                    .chain(binding.client_calls.iter())
                    .find(|(function, _)| {
                        !environment.is_some_and(|env| env.has_function(class, function))
                    })
                    .map_or(Ok(()), |(function, _)| {
                        Err(RmiError::MissingScriptFunction {
                            class: class.to_string(),
                            function: function.clone(),
                        })
                    })
            });

        match outcome {
            Ok(()) => Ok(binding),
            Err(error) => Err(error.clone()),
        }
    }

    /// Seals both tables and returns read-only views of them
    pub fn protocol_definition(&mut self) -> ProtocolDefinition<'_> {
        self.server_calls.seal();
        self.client_calls.seal();
        ProtocolDefinition {
            server_calls: self.server_calls.as_slice(),
            client_calls: self.client_calls.as_slice(),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.server_calls.is_sealed()
    }

    pub fn record(&self, direction: RmiDirection, index: u8) -> Option<&RmiRecord> {
        self.table(direction).get(index)
    }

    pub fn call_count(&self, direction: RmiDirection) -> usize {
        self.table(direction).len()
    }

    /// Decodes an incoming call. A returned item is applied at the next
    /// sync point.
    pub fn handle_rmi(
        &self,
        direction: RmiDirection,
        message: &RmiMessage,
    ) -> Result<Option<Box<dyn AtSyncItem>>, RmiError> {
        let index = message.index;
        let Some(record) = self.table(direction).get(index) else {
            warn!("Received unknown {:?} RMI index {}", direction, index);
            return Err(RmiError::UnknownIndex { direction, index });
        };

        let mut reader = BitReader::new(&message.payload);
        match &record.handler {
            RmiHandler::Native(decoder) => decoder(&mut reader, message.object)
                .map_err(|error| RmiError::Decode { index, error }),
            RmiHandler::Script {
                class,
                function,
                types,
                ..
            } => {
                let validated = matches!(self.script_validation.get(class), Some(Ok(())));
                let environment = match (&self.script_environment, validated) {
                    (Some(environment), true) => environment.clone(),
                    _ => {
                        return Err(RmiError::ScriptClassNotValidated {
                            class: class.clone(),
                        })
                    }
                };
                let args = decode_script_args(types, &mut reader)
                    .map_err(|error| RmiError::Decode { index, error })?;
                Ok(Some(Box::new(ScriptCall::new(
                    message.object,
                    function.clone(),
                    args,
                    environment,
                ))))
            }
        }
    }

    fn table(&self, direction: RmiDirection) -> &SealedTable<RmiRecord> {
        match direction {
            RmiDirection::ToServer => &self.server_calls,
            RmiDirection::ToClient => &self.client_calls,
        }
    }

    fn check_room(&self, server_count: usize, client_count: usize) -> Result<(), RmiError> {
        if self.is_sealed() {
            return Err(RmiError::TableSealed);
        }
        if self.server_calls.len() + server_count > RMI_TABLE_CAPACITY
            || self.client_calls.len() + client_count > RMI_TABLE_CAPACITY
        {
            return Err(RmiError::TableFull {
                capacity: RMI_TABLE_CAPACITY,
            });
        }
        Ok(())
    }

    fn push_record(&mut self, direction: RmiDirection, mut record: RmiRecord) -> Result<u8, RmiError> {
        let table = match direction {
            RmiDirection::ToServer => &mut self.server_calls,
            RmiDirection::ToClient => &mut self.client_calls,
        };
        record.index = table.len() as u8;
        table.try_push(record)
    }
}

impl Default for RmiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
