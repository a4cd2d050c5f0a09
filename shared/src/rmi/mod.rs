mod error;
mod invoke;
mod rmi_dispatcher;
mod rmi_message;
mod rmi_record;
mod script_rmi;
mod sealed_table;

pub use error::RmiError;
pub use invoke::{invoke_rmi, RmiChannelSet, RmiDestinations, RmiInvokeReport, RmiRejection};
pub use rmi_dispatcher::{ProtocolDefinition, RmiDispatcher};
pub use rmi_message::{RmiBody, RmiMessage};
pub use rmi_record::{
    AtSyncItem, NativeDecoder, RmiAttachment, RmiDeclaration, RmiDirection, RmiHandler,
    RmiRecord, RmiReliability,
};
pub use script_rmi::{
    decode_script_args, encode_script_args, ScriptCall, ScriptEnvironment, ScriptRmiBinding,
    ScriptRmiDeclaration,
};
pub use sealed_table::{SealedTable, RMI_TABLE_CAPACITY};
