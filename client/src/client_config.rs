use std::default::Default;

use actnet_shared::config::ContextConfig;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Used to configure context establishment
    pub context: ContextConfig,
}
