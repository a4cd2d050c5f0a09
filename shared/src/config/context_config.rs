use std::{default::Default, time::Duration};

/// Contains Config properties used while establishing a game context
#[derive(Clone, Debug)]
pub struct ContextConfig {
    /// Whether the server sends its class registry to joining clients
    /// instead of relying on both sides registering classes identically
    pub sync_class_registry: bool,
    /// How long a starting server waits for clients that are still
    /// connecting before loading the level. Zero disables the wait.
    pub pending_connection_wait: Duration,
    /// Added to the wait each time another client starts connecting
    pub pending_connection_extension: Duration,
    /// How long an editor session waits for permission to send the
    /// client-connect notification before sending it anyway
    pub allow_connect_deadline: Duration,
    pub editor: bool,
    pub dedicated: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sync_class_registry: false,
            pending_connection_wait: Duration::ZERO,
            pending_connection_extension: Duration::from_secs(5),
            allow_connect_deadline: Duration::from_secs(20),
            editor: false,
            dedicated: false,
        }
    }
}
