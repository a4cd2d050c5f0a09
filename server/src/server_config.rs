use std::{default::Default, time::Duration};

use actnet_shared::config::ContextConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// How long a disconnected client's channel is kept for a fast
    /// reconnect. `None` disables holding channels.
    pub hold_grace_period: Option<Duration>,
    /// How long `ban_player` bans for
    pub ban_timeout: Duration,
    /// Used to configure context establishment
    pub context: ContextConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hold_grace_period: None,
            ban_timeout: Duration::from_secs(30 * 60),
            context: ContextConfig::default(),
        }
    }
}
