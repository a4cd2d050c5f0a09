use thiserror::Error;

/// Errors raised while loading configuration files. All of them are fatal
/// at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    /// Scheduling tags must be exactly four ASCII characters
    #[error("Class '{class}' has invalid scheduling tag '{tag}', expected four ASCII characters")]
    InvalidTag { class: String, tag: String },
}

impl ConfigError {
    pub(crate) fn read(path: &std::path::Path, error: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn parse(error: toml::de::Error) -> Self {
        ConfigError::Parse {
            message: error.to_string(),
        }
    }
}
