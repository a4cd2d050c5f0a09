use std::{collections::HashSet, fs, path::Path};

use log::warn;
use serde::Deserialize;

use crate::config::error::ConfigError;

#[derive(Deserialize)]
struct OrderFile {
    #[serde(default)]
    order: Vec<String>,
}

/// The order extensions are written to save games in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializationOrder {
    names: Vec<String>,
}

impl SerializationOrder {
    pub fn from_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        let mut order = Self::default();
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name) {
                warn!("Extension '{}' appears twice in the serialization order", name);
                continue;
            }
            order.names.push(name.to_string());
        }
        order
    }

    /// Parses `order = ["A", "B"]`
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: OrderFile = toml::from_str(source).map_err(ConfigError::parse)?;
        Ok(Self::from_names(file.order.iter().map(String::as_str)))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|error| ConfigError::read(path, error))?;
        Self::from_toml_str(&source)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
