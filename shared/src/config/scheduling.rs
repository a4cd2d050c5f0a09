use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::config::error::ConfigError;

/// Network scheduling policy tags for one entity class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulingProfiles {
    /// Used when the local peer does not own the object
    pub normal: u32,
    /// Used when it does
    pub owned: u32,
}

#[derive(Deserialize)]
struct SchedulingFile {
    #[serde(default)]
    classes: HashMap<String, ClassEntry>,
}

#[derive(Deserialize)]
struct ClassEntry {
    normal: String,
    owned: Option<String>,
}

/// Packs a four character tag big-endian, so "pPly" reads the same in a
/// hex dump
pub fn pack_tag(tag: &str) -> Option<u32> {
    let bytes: [u8; 4] = tag.as_bytes().try_into().ok()?;
    if !bytes.is_ascii() {
        return None;
    }
    Some(u32::from_be_bytes(bytes))
}

/// Scheduling profiles by class name
#[derive(Clone, Debug, Default)]
pub struct SchedulingProfileTable {
    classes: HashMap<String, SchedulingProfiles>,
}

impl SchedulingProfileTable {
    /// Parses a table like
    ///
    /// ```toml
    /// [classes.Player]
    /// normal = "pPly"
    /// owned = "oPly"
    /// ```
    ///
    /// A class without an `owned` tag uses its `normal` tag for both.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: SchedulingFile = toml::from_str(source).map_err(ConfigError::parse)?;

        let mut classes = HashMap::with_capacity(file.classes.len());
        for (class, entry) in file.classes {
            let tag = |tag: &str| {
                pack_tag(tag).ok_or_else(|| ConfigError::InvalidTag {
                    class: class.clone(),
                    tag: tag.to_string(),
                })
            };
            let normal = tag(&entry.normal)?;
            let owned = match &entry.owned {
                Some(owned) => tag(owned)?,
                None => normal,
            };
            classes.insert(class, SchedulingProfiles { normal, owned });
        }
        Ok(Self { classes })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|error| ConfigError::read(path, error))?;
        Self::from_toml_str(&source)
    }

    pub fn get(&self, class: &str) -> Option<SchedulingProfiles> {
        self.classes.get(class).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
