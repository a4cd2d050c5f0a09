use std::collections::HashMap;

use crate::{establishment::EstablishmentError, types::ClassId};

/// Entity class names and the ids they are sent as. Both peers must agree
/// on the table; the server sends either the table itself or its hash.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    names: Vec<String>,
    ids: HashMap<String, ClassId>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the class's id, assigning the next one if it is new
    pub fn register(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len() as ClassId;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<ClassId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: ClassId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.ids.clear();
    }

    /// Every class in id order
    pub fn table(&self) -> Vec<(String, ClassId)> {
        self.names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id as ClassId))
            .collect()
    }

    /// CRC32 over the table in id order
    pub fn hash(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for (id, name) in self.names.iter().enumerate() {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
            hasher.update(&(id as ClassId).to_be_bytes());
        }
        hasher.finalize()
    }

    pub fn check_hash(&self, received: u32) -> Result<(), EstablishmentError> {
        let expected = self.hash();
        if expected == received {
            Ok(())
        } else {
            Err(EstablishmentError::ClassRegistryMismatch { expected, received })
        }
    }

    /// Adopts the server's id assignment. Every class it names must be
    /// known locally.
    pub fn apply_remote_table(&mut self, table: &[(String, ClassId)]) -> Result<(), EstablishmentError> {
        if let Some((name, _)) = table.iter().find(|(name, _)| !self.ids.contains_key(name)) {
            return Err(EstablishmentError::UnknownClass { name: name.clone() });
        }

        let mut sorted = table.to_vec();
        sorted.sort_by_key(|(_, id)| *id);
        let dense = sorted
            .iter()
            .enumerate()
            .all(|(index, (_, id))| *id as usize == index);
        if !dense {
            return Err(EstablishmentError::ClassRegistryMismatch {
                expected: self.hash(),
                received: 0,
            });
        }

        self.clear();
        for (name, _) in sorted {
            self.register(&name);
        }
        Ok(())
    }
}
