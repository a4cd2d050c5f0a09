use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use log::warn;

use crate::{
    config::SerializationOrder,
    extension::{error::ExtensionError, extension::GameObjectExtension},
};

/// At most this many game object events can be registered, so that every
/// extension's event interest fits in a `u64`
pub const MAX_GAME_OBJECT_EVENTS: usize = 64;

const UNLISTED_PRIORITY: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtensionId(u16);

impl ExtensionId {
    pub fn to_u16(self) -> u16 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(u8);

impl EventId {
    pub const BECOME_VISIBLE: EventId = EventId(0);
    pub const ENABLE_PHYSICS: EventId = EventId(1);
    pub const DISABLE_PHYSICS: EventId = EventId(2);

    pub fn interest_bit(self) -> u64 {
        1u64 << self.0
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }
}

pub type ExtensionFactory = Box<dyn Fn() -> Box<dyn GameObjectExtension> + Send + Sync>;

struct ExtensionEntry {
    name: String,
    factory: ExtensionFactory,
    serialization_priority: u32,
}

/// Maps extension names to small sequential ids and factories, and game
/// object event names to event ids. Owned by the simulation root and shared
/// with every game object; it locks the first time a game object is built.
pub struct ExtensionRegistry {
    entries: Vec<ExtensionEntry>,
    ids: HashMap<String, ExtensionId>,
    events: Vec<String>,
    locked: AtomicBool,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            ids: HashMap::new(),
            events: Vec::new(),
            locked: AtomicBool::new(false),
        };
        registry.events.push("BecomeVisible".to_string());
        registry.events.push("EnablePhysics".to_string());
        registry.events.push("DisablePhysics".to_string());
        registry
    }

    /// Registers an extension, panicking if the name is taken or the
    /// registry is locked
    pub fn register_extension(&mut self, name: &str, factory: ExtensionFactory) -> ExtensionId {
        match self.try_register_extension(name, factory) {
            Ok(id) => id,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_register_extension(
        &mut self,
        name: &str,
        factory: ExtensionFactory,
    ) -> Result<ExtensionId, ExtensionError> {
        self.try_check_lock()?;
        if self.ids.contains_key(name) {
            return Err(ExtensionError::DuplicateName {
                name: name.to_string(),
            });
        }
        let id = ExtensionId(self.entries.len() as u16);
        self.entries.push(ExtensionEntry {
            name: name.to_string(),
            factory,
            serialization_priority: UNLISTED_PRIORITY,
        });
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Registers a game object event name, returning the existing id if the
    /// name is already known
    pub fn register_event(&mut self, name: &str) -> EventId {
        match self.try_register_event(name) {
            Ok(id) => id,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_register_event(&mut self, name: &str) -> Result<EventId, ExtensionError> {
        if let Some(id) = self.event_id(name) {
            return Ok(id);
        }
        self.try_check_lock()?;
        if self.events.len() >= MAX_GAME_OBJECT_EVENTS {
            return Err(ExtensionError::TooManyEvents {
                name: name.to_string(),
                limit: MAX_GAME_OBJECT_EVENTS,
            });
        }
        let id = EventId(self.events.len() as u8);
        self.events.push(name.to_string());
        Ok(id)
    }

    /// Ranks extensions for save games by their position in `order`.
    /// Extensions not in the list keep the lowest priority.
    pub fn apply_serialization_order(&mut self, order: &SerializationOrder) {
        for (position, name) in order.names().iter().enumerate() {
            match self.ids.get(name.as_str()) {
                Some(id) => {
                    self.entries[id.0 as usize].serialization_priority = position as u32;
                }
                None => {
                    warn!("Serialization order names unknown extension '{}'", name);
                }
            }
        }
    }

    pub fn id(&self, name: &str) -> Option<ExtensionId> {
        self.ids.get(name).copied()
    }

    pub fn try_id(&self, name: &str) -> Result<ExtensionId, ExtensionError> {
        self.id(name).ok_or_else(|| ExtensionError::UnknownName {
            name: name.to_string(),
        })
    }

    pub fn name(&self, id: ExtensionId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|entry| entry.name.as_str())
    }

    pub fn event_id(&self, name: &str) -> Option<EventId> {
        self.events
            .iter()
            .position(|event| event == name)
            .map(|index| EventId(index as u8))
    }

    pub fn event_name(&self, id: EventId) -> Option<&str> {
        self.events.get(id.0 as usize).map(String::as_str)
    }

    pub fn serialization_priority(&self, id: ExtensionId) -> u32 {
        self.entries
            .get(id.0 as usize)
            .map(|entry| entry.serialization_priority)
            .unwrap_or(UNLISTED_PRIORITY)
    }

    pub fn instantiate(&self, id: ExtensionId) -> Option<Box<dyn GameObjectExtension>> {
        self.entries
            .get(id.0 as usize)
            .map(|entry| (entry.factory)())
    }

    pub fn extension_count(&self) -> usize {
        self.entries.len()
    }

    pub fn lock(&self) {
        self.locked.store(true, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Checks if the registry is locked, returns an error if it is
    pub fn try_check_lock(&self) -> Result<(), ExtensionError> {
        if self.is_locked() {
            Err(ExtensionError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if the registry is locked, panics if it is
    pub fn check_lock(&self) {
        if self.is_locked() {
            panic!("ExtensionRegistry already locked!");
        }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
