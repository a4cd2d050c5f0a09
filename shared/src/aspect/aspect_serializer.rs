use log::warn;

use crate::{
    aspect::{
        aspect::{Aspect, AspectMask},
        script_sync::{serialize_synced_properties, ScriptComponent},
    },
    serialize::value_serializer::ValueSerializer,
    types::EntityId,
};

/// Passed to `net_serialize` when a physics snapshot should be applied with
/// time-drift compensation
pub const SERIALIZE_COMPENSATE_TIME_DIFF: u32 = 0x01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynchResult {
    Ok,
    /// The snapshot was intentionally ignored
    Skip,
    Failed,
}

/// An entity that serializes its own aspects
pub trait NetSerializable {
    fn net_serialize(
        &mut self,
        serializer: &mut dyn ValueSerializer,
        aspect: Aspect,
        profile: u8,
        flags: u32,
    ) -> bool;

    fn aspect_profile(&self, aspect: Aspect) -> u8;

    fn supported_aspects(&self) -> AspectMask {
        AspectMask::ALL
    }
}

/// Entity lookup used while synchronizing
pub trait NetEntityWorld {
    fn net_entity(&mut self, entity: EntityId) -> Option<&mut dyn NetSerializable>;

    fn script_component(&mut self, entity: EntityId) -> Option<&mut dyn ScriptComponent>;
}

/// Physics time-step service consulted before reading the physics aspect
pub trait PhysicsSync {
    /// The incoming snapshot is a duplicate or arrived out of order
    fn ignore_snapshot(&self) -> bool;

    fn need_to_catchup(&self) -> bool;

    fn updated_entity(&mut self, entity: EntityId);
}

/// Synchronizes one entity's aspects for one wire exchange
pub struct AspectSerializer {
    physics_sync: Option<Box<dyn PhysicsSync>>,
    failure_count: u64,
    verbose: bool,
}

impl AspectSerializer {
    pub fn new() -> Self {
        Self {
            physics_sync: None,
            failure_count: 0,
            verbose: false,
        }
    }

    pub fn set_physics_sync(&mut self, physics_sync: Option<Box<dyn PhysicsSync>>) {
        self.physics_sync = physics_sync;
    }

    /// Log a warning for every failed aspect
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn synch_object(
        &mut self,
        world: &mut dyn NetEntityWorld,
        entity: EntityId,
        aspect: Aspect,
        profile: u8,
        serializer: &mut dyn ValueSerializer,
    ) -> SynchResult {
        let result = self.synch(world, entity, aspect, profile, serializer);
        if result == SynchResult::Failed {
            self.failure_count += 1;
        }
        result
    }

    fn synch(
        &mut self,
        world: &mut dyn NetEntityWorld,
        entity: EntityId,
        aspect: Aspect,
        profile: u8,
        serializer: &mut dyn ValueSerializer,
    ) -> SynchResult {
        let Some(net_entity) = world.net_entity(entity) else {
            warn!("Trying to synchronize non-existent entity {}", entity);
            return SynchResult::Failed;
        };
        if !net_entity.supported_aspects().contains(aspect) {
            if self.verbose {
                warn!("Entity {} does not declare aspect {}", entity, aspect.index());
            }
            return SynchResult::Failed;
        }

        if aspect == Aspect::SCRIPT {
            return self.synch_script(world, entity, serializer);
        }

        let mut flags = 0;
        let reading_physics = aspect == Aspect::PHYSICS && serializer.is_reading();
        if reading_physics {
            if let Some(physics_sync) = self.physics_sync.as_ref() {
                if physics_sync.ignore_snapshot() {
                    return SynchResult::Skip;
                }
                if physics_sync.need_to_catchup() {
                    flags |= SERIALIZE_COMPENSATE_TIME_DIFF;
                }
            }
        }

        let Some(net_entity) = world.net_entity(entity) else {
            return SynchResult::Failed;
        };
        if !net_entity.net_serialize(serializer, aspect, profile, flags) || !serializer.is_ok() {
            if self.verbose {
                warn!(
                    "Entity {} fails to serialize aspect {} on profile {}",
                    entity,
                    aspect.index(),
                    profile
                );
            }
            return SynchResult::Failed;
        }

        if reading_physics && serializer.should_commit_values() {
            if let Some(physics_sync) = self.physics_sync.as_mut() {
                physics_sync.updated_entity(entity);
            }
        }
        SynchResult::Ok
    }

    fn synch_script(
        &mut self,
        world: &mut dyn NetEntityWorld,
        entity: EntityId,
        serializer: &mut dyn ValueSerializer,
    ) -> SynchResult {
        let Some(script) = world.script_component(entity) else {
            return SynchResult::Ok;
        };
        script.game_serialize(serializer);
        if !serialize_synced_properties(script.synced_properties(), serializer) {
            if self.verbose {
                warn!("Entity {}: failed to serialize script aspect", entity);
            }
            return SynchResult::Failed;
        }
        SynchResult::Ok
    }
}

impl Default for AspectSerializer {
    fn default() -> Self {
        Self::new()
    }
}
