use std::sync::Arc;

use log::{info, warn};

use crate::{
    aspect::{Aspect, NetSerializable, DEFAULT_ASPECT_PROFILE, NUM_ASPECTS},
    config::SchedulingProfiles,
    extension::{
        EventId, ExtensionChange, ExtensionCommand, ExtensionCommands, ExtensionId,
        ExtensionRegistry,
    },
    game_object::{
        distance_checker::DistanceChecker,
        error::GameObjectError,
        event::{GameObjectEvent, EVENT_TO_EXTENSIONS, EVENT_TO_GAME_OBJECT},
        extension_record::{ExtensionRecord, MAX_UPDATE_SLOTS},
        notice::GameObjectNotice,
        physics_gate::PhysicsCallbackGate,
        update_policy::{
            AiActivationMode, PhysicsDisablePolicy, PrePhysicsUpdateRule, SlotConditions,
            UpdateEnableCondition,
        },
        update_state::{
            test_is_probably_distant, test_is_probably_visible, wants_render_event,
            UpdateState, UpdateStateEvent, FAR_AWAY_DISTANCE, UPDATE_TIMEOUT_HUGE,
        },
    },
    serialize::value_serializer::ValueSerializer,
    types::{ChannelId, EntityId},
};

/// At most this many extensions can be added, and this many removed, while
/// a game object is updating
pub const MAX_PENDING_CHANGES: usize = 16;

const INITIAL_UPDATE_TIMER: f32 = 0.1;

cfg_if! {
    if #[cfg(feature = "debug_update_state")] {
        fn log_transition(entity_id: EntityId, from: UpdateState, to: UpdateState) {
            info!("entity {}: update state {:?} -> {:?}", entity_id, from, to);
        }
    } else {
        fn log_transition(_entity_id: EntityId, _from: UpdateState, _to: UpdateState) {}
    }
}

// PendingChanges
/// Extension adds and removes requested while the owning object is inside
/// `update`. Merged once the update pass is complete.
#[derive(Default)]
struct PendingChanges {
    adds: Vec<ExtensionRecord>,
    removes: Vec<ExtensionId>,
}

impl PendingChanges {
    fn stage_add(&mut self, record: ExtensionRecord) {
        if self.adds.len() == MAX_PENDING_CHANGES {
            panic!("Too many extensions added in a single frame");
        }
        self.adds.push(record);
    }

    fn stage_remove(&mut self, id: ExtensionId) {
        if self.removes.contains(&id) {
            return;
        }
        if self.removes.len() == MAX_PENDING_CHANGES {
            panic!("Trying to remove too many game object extensions in one frame");
        }
        self.removes.push(id);
    }
}

fn find_record_mut<'a>(
    extensions: &'a mut [ExtensionRecord],
    pending: Option<&'a mut PendingChanges>,
    id: ExtensionId,
) -> Option<&'a mut ExtensionRecord> {
    if let Ok(index) = extensions.binary_search_by_key(&id, |record| record.id) {
        return Some(&mut extensions[index]);
    }
    pending.and_then(|pending| pending.adds.iter_mut().find(|record| record.id == id))
}

/// A networked object with a sorted set of extensions, and the state
/// machine deciding when those extensions get updated.
pub struct GameObject {
    entity_id: EntityId,
    registry: Arc<ExtensionRegistry>,
    extensions: Vec<ExtensionRecord>,
    initialized: bool,

    update_state: UpdateState,
    update_timer: f32,
    sends_render_event: bool,
    in_range: bool,
    distance_checker: DistanceChecker,

    hidden: bool,
    update_hidden: bool,
    has_ai: bool,
    ai_mode: AiActivationMode,
    pre_physics_rule: PrePhysicsUpdateRule,
    pre_physics_enabled: bool,
    physics_policy: PhysicsDisablePolicy,
    physics_disabled: bool,
    active: bool,
    force_update: i32,
    events_enabled: bool,

    aspect_profiles: [u8; NUM_ASPECTS],
    scheduling: Option<SchedulingProfiles>,
    channel_id: ChannelId,
    notices: Vec<GameObjectNotice>,
    gate: PhysicsCallbackGate,
}

impl GameObject {
    pub fn new(entity_id: EntityId, registry: Arc<ExtensionRegistry>) -> Self {
        registry.lock();
        Self {
            entity_id,
            registry,
            extensions: Vec::new(),
            initialized: false,
            update_state: UpdateState::NotVisibleFar,
            update_timer: INITIAL_UPDATE_TIMER,
            sends_render_event: false,
            in_range: false,
            distance_checker: DistanceChecker::new(),
            hidden: false,
            update_hidden: false,
            has_ai: false,
            ai_mode: AiActivationMode::VisibleOrInRange,
            pre_physics_rule: PrePhysicsUpdateRule::Never,
            pre_physics_enabled: false,
            physics_policy: PhysicsDisablePolicy::Never,
            physics_disabled: false,
            active: false,
            force_update: 0,
            events_enabled: true,
            aspect_profiles: [DEFAULT_ASPECT_PROFILE; NUM_ASPECTS],
            scheduling: None,
            channel_id: 0,
            notices: Vec::new(),
            gate: PhysicsCallbackGate::new(),
        }
    }

    /// Instantiates every extension activated so far. Those extensions
    /// become sticky. Returns false if any of them fails to initialize.
    pub fn init(&mut self) -> bool {
        self.initialized = true;
        let placeholders: Vec<ExtensionId> = std::mem::take(&mut self.extensions)
            .into_iter()
            .map(|record| record.id)
            .collect();

        for id in placeholders {
            if !self.change_extension(id, ExtensionChange::Activate, None).unwrap_or(false) {
                warn!(
                    "Entity {}: couldn't activate extension '{}'",
                    self.entity_id,
                    self.registry.name(id).unwrap_or("?")
                );
                return false;
            }
        }

        for record in self.extensions.iter_mut() {
            record.sticky = record.activated;
            record.activated = false;
        }

        self.sends_render_event = true;
        self.evaluate_update_activation(None);
        true
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    // Extensions

    pub fn activate_extension(&mut self, name: &str) -> bool {
        self.change_extension_named(name, ExtensionChange::Activate, None)
    }

    pub fn deactivate_extension(&mut self, name: &str) -> bool {
        self.change_extension_named(name, ExtensionChange::Deactivate, None)
    }

    pub fn acquire_extension(&mut self, name: &str) -> bool {
        self.change_extension_named(name, ExtensionChange::Acquire, None)
    }

    /// Drops one reference to an extension. Panics if the extension is not
    /// present on this object.
    pub fn release_extension(&mut self, name: &str) {
        self.change_extension_named(name, ExtensionChange::Release, None);
    }

    pub fn try_release_extension(&mut self, name: &str) -> Result<(), GameObjectError> {
        let id = self
            .registry
            .id(name)
            .ok_or_else(|| GameObjectError::UnknownExtension {
                name: name.to_string(),
            })?;
        self.change_extension(id, ExtensionChange::Release, None)?;
        Ok(())
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.registry
            .id(name)
            .map(|id| self.find(id).is_ok())
            .unwrap_or(false)
    }

    pub fn extension_record(&self, id: ExtensionId) -> Option<&ExtensionRecord> {
        self.find(id).ok().map(|index| &self.extensions[index])
    }

    /// Extension ids in update order
    pub fn extension_ids(&self) -> Vec<ExtensionId> {
        self.extensions.iter().map(|record| record.id).collect()
    }

    /// Converts sticky extensions into activated ones when `include_sticky`
    /// is set, then deactivates every extension
    pub fn flush_extensions(&mut self, include_sticky: bool) {
        if include_sticky {
            for record in self.extensions.iter_mut() {
                if record.sticky {
                    record.sticky = false;
                    record.activated = true;
                }
            }
        }

        let activated: Vec<ExtensionId> = self
            .extensions
            .iter()
            .filter(|record| record.activated)
            .map(|record| record.id)
            .collect();
        for id in activated {
            let _ = self.change_extension(id, ExtensionChange::Deactivate, None);
        }
    }

    fn find(&self, id: ExtensionId) -> Result<usize, usize> {
        self.extensions
            .binary_search_by_key(&id, |record| record.id)
    }

    fn change_extension_named(
        &mut self,
        name: &str,
        change: ExtensionChange,
        pending: Option<&mut PendingChanges>,
    ) -> bool {
        let Some(id) = self.registry.id(name) else {
            warn!("Entity {}: unknown extension '{}'", self.entity_id, name);
            return false;
        };
        match self.change_extension(id, change, pending) {
            Ok(present) => present,
            Err(err) => panic!("{}", err),
        }
    }

    /// Returns whether the extension is present after the change
    fn change_extension(
        &mut self,
        id: ExtensionId,
        change: ExtensionChange,
        mut pending: Option<&mut PendingChanges>,
    ) -> Result<bool, GameObjectError> {
        if !self.initialized {
            if change != ExtensionChange::Activate {
                return Ok(false);
            }
            match self.find(id) {
                Ok(index) => self.extensions[index].activated = true,
                Err(index) => {
                    let mut record = ExtensionRecord::new(id, None);
                    record.activated = true;
                    self.extensions.insert(index, record);
                }
            }
            return Ok(true);
        }

        match change {
            ExtensionChange::Activate | ExtensionChange::Acquire => {
                if let Some(record) =
                    find_record_mut(&mut self.extensions, pending.as_deref_mut(), id)
                {
                    record.ref_count += (change == ExtensionChange::Acquire) as u32;
                    record.activated |= change == ExtensionChange::Activate;
                    return Ok(true);
                }
                Ok(self.instantiate(id, change, pending))
            }
            ExtensionChange::Deactivate | ExtensionChange::Release => {
                let Ok(index) = self.find(id) else {
                    if let Some(record) = pending
                        .as_deref_mut()
                        .and_then(|pending| pending.adds.iter_mut().find(|record| record.id == id))
                    {
                        record.ref_count = record
                            .ref_count
                            .saturating_sub((change == ExtensionChange::Release) as u32);
                        if change == ExtensionChange::Deactivate {
                            record.activated = false;
                        }
                        return Ok(true);
                    }
                    if change == ExtensionChange::Release {
                        return Err(GameObjectError::ReleaseMissingExtension {
                            name: self.registry.name(id).unwrap_or("?").to_string(),
                        });
                    }
                    return Ok(false);
                };

                let record = &mut self.extensions[index];
                record.ref_count = record
                    .ref_count
                    .saturating_sub((change == ExtensionChange::Release) as u32);
                if change == ExtensionChange::Deactivate {
                    record.activated = false;
                }
                if !record.is_unreferenced() {
                    return Ok(true);
                }
                match pending {
                    Some(pending) => {
                        pending.stage_remove(id);
                        Ok(true)
                    }
                    None => {
                        self.remove_at(index);
                        Ok(false)
                    }
                }
            }
        }
    }

    fn instantiate(
        &mut self,
        id: ExtensionId,
        change: ExtensionChange,
        mut pending: Option<&mut PendingChanges>,
    ) -> bool {
        let Some(mut extension) = self.registry.instantiate(id) else {
            return false;
        };
        let mut commands = ExtensionCommands::new(id);
        if !extension.init(&mut commands) {
            warn!(
                "Entity {}: extension '{}' failed to initialize",
                self.entity_id,
                self.registry.name(id).unwrap_or("?")
            );
            return false;
        }
        extension.set_channel_id(self.channel_id);

        let mut record = ExtensionRecord::new(id, Some(extension));
        record.ref_count += (change == ExtensionChange::Acquire) as u32;
        record.activated = change == ExtensionChange::Activate;

        if let Some(staging) = pending.as_deref_mut() {
            staging.stage_add(record);
            self.apply_commands(commands, pending);
        } else {
            let index = self.find(id).unwrap_or_else(|index| index);
            self.extensions.insert(index, record);
            self.apply_commands(commands, None);
            self.post_init_extension(id);
        }
        true
    }

    fn post_init_extension(&mut self, id: ExtensionId) {
        let Ok(index) = self.find(id) else {
            return;
        };
        let mut commands = ExtensionCommands::new(id);
        if let Some(extension) = self.extensions[index].extension.as_mut() {
            extension.post_init(&mut commands);
        }
        self.apply_commands(commands, None);
    }

    fn remove_at(&mut self, index: usize) {
        let mut record = self.extensions.remove(index);
        if let Some(extension) = record.extension.as_mut() {
            extension.release();
        }
    }

    fn apply_pending(&mut self, pending: PendingChanges) {
        for id in pending.removes.iter().rev() {
            if let Ok(index) = self.find(*id) {
                if self.extensions[index].is_unreferenced() {
                    self.remove_at(index);
                }
            }
        }

        let mut added = Vec::new();
        for mut record in pending.adds {
            if record.is_unreferenced() {
                if let Some(extension) = record.extension.as_mut() {
                    extension.release();
                }
                continue;
            }
            added.push(record.id);
            self.extensions.push(record);
        }
        if added.is_empty() {
            return;
        }
        self.extensions.sort_by_key(|record| record.id);
        for id in added {
            self.post_init_extension(id);
        }
    }

    fn apply_commands(
        &mut self,
        mut commands: ExtensionCommands,
        mut pending: Option<&mut PendingChanges>,
    ) {
        let source = commands.source();
        for command in commands.take() {
            let result = match command {
                ExtensionCommand::Change { name, change } => {
                    self.change_extension_named(&name, change, pending.as_deref_mut());
                    Ok(())
                }
                ExtensionCommand::EnableUpdateSlot(slot) => {
                    self.enable_update_slot_with(source, slot, pending.as_deref_mut())
                }
                ExtensionCommand::DisableUpdateSlot(slot) => {
                    self.disable_update_slot_with(source, slot, pending.as_deref_mut())
                }
                ExtensionCommand::ForceUpdateSlot(slot) => {
                    self.force_update_extension_with(source, slot, pending.as_deref_mut())
                }
                ExtensionCommand::SetUpdateCondition { slot, condition } => {
                    self.set_update_condition_with(source, slot, condition, pending.as_deref_mut())
                }
                ExtensionCommand::EnablePostUpdates => {
                    self.set_post_updates_with(source, true, pending.as_deref_mut())
                }
                ExtensionCommand::DisablePostUpdates => {
                    self.set_post_updates_with(source, false, pending.as_deref_mut())
                }
                ExtensionCommand::RegisterEvent(event) => {
                    self.set_event_interest_with(source, event, true, pending.as_deref_mut())
                }
                ExtensionCommand::UnregisterEvent(event) => {
                    self.set_event_interest_with(source, event, false, pending.as_deref_mut())
                }
                ExtensionCommand::ForceUpdate(force) => {
                    self.force_update(force);
                    Ok(())
                }
                ExtensionCommand::SendEvent(event) => {
                    self.send_event_with(event, pending.as_deref_mut());
                    Ok(())
                }
            };
            if let Err(err) = result {
                panic!("{}", err);
            }
        }
    }

    // Update slots

    fn source_record<'a>(
        extensions: &'a mut [ExtensionRecord],
        pending: Option<&'a mut PendingChanges>,
        id: ExtensionId,
        slot: usize,
    ) -> Result<&'a mut ExtensionRecord, GameObjectError> {
        if slot >= MAX_UPDATE_SLOTS {
            return Err(GameObjectError::InvalidSlot {
                slot,
                limit: MAX_UPDATE_SLOTS,
            });
        }
        find_record_mut(extensions, pending, id).ok_or(GameObjectError::ExtensionNotPresent {
            extension_id: id.to_u16(),
        })
    }

    /// Increments the slot's enable counter. Panics if the counter is full.
    pub fn enable_update_slot(&mut self, extension: ExtensionId, slot: usize) {
        if let Err(err) = self.try_enable_update_slot(extension, slot) {
            panic!("{}", err);
        }
    }

    pub fn try_enable_update_slot(
        &mut self,
        extension: ExtensionId,
        slot: usize,
    ) -> Result<(), GameObjectError> {
        self.enable_update_slot_with(extension, slot, None)
    }

    fn enable_update_slot_with(
        &mut self,
        id: ExtensionId,
        slot: usize,
        mut pending: Option<&mut PendingChanges>,
    ) -> Result<(), GameObjectError> {
        let record = Self::source_record(&mut self.extensions, pending.as_deref_mut(), id, slot)?;
        if record.update_enables[slot] == u8::MAX {
            return Err(GameObjectError::SlotEnableOverflow {
                extension_id: id.to_u16(),
                slot,
            });
        }
        record.update_enables[slot] += 1;
        self.evaluate_update_activation(pending);
        Ok(())
    }

    /// Decrements the slot's enable counter if it is nonzero
    pub fn disable_update_slot(
        &mut self,
        extension: ExtensionId,
        slot: usize,
    ) -> Result<(), GameObjectError> {
        self.disable_update_slot_with(extension, slot, None)
    }

    fn disable_update_slot_with(
        &mut self,
        id: ExtensionId,
        slot: usize,
        mut pending: Option<&mut PendingChanges>,
    ) -> Result<(), GameObjectError> {
        let record = Self::source_record(&mut self.extensions, pending.as_deref_mut(), id, slot)?;
        record.update_enables[slot] = record.update_enables[slot].saturating_sub(1);
        self.evaluate_update_activation(pending);
        Ok(())
    }

    /// Updates the slot for the next 255 frames regardless of conditions
    pub fn force_update_extension(
        &mut self,
        extension: ExtensionId,
        slot: usize,
    ) -> Result<(), GameObjectError> {
        self.force_update_extension_with(extension, slot, None)
    }

    fn force_update_extension_with(
        &mut self,
        id: ExtensionId,
        slot: usize,
        mut pending: Option<&mut PendingChanges>,
    ) -> Result<(), GameObjectError> {
        let record = Self::source_record(&mut self.extensions, pending.as_deref_mut(), id, slot)?;
        record.force_enables[slot] = u8::MAX;
        self.set_activation(true, pending);
        Ok(())
    }

    pub fn set_update_slot_enable_condition(
        &mut self,
        extension: ExtensionId,
        slot: usize,
        condition: UpdateEnableCondition,
    ) -> Result<(), GameObjectError> {
        self.set_update_condition_with(extension, slot, condition, None)
    }

    fn set_update_condition_with(
        &mut self,
        id: ExtensionId,
        slot: usize,
        condition: UpdateEnableCondition,
        mut pending: Option<&mut PendingChanges>,
    ) -> Result<(), GameObjectError> {
        let record = Self::source_record(&mut self.extensions, pending.as_deref_mut(), id, slot)?;
        record.set_conditions(slot, SlotConditions::from(condition));
        self.evaluate_update_activation(pending);
        Ok(())
    }

    pub fn enable_post_updates(&mut self, extension: ExtensionId) -> Result<(), GameObjectError> {
        self.set_post_updates_with(extension, true, None)
    }

    pub fn disable_post_updates(&mut self, extension: ExtensionId) -> Result<(), GameObjectError> {
        self.set_post_updates_with(extension, false, None)
    }

    fn set_post_updates_with(
        &mut self,
        id: ExtensionId,
        enabled: bool,
        pending: Option<&mut PendingChanges>,
    ) -> Result<(), GameObjectError> {
        let record = Self::source_record(&mut self.extensions, pending, id, 0)?;
        record.post_update = enabled;
        Ok(())
    }

    pub fn register_event_interest(
        &mut self,
        extension: ExtensionId,
        event: EventId,
    ) -> Result<(), GameObjectError> {
        self.set_event_interest_with(extension, event, true, None)
    }

    pub fn unregister_event_interest(
        &mut self,
        extension: ExtensionId,
        event: EventId,
    ) -> Result<(), GameObjectError> {
        self.set_event_interest_with(extension, event, false, None)
    }

    fn set_event_interest_with(
        &mut self,
        id: ExtensionId,
        event: EventId,
        interested: bool,
        pending: Option<&mut PendingChanges>,
    ) -> Result<(), GameObjectError> {
        let record = Self::source_record(&mut self.extensions, pending, id, 0)?;
        if interested {
            record.event_interest |= event.interest_bit();
        } else {
            record.event_interest &= !event.interest_bit();
        }
        Ok(())
    }

    /// Adjusts the manual force-update counter
    pub fn force_update(&mut self, force: bool) {
        if force {
            self.force_update += 1;
        } else {
            self.force_update -= 1;
        }
        debug_assert!(self.force_update >= 0);
    }

    pub fn should_update_slot(&self, extension: ExtensionId, slot: usize) -> bool {
        let should_update_ai = self.should_update_ai();
        let check_ai_disable = !should_update_ai && self.has_ai;
        match self.find(extension) {
            Ok(index) if slot < MAX_UPDATE_SLOTS => {
                self.slot_eligible(&self.extensions[index], slot, check_ai_disable)
            }
            _ => false,
        }
    }

    fn slot_eligible(&self, record: &ExtensionRecord, slot: usize, check_ai_disable: bool) -> bool {
        if check_ai_disable && record.has(record.disable_with_ai, slot) {
            return false;
        }
        if record.force_enables[slot] != 0 {
            return true;
        }
        if record.has(record.never_update, slot) {
            return false;
        }
        if record.update_enables[slot] == 0 {
            return false;
        }

        let visible_check =
            !record.has(record.when_visible, slot) || self.is_probably_visible();
        let in_range_check =
            !record.has(record.when_in_range, slot) || !self.is_probably_distant();
        if record.has(record.combine_or, slot) {
            visible_check || in_range_check
        } else {
            visible_check && in_range_check
        }
    }

    // Activation

    pub fn update_state(&self) -> UpdateState {
        self.update_state
    }

    pub fn update_timer(&self) -> f32 {
        self.update_timer
    }

    pub fn sends_render_event(&self) -> bool {
        self.sends_render_event
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_physics_disabled(&self) -> bool {
        self.physics_disabled
    }

    pub fn is_pre_physics_enabled(&self) -> bool {
        self.pre_physics_enabled
    }

    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    pub fn is_probably_visible(&self) -> bool {
        if self.hidden {
            return self.update_hidden;
        }
        test_is_probably_visible(self.update_state)
    }

    pub fn is_probably_distant(&self) -> bool {
        if self.hidden && !self.update_hidden {
            return true;
        }
        test_is_probably_distant(self.update_state)
    }

    pub fn should_update_ai(&self) -> bool {
        if self.hidden || !self.has_ai {
            return false;
        }
        match self.ai_mode {
            AiActivationMode::Never => false,
            AiActivationMode::Always => true,
            AiActivationMode::VisibleOrInRange => {
                self.is_probably_visible() || !self.is_probably_distant()
            }
        }
    }

    pub fn set_ai_activation(&mut self, mode: AiActivationMode) -> Result<(), GameObjectError> {
        if !self.has_ai {
            return Err(GameObjectError::NoAi);
        }
        self.ai_mode = mode;
        self.evaluate_update_activation(None);
        Ok(())
    }

    pub fn set_has_ai(&mut self, has_ai: bool) {
        self.has_ai = has_ai;
        self.evaluate_update_activation(None);
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.evaluate_update_activation(None);
    }

    /// Whether a hidden object keeps counting as visible
    pub fn set_update_hidden(&mut self, update_hidden: bool) {
        self.update_hidden = update_hidden;
        self.evaluate_update_activation(None);
    }

    pub fn set_pre_physics_update_rule(&mut self, rule: PrePhysicsUpdateRule) {
        self.pre_physics_rule = rule;
        self.evaluate_update_activation(None);
    }

    pub fn set_physics_disable_policy(&mut self, policy: PhysicsDisablePolicy) {
        self.physics_policy = policy;
        self.evaluate_update_activation(None);
    }

    pub fn set_camera_distance(&mut self, distance: f32) {
        self.distance_checker.set_camera_distance(distance);
    }

    /// Reports the object entering or leaving the camera's proximity
    pub fn set_in_range(&mut self, in_range: bool) {
        self.set_in_range_with(in_range, None);
    }

    fn set_in_range_with(&mut self, in_range: bool, pending: Option<&mut PendingChanges>) {
        if self.in_range == in_range {
            return;
        }
        self.in_range = in_range;
        let event = if in_range {
            UpdateStateEvent::BecomeClose
        } else {
            UpdateStateEvent::BecomeFar
        };
        self.update_state_event_with(event, pending);
    }

    /// Called when the renderer drew the object at `distance` from the camera
    pub fn notify_rendered(&mut self, distance: f32) {
        let target = if distance < FAR_AWAY_DISTANCE {
            UpdateState::CheckVisibilityClose
        } else {
            UpdateState::CheckVisibilityFar
        };
        if target == self.update_state {
            self.update_timer = target.timeout();
        } else {
            self.transition_to(target, None);
        }
    }

    pub fn update_state_event(&mut self, event: UpdateStateEvent) {
        self.update_state_event_with(event, None);
    }

    fn update_state_event_with(
        &mut self,
        event: UpdateStateEvent,
        pending: Option<&mut PendingChanges>,
    ) {
        let Some(next) = self.update_state.transition(event) else {
            return;
        };
        if next != self.update_state {
            self.transition_to(next, pending);
        }
    }

    fn transition_to(&mut self, next: UpdateState, mut pending: Option<&mut PendingChanges>) {
        let previous = self.update_state;
        if test_is_probably_visible(next) && !test_is_probably_visible(previous) {
            self.send_event_with(
                GameObjectEvent::to_extensions(EventId::BECOME_VISIBLE),
                pending.as_deref_mut(),
            );
        }

        log_transition(self.entity_id, previous, next);
        self.update_state = next;
        self.update_timer = next.timeout();
        self.sends_render_event = wants_render_event(next);
        self.evaluate_update_activation(pending);
    }

    fn evaluate_update_activation(&mut self, pending: Option<&mut PendingChanges>) {
        let should_update_ai = self.should_update_ai();
        let check_ai_disable = !should_update_ai && self.has_ai;
        let mut activate = should_update_ai
            || self.extensions.iter().any(|record| {
                (0..MAX_UPDATE_SLOTS).any(|slot| self.slot_eligible(record, slot, check_ai_disable))
            });
        activate |= self.force_update > 0;
        self.set_activation(activate, pending);

        let pre_physics = match self.pre_physics_rule {
            PrePhysicsUpdateRule::Never => false,
            PrePhysicsUpdateRule::Always => true,
            PrePhysicsUpdateRule::WhenAIActivated => !self.has_ai || should_update_ai,
        };
        if pre_physics != self.pre_physics_enabled {
            self.pre_physics_enabled = pre_physics;
            self.notices
                .push(GameObjectNotice::PrePhysicsChanged(pre_physics));
        }
    }

    fn set_activation(&mut self, activate: bool, pending: Option<&mut PendingChanges>) {
        let was_active = self.active;
        if was_active != activate {
            self.active = activate;
            self.notices
                .push(GameObjectNotice::ActivationChanged(activate));
            if !activate && self.has_ai {
                self.notices.push(GameObjectNotice::AiAutoDeactivated);
            }
        }

        let disable = if test_is_probably_visible(self.update_state) {
            false
        } else {
            match self.physics_policy {
                PhysicsDisablePolicy::Never => false,
                PhysicsDisablePolicy::WhenInvisibleAndFarAway => {
                    test_is_probably_distant(self.update_state)
                }
                PhysicsDisablePolicy::WhenAIDeactivated => {
                    if activate {
                        false
                    } else if was_active {
                        true
                    } else {
                        self.physics_disabled
                    }
                }
            }
        };
        self.set_physics_disable(disable, pending);
    }

    fn set_physics_disable(&mut self, disable: bool, pending: Option<&mut PendingChanges>) {
        if disable == self.physics_disabled {
            return;
        }
        self.physics_disabled = disable;
        let event = if disable {
            EventId::DISABLE_PHYSICS
        } else {
            EventId::ENABLE_PHYSICS
        };
        self.send_event_with(
            GameObjectEvent::new(event, EVENT_TO_EXTENSIONS | EVENT_TO_GAME_OBJECT),
            pending,
        );
    }

    /// Takes the side effects accumulated since the last call
    pub fn take_notices(&mut self) -> Vec<GameObjectNotice> {
        std::mem::take(&mut self.notices)
    }

    // Events

    pub fn send_event(&mut self, event: GameObjectEvent) {
        self.send_event_with(event, None);
    }

    fn send_event_with(&mut self, event: GameObjectEvent, mut pending: Option<&mut PendingChanges>) {
        if !self.events_enabled {
            return;
        }

        if event.flags & EVENT_TO_GAME_OBJECT != 0 {
            if event.event == EventId::ENABLE_PHYSICS {
                self.notices.push(GameObjectNotice::PhysicsEnabled);
            } else if event.event == EventId::DISABLE_PHYSICS {
                self.notices.push(GameObjectNotice::PhysicsDisabled);
            }
        }

        if event.flags & EVENT_TO_EXTENSIONS == 0 {
            return;
        }

        let mut queued = Vec::new();
        match event.target {
            Some(target) => {
                if let Ok(index) = self.find(target) {
                    let record = &mut self.extensions[index];
                    if let Some(extension) = record.extension.as_mut() {
                        let mut commands = ExtensionCommands::new(record.id);
                        extension.handle_event(&mut commands, &event);
                        queued.push(commands);
                    }
                }
            }
            None => {
                let bit = event.event.interest_bit();
                for record in self.extensions.iter_mut() {
                    if !record.is_interested_in(bit) {
                        continue;
                    }
                    if let Some(extension) = record.extension.as_mut() {
                        let mut commands = ExtensionCommands::new(record.id);
                        extension.handle_event(&mut commands, &event);
                        queued.push(commands);
                    }
                }
            }
        }

        for commands in queued {
            if !commands.is_empty() {
                self.apply_commands(commands, pending.as_deref_mut());
            }
        }
    }

    // Per-frame

    pub fn update(&mut self, frame_time: f32) {
        let mut pending = PendingChanges::default();

        if let Some(in_range) = self.distance_checker.update(frame_time) {
            self.set_in_range_with(in_range, Some(&mut pending));
        }

        self.update_timer -= frame_time;
        if self.update_timer < 0.0 {
            self.update_timer = UPDATE_TIMEOUT_HUGE;
            self.update_state_event_with(UpdateStateEvent::Timeout, Some(&mut pending));
        }

        let should_update_ai = self.should_update_ai();
        let mut keep_updating = should_update_ai;
        let check_ai_disable = !should_update_ai && self.has_ai;
        for index in 0..self.extensions.len() {
            for slot in 0..MAX_UPDATE_SLOTS {
                let record = &mut self.extensions[index];
                record.force_enables[slot] = record.force_enables[slot].saturating_sub(1);

                if !self.slot_eligible(&self.extensions[index], slot, check_ai_disable) {
                    continue;
                }
                let record = &mut self.extensions[index];
                let mut commands = ExtensionCommands::new(record.id);
                if let Some(extension) = record.extension.as_mut() {
                    extension.update(&mut commands, frame_time, slot);
                }
                self.apply_commands(commands, Some(&mut pending));
                keep_updating = true;
            }
        }

        if !keep_updating && self.force_update <= 0 {
            self.set_activation(false, Some(&mut pending));
        }

        self.apply_pending(pending);
    }

    pub fn post_update(&mut self, frame_time: f32) {
        for record in self.extensions.iter_mut() {
            if !record.post_update {
                continue;
            }
            if let Some(extension) = record.extension.as_mut() {
                extension.post_update(frame_time);
            }
        }
    }

    // Network

    pub fn aspect_profile(&self, aspect: Aspect) -> u8 {
        self.aspect_profiles[aspect.index()]
    }

    pub fn set_aspect_profile(&mut self, aspect: Aspect, profile: u8) {
        self.aspect_profiles[aspect.index()] = profile;
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn set_channel_id(&mut self, channel_id: ChannelId) {
        self.channel_id = channel_id;
        for record in self.extensions.iter_mut() {
            if let Some(extension) = record.extension.as_mut() {
                extension.set_channel_id(channel_id);
            }
        }
    }

    pub fn set_scheduling_profiles(&mut self, profiles: Option<SchedulingProfiles>) {
        self.scheduling = profiles;
    }

    /// The scheduling policy tag in effect, depending on whether the local
    /// peer owns the object
    pub fn scheduling_profile(&self, owned: bool) -> Option<u32> {
        self.scheduling.map(|profiles| {
            if owned {
                profiles.owned
            } else {
                profiles.normal
            }
        })
    }

    // Teardown

    /// A handle physics callbacks are delivered through
    pub fn physics_gate(&self) -> PhysicsCallbackGate {
        self.gate.clone()
    }

    /// Stops event delivery and drops every extension, excluding concurrent
    /// physics callbacks while doing so
    pub fn teardown(&mut self) {
        let gate = self.gate.clone();
        gate.close_with(|| {
            self.events_enabled = false;
            self.flush_extensions(true);
        });
        info!("Entity {}: game object torn down", self.entity_id);
    }

    // Save games

    pub fn full_serialize(&mut self, serializer: &mut dyn ValueSerializer) {
        if !serializer.begin_optional_group("GameObject", true) {
            return;
        }

        let mut state = self.update_state.to_u8();
        serializer.value_u8("updateState", &mut state);
        if serializer.is_reading() {
            if let Some(state) = UpdateState::from_u8(state) {
                self.update_state = state;
            }
        }

        if serializer.is_reading() {
            self.read_extensions(serializer);
        } else {
            self.write_extensions(serializer);
        }

        for (index, profile) in self.aspect_profiles.iter_mut().enumerate() {
            let mut value = *profile;
            serializer.value_u8_with_default(
                &format!("aspectProfile{}", index),
                &mut value,
                DEFAULT_ASPECT_PROFILE,
            );
            if serializer.is_reading() {
                *profile = value;
            }
        }

        serializer.end_group();
    }

    fn write_extensions(&mut self, serializer: &mut dyn ValueSerializer) {
        let registry = self.registry.clone();
        let name_of = |id: ExtensionId| registry.name(id).unwrap_or_default().to_string();

        let mut activated: Vec<String> = self
            .extensions
            .iter()
            .filter(|record| record.activated)
            .map(|record| name_of(record.id))
            .collect();
        serialize_names(serializer, "activatedExtensions", &mut activated);

        let mut count = self.extensions.len() as u32;
        serializer.value_u32("numExtensions", &mut count);

        let mut order: Vec<usize> = (0..self.extensions.len()).collect();
        if self.extensions.len() > 1 {
            serializer.begin_group("UpdateOrder");
            for record in self.extensions.iter() {
                serializer.begin_group("Extension");
                let mut name = name_of(record.id);
                serializer.value_string("name", &mut name);
                serializer.end_group();
            }
            serializer.end_group();

            order.sort_by_key(|index| registry.serialization_priority(self.extensions[*index].id));
        }

        for index in order {
            let record = &mut self.extensions[index];
            serializer.begin_group("Extension");
            let mut name = name_of(record.id);
            serializer.value_string("name", &mut name);
            if let Some(extension) = record.extension.as_mut() {
                extension.full_serialize(serializer);
            }
            serializer.end_group();
        }
    }

    fn read_extensions(&mut self, serializer: &mut dyn ValueSerializer) {
        let mut activated = Vec::new();
        serialize_names(serializer, "activatedExtensions", &mut activated);
        for name in activated.iter() {
            self.activate_extension(name);
        }

        let mut count = 0u32;
        serializer.value_u32("numExtensions", &mut count);

        if count > 1 {
            serializer.begin_group("UpdateOrder");
            for _ in 0..count {
                if !serializer.is_ok() {
                    break;
                }
                serializer.begin_group("Extension");
                let mut name = String::new();
                serializer.value_string("name", &mut name);
                if self.acquire_extension(&name) {
                    self.release_extension(&name);
                }
                serializer.end_group();
            }
            serializer.end_group();
        }

        for _ in 0..count {
            if !serializer.is_ok() {
                break;
            }
            serializer.begin_group("Extension");
            let mut name = String::new();
            serializer.value_string("name", &mut name);
            if self.acquire_extension(&name) {
                if let Some(index) = self.registry.id(&name).and_then(|id| self.find(id).ok()) {
                    if let Some(extension) = self.extensions[index].extension.as_mut() {
                        extension.full_serialize(serializer);
                    }
                }
                self.release_extension(&name);
            }
            serializer.end_group();
        }
    }
}

fn serialize_names(serializer: &mut dyn ValueSerializer, group: &str, names: &mut Vec<String>) {
    serializer.begin_group(group);
    let mut count = names.len() as u32;
    serializer.value_u32("count", &mut count);
    if serializer.is_reading() {
        names.clear();
        for _ in 0..count {
            if !serializer.is_ok() {
                break;
            }
            let mut name = String::new();
            serializer.value_string("name", &mut name);
            names.push(name);
        }
    } else {
        for name in names.iter_mut() {
            serializer.value_string("name", name);
        }
    }
    serializer.end_group();
}

impl NetSerializable for GameObject {
    fn net_serialize(
        &mut self,
        serializer: &mut dyn ValueSerializer,
        aspect: Aspect,
        profile: u8,
        flags: u32,
    ) -> bool {
        for record in self.extensions.iter_mut() {
            if let Some(extension) = record.extension.as_mut() {
                if !extension.net_serialize(serializer, aspect, profile, flags) {
                    return false;
                }
            }
        }
        true
    }

    fn aspect_profile(&self, aspect: Aspect) -> u8 {
        GameObject::aspect_profile(self, aspect)
    }
}
