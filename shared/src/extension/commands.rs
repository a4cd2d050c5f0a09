use crate::{
    extension::extension_registry::{EventId, ExtensionId},
    game_object::{GameObjectEvent, UpdateEnableCondition},
};

/// How an extension's presence on an object changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionChange {
    Activate,
    Deactivate,
    Acquire,
    Release,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionCommand {
    Change {
        name: String,
        change: ExtensionChange,
    },
    EnableUpdateSlot(usize),
    DisableUpdateSlot(usize),
    ForceUpdateSlot(usize),
    SetUpdateCondition {
        slot: usize,
        condition: UpdateEnableCondition,
    },
    EnablePostUpdates,
    DisablePostUpdates,
    RegisterEvent(EventId),
    UnregisterEvent(EventId),
    ForceUpdate(bool),
    SendEvent(GameObjectEvent),
}

/// Requests an extension makes of its owner during a callback
pub struct ExtensionCommands {
    source: ExtensionId,
    commands: Vec<ExtensionCommand>,
}

impl ExtensionCommands {
    pub fn new(source: ExtensionId) -> Self {
        Self {
            source,
            commands: Vec::new(),
        }
    }

    pub fn source(&self) -> ExtensionId {
        self.source
    }

    pub fn activate_extension(&mut self, name: &str) {
        self.change_extension(name, ExtensionChange::Activate);
    }

    pub fn deactivate_extension(&mut self, name: &str) {
        self.change_extension(name, ExtensionChange::Deactivate);
    }

    pub fn acquire_extension(&mut self, name: &str) {
        self.change_extension(name, ExtensionChange::Acquire);
    }

    pub fn release_extension(&mut self, name: &str) {
        self.change_extension(name, ExtensionChange::Release);
    }

    fn change_extension(&mut self, name: &str, change: ExtensionChange) {
        self.commands.push(ExtensionCommand::Change {
            name: name.to_string(),
            change,
        });
    }

    pub fn enable_update_slot(&mut self, slot: usize) {
        self.commands.push(ExtensionCommand::EnableUpdateSlot(slot));
    }

    pub fn disable_update_slot(&mut self, slot: usize) {
        self.commands.push(ExtensionCommand::DisableUpdateSlot(slot));
    }

    pub fn force_update_slot(&mut self, slot: usize) {
        self.commands.push(ExtensionCommand::ForceUpdateSlot(slot));
    }

    pub fn set_update_condition(&mut self, slot: usize, condition: UpdateEnableCondition) {
        self.commands
            .push(ExtensionCommand::SetUpdateCondition { slot, condition });
    }

    pub fn enable_post_updates(&mut self) {
        self.commands.push(ExtensionCommand::EnablePostUpdates);
    }

    pub fn disable_post_updates(&mut self) {
        self.commands.push(ExtensionCommand::DisablePostUpdates);
    }

    pub fn register_event(&mut self, event: EventId) {
        self.commands.push(ExtensionCommand::RegisterEvent(event));
    }

    pub fn unregister_event(&mut self, event: EventId) {
        self.commands.push(ExtensionCommand::UnregisterEvent(event));
    }

    pub fn force_update(&mut self, force: bool) {
        self.commands.push(ExtensionCommand::ForceUpdate(force));
    }

    pub fn send_event(&mut self, event: GameObjectEvent) {
        self.commands.push(ExtensionCommand::SendEvent(event));
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<ExtensionCommand> {
        std::mem::take(&mut self.commands)
    }
}
