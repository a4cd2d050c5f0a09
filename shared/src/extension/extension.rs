use crate::{
    aspect::Aspect,
    extension::commands::ExtensionCommands,
    game_object::GameObjectEvent,
    serialize::value_serializer::ValueSerializer,
    types::ChannelId,
};

/// A pluggable behavior module attached to a game object.
///
/// Extensions never hold a reference to their owner. Anything they want the
/// owner to do (enable an update slot, activate a sibling, send an event) is
/// queued on the `ExtensionCommands` they are handed and applied by the
/// owner once the callback returns.
pub trait GameObjectExtension {
    /// Called when the extension is instantiated on an initialized object.
    /// Returning false discards the extension.
    fn init(&mut self, commands: &mut ExtensionCommands) -> bool;

    /// Called once the extension is part of the owner's sorted extension list
    fn post_init(&mut self, _commands: &mut ExtensionCommands) {}

    fn update(&mut self, _commands: &mut ExtensionCommands, _frame_time: f32, _slot: usize) {}

    fn post_update(&mut self, _frame_time: f32) {}

    fn handle_event(&mut self, _commands: &mut ExtensionCommands, _event: &GameObjectEvent) {}

    /// Save-game serialization
    fn full_serialize(&mut self, _serializer: &mut dyn ValueSerializer) {}

    /// Network serialization of one aspect at the given profile. Returning
    /// false fails the aspect.
    fn net_serialize(
        &mut self,
        _serializer: &mut dyn ValueSerializer,
        _aspect: Aspect,
        _profile: u8,
        _flags: u32,
    ) -> bool {
        true
    }

    fn set_channel_id(&mut self, _channel_id: ChannelId) {}

    /// Called just before the extension is dropped by its owner
    fn release(&mut self) {}
}
