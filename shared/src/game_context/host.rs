use crate::{
    establishment::{Clock, ContextEstablisher, EstablishmentTask},
    game_context::game_context::GameContext,
    net_channel::EstablishChannel,
    types::ChannelId,
};

/// Everything establishment tasks can reach
pub trait EstablishmentHost: Clock {
    fn context(&mut self) -> &mut GameContext;

    /// The context and one channel at once
    fn context_and_channel(
        &mut self,
        channel_id: ChannelId,
    ) -> (&mut GameContext, Option<&mut dyn EstablishChannel>);

    fn channel(&mut self, channel_id: ChannelId) -> Option<&mut dyn EstablishChannel> {
        self.context_and_channel(channel_id).1
    }

    /// Connections accepted but not yet turned into channels
    fn pending_connections(&self) -> usize {
        0
    }

    fn channel_count(&self) -> usize {
        0
    }
}

pub type DynHost = dyn EstablishmentHost;
pub type HostTask = Box<dyn EstablishmentTask<DynHost>>;
pub type HostEstablisher = ContextEstablisher<DynHost>;
