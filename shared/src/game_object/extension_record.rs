use crate::{
    extension::{ExtensionId, GameObjectExtension},
    game_object::update_policy::SlotConditions,
};

pub const MAX_UPDATE_SLOTS: usize = 4;

/// One extension attached to a game object, plus its update bookkeeping.
/// Slot conditions are stored as bitmasks with bit `n` for slot `n`.
pub struct ExtensionRecord {
    pub(crate) id: ExtensionId,
    /// `None` for extensions activated before the object was initialized
    pub(crate) extension: Option<Box<dyn GameObjectExtension>>,
    pub(crate) ref_count: u32,
    pub(crate) activated: bool,
    pub(crate) sticky: bool,
    pub(crate) post_update: bool,
    pub(crate) update_enables: [u8; MAX_UPDATE_SLOTS],
    pub(crate) force_enables: [u8; MAX_UPDATE_SLOTS],
    pub(crate) when_visible: u8,
    pub(crate) when_in_range: u8,
    pub(crate) combine_or: u8,
    pub(crate) disable_with_ai: u8,
    pub(crate) never_update: u8,
    pub(crate) event_interest: u64,
}

impl ExtensionRecord {
    pub(crate) fn new(id: ExtensionId, extension: Option<Box<dyn GameObjectExtension>>) -> Self {
        Self {
            id,
            extension,
            ref_count: 0,
            activated: false,
            sticky: false,
            post_update: false,
            update_enables: [0; MAX_UPDATE_SLOTS],
            force_enables: [0; MAX_UPDATE_SLOTS],
            when_visible: 0,
            when_in_range: 0,
            combine_or: 0,
            disable_with_ai: 0xff,
            never_update: 0,
            event_interest: 0,
        }
    }

    pub fn id(&self) -> ExtensionId {
        self.id
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn wants_post_update(&self) -> bool {
        self.post_update
    }

    pub fn update_enables(&self, slot: usize) -> u8 {
        self.update_enables[slot]
    }

    pub fn force_enables(&self, slot: usize) -> u8 {
        self.force_enables[slot]
    }

    pub fn is_interested_in(&self, event_bit: u64) -> bool {
        self.event_interest & event_bit != 0
    }

    /// A record must be dropped once nothing holds it on the object
    pub(crate) fn is_unreferenced(&self) -> bool {
        self.ref_count == 0 && !self.activated && !self.sticky
    }

    pub(crate) fn set_conditions(&mut self, slot: usize, conditions: SlotConditions) {
        let bit = 1u8 << slot;
        set_bit(&mut self.when_visible, bit, conditions.when_visible);
        set_bit(&mut self.when_in_range, bit, conditions.when_in_range);
        set_bit(&mut self.combine_or, bit, conditions.combine_or);
        set_bit(&mut self.disable_with_ai, bit, conditions.disable_with_ai);
        set_bit(&mut self.never_update, bit, conditions.never);
    }

    pub(crate) fn has(&self, mask: u8, slot: usize) -> bool {
        mask & (1u8 << slot) != 0
    }
}

fn set_bit(mask: &mut u8, bit: u8, value: bool) {
    if value {
        *mask |= bit;
    } else {
        *mask &= !bit;
    }
}
