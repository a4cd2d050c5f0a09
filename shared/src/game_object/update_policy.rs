/// Preset conditions under which an extension's update slot is eligible
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateEnableCondition {
    Never,
    Always,
    Visible,
    VisibleIgnoreAI,
    InRange,
    VisibleAndInRange,
    VisibleOrInRange,
    VisibleOrInRangeIgnoreAI,
    WithoutAI,
}

/// The per-slot condition bits a preset expands to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotConditions {
    pub when_visible: bool,
    pub when_in_range: bool,
    pub combine_or: bool,
    pub disable_with_ai: bool,
    pub never: bool,
}

impl Default for SlotConditions {
    fn default() -> Self {
        Self {
            when_visible: false,
            when_in_range: false,
            combine_or: false,
            disable_with_ai: true,
            never: false,
        }
    }
}

impl From<UpdateEnableCondition> for SlotConditions {
    fn from(condition: UpdateEnableCondition) -> Self {
        let mut bits = SlotConditions::default();
        match condition {
            UpdateEnableCondition::Never => bits.never = true,
            UpdateEnableCondition::Always => {}
            UpdateEnableCondition::Visible => bits.when_visible = true,
            UpdateEnableCondition::VisibleIgnoreAI => {
                bits.when_visible = true;
                bits.disable_with_ai = false;
            }
            UpdateEnableCondition::InRange => bits.when_in_range = true,
            UpdateEnableCondition::VisibleAndInRange => {
                bits.when_visible = true;
                bits.when_in_range = true;
            }
            UpdateEnableCondition::VisibleOrInRange => {
                bits.when_visible = true;
                bits.when_in_range = true;
                bits.combine_or = true;
            }
            UpdateEnableCondition::VisibleOrInRangeIgnoreAI => {
                bits.when_visible = true;
                bits.when_in_range = true;
                bits.combine_or = true;
                bits.disable_with_ai = false;
            }
            UpdateEnableCondition::WithoutAI => bits.disable_with_ai = false,
        }
        bits
    }
}

/// When the object's AI should be updated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiActivationMode {
    Never,
    Always,
    VisibleOrInRange,
}

/// When the object's pre-physics callback should be active
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrePhysicsUpdateRule {
    Never,
    Always,
    WhenAIActivated,
}

/// When the object's physical representation may be switched off
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsDisablePolicy {
    Never,
    WhenAIDeactivated,
    WhenInvisibleAndFarAway,
}
