/// Side effects of the activation state machine that the owning simulation
/// applies to the entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameObjectNotice {
    ActivationChanged(bool),
    AiAutoDeactivated,
    PrePhysicsChanged(bool),
    PhysicsEnabled,
    PhysicsDisabled,
}
