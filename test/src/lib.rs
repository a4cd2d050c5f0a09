pub mod helpers;
pub mod level_loader;
pub mod loopback;
pub mod test_world;

pub use helpers::*;
pub use level_loader::TestLevelLoader;
pub use loopback::{LinkProbe, LoopbackChannel};
pub use test_world::{TestWorld, WorldCall, WorldProbe};
