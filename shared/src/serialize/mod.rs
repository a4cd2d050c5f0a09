pub mod save_game;
pub mod value_serializer;
pub mod wire;
