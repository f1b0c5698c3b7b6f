pub mod app;
pub mod audio;
pub mod core;
pub mod feedback;
pub mod gameplay;
pub mod interaction;
pub mod rendering;
pub mod ui;

// Curated re-exports
pub use app::game::GamePlugin;
pub use app::state::{GameFlowRequest, GameState, GameStateChanged, TogglePauseRequest};
pub use core::components::{EnergyCube, Player, PushState};
pub use core::config::GameConfig;
pub use core::scene::registry::LevelRegistry;
pub use gameplay::energy::Energy;
