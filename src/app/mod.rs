pub mod game;
pub mod menu;
pub mod pause;
pub mod state;
