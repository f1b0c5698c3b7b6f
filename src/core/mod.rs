pub mod components;
pub mod config;
pub mod cooldown;
pub mod prefs;
pub mod scene;
pub mod system_order;
