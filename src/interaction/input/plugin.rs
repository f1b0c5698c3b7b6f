use bevy::prelude::*;

use super::parse::{default_input_map, parse_input_toml};
use super::systems::{system_collect_inputs, system_evaluate_bindings};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputActionUpdateSet;

pub struct InputActionsPlugin;

impl Plugin for InputActionsPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(PreUpdate, InputActionUpdateSet)
            .add_systems(PreStartup, load_initial_input_map)
            .add_systems(
                PreUpdate,
                (system_collect_inputs, system_evaluate_bindings)
                    .chain()
                    .in_set(InputActionUpdateSet),
            );
    }
}

fn load_initial_input_map(mut commands: Commands) {
    let path =
        std::env::var("INPUT_CONFIG_PATH").unwrap_or_else(|_| "assets/config/input.toml".into());
    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let parsed = parse_input_toml(&raw, cfg!(feature = "debug"));
            if parsed.errors.is_empty() {
                info!(target: "input", "Input map loaded: {} actions", parsed.input_map.actions.len());
                commands.insert_resource(parsed.input_map);
            } else {
                for e in &parsed.errors {
                    error!(target: "input", "INPUT MAP ERROR: {e}");
                }
                commands.insert_resource(default_input_map());
            }
        }
        Err(e) => {
            warn!(target: "input", "No input config at '{path}' ({e}); using built-in bindings");
            commands.insert_resource(default_input_map());
        }
    }
}
