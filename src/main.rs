use bevy::prelude::*;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};
use clap::Parser;

use voltcrate::app::state::StartupOptions;
use voltcrate::core::prefs::Prefs;
use voltcrate::core::scene::registry::level_id_from_env;
use voltcrate::{GameConfig, GamePlugin, LevelRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about = "Third-person cube-pushing puzzler")]
struct Cli {
    /// Level id to start on (defaults to the registry's entry level).
    #[arg(long)]
    level: Option<String>,
    /// Jump straight into gameplay, bypassing the main menu.
    #[arg(long)]
    skip_menu: bool,
    /// Path to the game configuration file.
    #[arg(long, default_value = "assets/config/game.ron")]
    config: String,
}

fn main() {
    let cli = Cli::parse();

    let cfg = GameConfig::load_from_file(&cli.config).unwrap_or_else(|err| {
        eprintln!("config '{}' unusable ({err:#}); using defaults", cli.config);
        GameConfig::default()
    });
    let registry = LevelRegistry::load_from_file("assets/config/levels.ron")
        .unwrap_or_else(|err| {
            eprintln!("levels.ron unusable ({err:#}); using built-in level");
            LevelRegistry::default()
        });
    let prefs = Prefs::load_or_default("voltcrate_prefs.ron");

    App::new()
        .insert_resource(cfg.clone())
        .insert_resource(registry)
        .insert_resource(prefs)
        .insert_resource(StartupOptions {
            level: cli.level.or_else(level_id_from_env),
            skip_menu: cli.skip_menu,
        })
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: cfg.window.title.clone(),
                    resolution: (cfg.window.width, cfg.window.height).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(GamePlugin)
        .run();
}
