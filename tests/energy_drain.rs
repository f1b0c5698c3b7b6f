//! Battery pickup and energy bookkeeping through the live schedule.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use voltcrate::app::state::{GameFlowPlugin, GameFlowRequest, GameState};
use voltcrate::core::components::{ActiveClip, LevelEntity, Player, PushState};
use voltcrate::core::scene::transition::SceneTransitionPlugin;
use voltcrate::core::system_order::{FeedbackSet, MovementSet, ProtocolSet};
use voltcrate::gameplay::energy::{Battery, EnergyChanged, EnergyPlugin};
use voltcrate::interaction::input::parse::default_input_map;
use voltcrate::{Energy, GameConfig, LevelRegistry};

fn harness() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    let mut cfg = GameConfig::default();
    cfg.scene.fade_duration = 600.0;
    app.insert_resource(cfg);
    app.insert_resource(LevelRegistry::default());
    app.insert_resource(default_input_map());
    app.configure_sets(
        Update,
        (
            ProtocolSet,
            MovementSet.after(ProtocolSet),
            FeedbackSet.after(MovementSet),
        ),
    );
    app.add_plugins((
        GameFlowPlugin,
        SceneTransitionPlugin,
        voltcrate::audio::bgm::BgmPlugin,
        voltcrate::audio::sfx::SfxPlugin,
        EnergyPlugin,
    ));
    app.update();
    app.world_mut()
        .send_event(GameFlowRequest(GameState::Playing));
    app.update();
    app
}

#[test]
fn energy_initializes_full_from_config() {
    let app = harness();
    let energy = app.world().resource::<Energy>();
    assert_eq!(energy.current(), 1.0);
    assert!(!energy.is_empty());
}

#[test]
fn battery_pickup_restores_and_despawns() {
    let mut app = harness();
    app.world_mut().spawn((
        Player::new(0.35, 1.8),
        PushState::Idle,
        ActiveClip::default(),
        Transform::from_xyz(0.0, 0.9, 0.0),
    ));
    let battery = app
        .world_mut()
        .spawn((
            LevelEntity,
            Battery {
                amount: 0.5,
                pickup_radius: 1.0,
            },
            Transform::from_xyz(0.3, 0.5, 0.0),
        ))
        .id();

    app.world_mut()
        .resource_mut::<Energy>()
        .drain(0.2, 4.0); // down to 0.2
    app.update();

    let energy = app.world().resource::<Energy>();
    assert!((energy.current() - 0.7).abs() < 1e-5, "0.2 + 0.5 battery");
    assert!(
        app.world().get_entity(battery).is_err(),
        "battery consumed on pickup"
    );
    let changed: Vec<EnergyChanged> = app
        .world_mut()
        .resource_mut::<Events<EnergyChanged>>()
        .drain()
        .collect();
    assert!(changed.iter().any(|c| (c.0 - 0.7).abs() < 1e-5));
}

#[test]
fn pickup_clamps_at_max() {
    let mut app = harness();
    app.world_mut().spawn((
        Player::new(0.35, 1.8),
        PushState::Idle,
        ActiveClip::default(),
        Transform::from_xyz(0.0, 0.9, 0.0),
    ));
    app.world_mut().spawn((
        LevelEntity,
        Battery {
            amount: 1.0,
            pickup_radius: 1.0,
        },
        Transform::from_xyz(0.0, 0.5, 0.0),
    ));

    app.world_mut().resource_mut::<Energy>().drain(0.2, 1.0); // 0.8
    app.update();
    assert_eq!(app.world().resource::<Energy>().current(), 1.0);
}

#[test]
fn distant_battery_is_untouched() {
    let mut app = harness();
    app.world_mut().spawn((
        Player::new(0.35, 1.8),
        PushState::Idle,
        ActiveClip::default(),
        Transform::from_xyz(0.0, 0.9, 0.0),
    ));
    let battery = app
        .world_mut()
        .spawn((
            LevelEntity,
            Battery {
                amount: 0.5,
                pickup_radius: 1.0,
            },
            Transform::from_xyz(5.0, 0.5, 0.0),
        ))
        .id();
    app.update();
    assert!(app.world().get_entity(battery).is_ok());
    assert_eq!(app.world().resource::<Energy>().current(), 1.0);
}
