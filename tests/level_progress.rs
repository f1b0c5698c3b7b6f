//! Headless level-progress checks: charge-plate overlap episodes arming and
//! disarming the exit, and the interact-gated departure sequence.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use voltcrate::app::state::{GameFlowPlugin, GameFlowRequest, GameState};
use voltcrate::audio::sfx::{PlaySfx, SoundType};
use voltcrate::core::components::{ActiveClip, EnergyCube, Player, PushState};
use voltcrate::core::cooldown::Cooldown;
use voltcrate::core::scene::transition::SceneTransitionPlugin;
use voltcrate::core::system_order::{FeedbackSet, MovementSet, ProtocolSet};
use voltcrate::feedback::FeedbackPlugin;
use voltcrate::gameplay::charge_floor::{ChargeFloorPlugin, ChargePlate};
use voltcrate::gameplay::level_exit::{Departure, LevelExit, LevelExitPlugin};
use voltcrate::interaction::input::parse::default_input_map;
use voltcrate::interaction::input::types::InputMap;
use voltcrate::ui::prompt::InfoPrompt;
use voltcrate::{GameConfig, LevelRegistry};

fn harness() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    let mut cfg = GameConfig::default();
    // Hold the fade open so the registry level never spawns under the test.
    cfg.scene.fade_duration = 600.0;
    // Plates open the frame a cube lands; departures resolve in two frames.
    cfg.charge_plate.open_delay = 0.0;
    cfg.exit.cue_delay = 0.0;
    cfg.exit.close_delay = 0.0;
    app.insert_resource(cfg);
    app.insert_resource(LevelRegistry::default());
    app.insert_resource(default_input_map());
    app.init_resource::<InfoPrompt>();
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
        FeedbackPlugin,
        ChargeFloorPlugin,
        LevelExitPlugin,
    ));
    app.update();
    app.world_mut()
        .send_event(GameFlowRequest(GameState::Playing));
    app.update();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Playing
    );
    app
}

struct Stage {
    player: Entity,
    cube: Entity,
    exit: Entity,
    elevator: Entity,
}

/// Player far away, cube off the plate, exit disarmed.
fn spawn_stage(app: &mut App) -> Stage {
    let world = app.world_mut();
    let player = world
        .spawn((
            Player::new(0.35, 1.8),
            PushState::Idle,
            ActiveClip::default(),
            Transform::from_xyz(20.0, 0.9, 0.0),
        ))
        .id();
    let elevator = world
        .spawn((ActiveClip::default(), Transform::from_xyz(6.0, 1.5, 0.0)))
        .id();
    let cube = world
        .spawn((EnergyCube::new(0.5, 0.5), Transform::from_xyz(10.0, 0.5, 0.0)))
        .id();
    world.spawn((
        Transform::from_xyz(0.0, 0.0, 0.0),
        ChargePlate {
            elevator: Some(elevator),
            ..default()
        },
    ));
    let exit = world
        .spawn((
            Transform::from_xyz(6.0, 0.0, 0.0),
            LevelExit {
                enabled: false,
                cooldown: Cooldown::idle(),
                next: None,
                elevator: Some(elevator),
            },
        ))
        .id();
    Stage {
        player,
        cube,
        exit,
        elevator,
    }
}

fn move_to(app: &mut App, entity: Entity, pos: Vec3) {
    app.world_mut()
        .entity_mut(entity)
        .get_mut::<Transform>()
        .unwrap()
        .translation = pos;
}

fn clip_of(app: &App, entity: Entity) -> String {
    app.world().entity(entity).get::<ActiveClip>().unwrap().0.clone()
}

fn exit_enabled(app: &mut App, exit: Entity) -> bool {
    app.world_mut()
        .entity_mut(exit)
        .get::<LevelExit>()
        .unwrap()
        .enabled
}

#[test]
fn charge_vacate_recharge_opens_and_closes_once_per_episode() {
    let mut app = harness();
    let stage = spawn_stage(&mut app);
    app.update();
    assert!(!exit_enabled(&mut app, stage.exit));

    // Park the cube: the plate charges and the elevator opens, with both
    // one-shots fired at the start of the overlap.
    move_to(&mut app, stage.cube, Vec3::new(0.2, 0.5, 0.0));
    app.update();
    assert!(exit_enabled(&mut app, stage.exit));
    assert_eq!(clip_of(&app, stage.elevator), "OpenElevator");
    let fired: Vec<SoundType> = app
        .world_mut()
        .resource_mut::<Events<PlaySfx>>()
        .drain()
        .map(|e| e.0)
        .collect();
    assert!(fired.contains(&SoundType::ChargeOn));
    assert!(fired.contains(&SoundType::ElevatorOpen));

    // Staying parked re-fires nothing.
    app.update();
    assert_eq!(clip_of(&app, stage.elevator), "OpenElevator");

    // Vacating discharges: the elevator closes and the exit disarms.
    move_to(&mut app, stage.cube, Vec3::new(10.0, 0.5, 0.0));
    app.update();
    assert!(!exit_enabled(&mut app, stage.exit));
    assert_eq!(clip_of(&app, stage.elevator), "CloseElevator");

    // A second overlap episode opens again.
    move_to(&mut app, stage.cube, Vec3::new(0.0, 0.5, 0.3));
    app.update();
    assert!(exit_enabled(&mut app, stage.exit));
    assert_eq!(clip_of(&app, stage.elevator), "OpenElevator");
}

#[test]
fn exit_waits_for_interact_press() {
    let mut app = harness();
    let stage = spawn_stage(&mut app);
    move_to(&mut app, stage.cube, Vec3::new(0.2, 0.5, 0.0));
    app.update();

    // Standing in the trigger only surfaces the prompt.
    move_to(&mut app, stage.player, Vec3::new(6.0, 0.9, 0.5));
    app.update();
    assert_eq!(
        app.world().resource::<InfoPrompt>().text(),
        Some("Press E to interact")
    );
    assert!(!app.world().contains_resource::<Departure>());

    app.world_mut()
        .resource_mut::<InputMap>()
        .set_binary("Interact", true, true);
    app.update();
    assert!(app.world().contains_resource::<Departure>());
    app.world_mut()
        .resource_mut::<InputMap>()
        .set_binary("Interact", false, false);

    // With zero cue and close delays the departure resolves over the next
    // frames: close cue on the elevator, then the load request clears it.
    app.update();
    app.update();
    assert_eq!(clip_of(&app, stage.elevator), "CloseElevator");
    assert!(!app.world().contains_resource::<Departure>());
}

#[test]
fn leaving_gameplay_cancels_a_departure() {
    let mut app = harness();
    let stage = spawn_stage(&mut app);
    move_to(&mut app, stage.cube, Vec3::new(0.2, 0.5, 0.0));
    app.update();

    move_to(&mut app, stage.player, Vec3::new(6.0, 0.9, 0.5));
    app.world_mut()
        .resource_mut::<InputMap>()
        .set_binary("Interact", true, true);
    app.update();
    assert!(app.world().contains_resource::<Departure>());
    app.world_mut()
        .resource_mut::<InputMap>()
        .set_binary("Interact", false, false);

    // Bailing to the menu mid-departure drops the sequence instead of
    // letting it resume and load a stale level later.
    app.world_mut()
        .send_event(GameFlowRequest(GameState::MainMenu));
    app.update();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::MainMenu
    );
    assert!(!app.world().contains_resource::<Departure>());
}

#[test]
fn armed_cooldown_blocks_the_trigger() {
    let mut app = harness();
    let stage = spawn_stage(&mut app);
    move_to(&mut app, stage.cube, Vec3::new(0.2, 0.5, 0.0));
    app.update();

    app.world_mut()
        .entity_mut(stage.exit)
        .get_mut::<LevelExit>()
        .unwrap()
        .cooldown = Cooldown::armed(600.0);
    move_to(&mut app, stage.player, Vec3::new(6.0, 0.9, 0.5));
    app.world_mut()
        .resource_mut::<InputMap>()
        .set_binary("Interact", true, true);
    app.update();
    assert!(app.world().resource::<InfoPrompt>().text().is_none());
    assert!(!app.world().contains_resource::<Departure>());
}
