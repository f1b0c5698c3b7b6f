//! Game flow: the MainMenu / Playing / Paused state machine and the
//! side effects synchronized with every settled transition (virtual-time
//! pause in Paused only, input gating, music, level loading).
//!
//! All callers go through [`GameFlowRequest`] or [`TogglePauseRequest`];
//! duplicate requests targeting the already-pending state collapse so each
//! settled transition broadcasts exactly one [`GameStateChanged`].

use bevy::prelude::*;

use crate::audio::bgm::BgmCommand;
use crate::core::config::GameConfig;
use crate::core::scene::registry::LevelRegistry;
use crate::core::scene::transition::{ActiveScene, LoadLevelRequest};
use crate::interaction::input::types::InputMap;

/// High-level app lifecycle state.
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    MainMenu,
    Playing,
    Paused,
}

/// Ask for a specific state. Requests equal to the current (or already
/// pending) state are dropped silently.
#[derive(Event, Debug, Clone, Copy)]
pub struct GameFlowRequest(pub GameState);

/// Flip Playing <-> Paused. A no-op from the main menu.
#[derive(Event, Debug, Clone, Copy)]
pub struct TogglePauseRequest;

/// Broadcast once per settled transition, after deduplication.
#[derive(Event, Debug, Clone, Copy)]
pub struct GameStateChanged {
    pub from: GameState,
    pub to: GameState,
}

/// Launch choices from the command line; defaults run the full menu flow.
#[derive(Resource, Debug, Default, Clone)]
pub struct StartupOptions {
    pub level: Option<String>,
    pub skip_menu: bool,
}

/// Actions that only make sense with a live player.
const GAMEPLAY_ACTIONS: &[&str] = &["Move", "Look", "Jump", "Push", "Walk", "Interact"];

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<StartupOptions>()
            .add_event::<GameFlowRequest>()
            .add_event::<TogglePauseRequest>()
            .add_event::<GameStateChanged>()
            .add_systems(Startup, apply_startup_options)
            .add_systems(
                PreUpdate,
                (apply_flow_requests, settle_transition_effects).chain(),
            );
    }
}

fn apply_startup_options(
    options: Res<StartupOptions>,
    cfg: Res<GameConfig>,
    mut input: ResMut<InputMap>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut flow: EventWriter<GameFlowRequest>,
    mut bgm: EventWriter<BgmCommand>,
) {
    if options.skip_menu {
        flow.write(GameFlowRequest(GameState::Playing));
        return;
    }
    // Menu baseline: no gameplay input, clock running, menu music. Only
    // Paused ever freezes virtual time.
    set_gameplay_input(&mut input, false);
    virtual_time.unpause();
    bgm.write(BgmCommand::Play(cfg.scene.menu_bgm));
}

/// Folds this frame's requests into at most one state change. A shadow of
/// the pending state absorbs duplicates so double requests do not double
/// the broadcast.
fn apply_flow_requests(
    mut requests: EventReader<GameFlowRequest>,
    mut toggles: EventReader<TogglePauseRequest>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
    mut changed: EventWriter<GameStateChanged>,
) {
    let mut shadow = *state.get();
    let mut apply = |target: GameState,
                     shadow: &mut GameState,
                     next: &mut NextState<GameState>,
                     changed: &mut EventWriter<GameStateChanged>| {
        if target == *shadow {
            debug!(?target, "game flow request ignored: already there");
            return;
        }
        let from = *shadow;
        *shadow = target;
        next.set(target);
        changed.write(GameStateChanged { from, to: target });
    };

    for request in requests.read() {
        apply(request.0, &mut shadow, &mut next, &mut changed);
    }
    for _ in toggles.read() {
        let target = match shadow {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            GameState::MainMenu => continue,
        };
        apply(target, &mut shadow, &mut next, &mut changed);
    }
}

/// Side effects keyed on the settled transition. Runs after the fold so it
/// observes exactly the broadcasts that survived deduplication.
fn settle_transition_effects(
    mut changed: EventReader<GameStateChanged>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut input: ResMut<InputMap>,
    mut bgm: EventWriter<BgmCommand>,
    mut load: EventWriter<LoadLevelRequest>,
    cfg: Res<GameConfig>,
    registry: Res<LevelRegistry>,
    active: Res<ActiveScene>,
    options: Res<StartupOptions>,
) {
    for event in changed.read() {
        match (event.from, event.to) {
            (GameState::MainMenu, GameState::Playing) => {
                virtual_time.unpause();
                set_gameplay_input(&mut input, true);
                let entry = registry.select(options.level.as_deref());
                if active.0.as_deref() != Some(entry.id.as_str()) {
                    load.write(LoadLevelRequest {
                        level: entry.id.clone(),
                        bgm_track: entry.bgm_track.or(Some(cfg.scene.gameplay_bgm)),
                    });
                } else {
                    bgm.write(BgmCommand::Play(
                        entry.bgm_track.unwrap_or(cfg.scene.gameplay_bgm),
                    ));
                }
            }
            (GameState::Paused, GameState::Playing) => {
                virtual_time.unpause();
                set_gameplay_input(&mut input, true);
                bgm.write(BgmCommand::Resume);
            }
            (_, GameState::Paused) => {
                virtual_time.pause();
                set_gameplay_input(&mut input, false);
                bgm.write(BgmCommand::Pause);
            }
            (_, GameState::MainMenu) => {
                virtual_time.unpause();
                set_gameplay_input(&mut input, false);
                bgm.write(BgmCommand::Play(cfg.scene.menu_bgm));
            }
            (from, to) => {
                debug!(?from, ?to, "unhandled flow edge");
            }
        }
    }
}

fn set_gameplay_input(input: &mut InputMap, enabled: bool) {
    for action in GAMEPLAY_ACTIONS {
        input.set_enabled(action, enabled);
    }
}
