//! Level exit trigger: once armed, a player inside the trigger radius who
//! presses interact starts a short cued departure (elevator close animation)
//! and then loads the next level. A cooldown at level entry prevents instant
//! re-triggering when the player spawns inside the trigger volume.

use bevy::prelude::*;

use crate::app::state::GameState;
use crate::audio::sfx::{PlaySfx, SoundType};
use crate::core::components::Player;
use crate::core::config::GameConfig;
use crate::core::cooldown::Cooldown;
use crate::core::scene::registry::LevelRegistry;
use crate::core::scene::transition::LoadLevelRequest;
use crate::core::system_order::ProtocolSet;
use crate::feedback::{clips, PlayClip};
use crate::interaction::input::types::InputMap;
use crate::ui::prompt::InfoPrompt;

#[derive(Component, Debug)]
pub struct LevelExit {
    pub enabled: bool,
    pub cooldown: Cooldown,
    pub next: Option<String>,
    pub elevator: Option<Entity>,
}

/// Timed departure after the trigger fires. The close cue lands partway
/// through so the elevator animation finishes as the screen fades.
#[derive(Debug)]
pub struct ExitSequence {
    elapsed: f32,
    cue_delay: f32,
    close_delay: f32,
    cue_fired: bool,
    done: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExitAction {
    None,
    CueClose,
    Load,
}

impl ExitSequence {
    pub fn new(cue_delay: f32, close_delay: f32) -> Self {
        Self {
            elapsed: 0.0,
            cue_delay,
            close_delay,
            cue_fired: false,
            done: false,
        }
    }

    pub fn advance(&mut self, dt: f32) -> ExitAction {
        if self.done {
            return ExitAction::None;
        }
        self.elapsed += dt;
        if !self.cue_fired {
            if self.elapsed >= self.cue_delay {
                self.cue_fired = true;
                return ExitAction::CueClose;
            }
            return ExitAction::None;
        }
        if self.elapsed >= self.cue_delay + self.close_delay {
            self.done = true;
            return ExitAction::Load;
        }
        ExitAction::None
    }
}

/// In-flight departure; present only between trigger and load request.
#[derive(Resource)]
pub struct Departure {
    seq: ExitSequence,
    next: Option<String>,
    elevator: Option<Entity>,
}

pub struct LevelExitPlugin;

impl Plugin for LevelExitPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (check_exit_trigger, run_departure)
                .chain()
                .in_set(ProtocolSet)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(OnExit(GameState::Playing), clear_departure);
    }
}

/// Leaving gameplay cancels an in-flight departure; a stale sequence must
/// not resume and load a level after a detour through pause or the menu.
fn clear_departure(mut commands: Commands) {
    commands.remove_resource::<Departure>();
}

#[allow(clippy::too_many_arguments)]
fn check_exit_trigger(
    mut commands: Commands,
    time: Res<Time>,
    cfg: Res<GameConfig>,
    input: Res<InputMap>,
    departure: Option<Res<Departure>>,
    players: Query<&Transform, With<Player>>,
    mut exits: Query<(&Transform, &mut LevelExit)>,
    mut sfx: EventWriter<PlaySfx>,
    mut prompt: ResMut<InfoPrompt>,
    mut prompt_shown: Local<bool>,
) {
    let dt = time.delta_secs();
    let Ok(player_tf) = players.single() else {
        return;
    };
    let mut near_armed = false;
    for (exit_tf, mut exit) in &mut exits {
        exit.cooldown.tick(dt);
        if departure.is_some() || !exit.enabled || !exit.cooldown.ready() {
            continue;
        }
        if exit_tf.translation.distance(player_tf.translation) >= cfg.exit.distance {
            continue;
        }
        near_armed = true;
        // Proximity alone only surfaces the prompt; departing takes an
        // explicit interact press.
        if !input.just_pressed("Interact") {
            continue;
        }
        exit.cooldown.arm(cfg.exit.cooldown);
        sfx.write(PlaySfx(SoundType::Switch));
        commands.insert_resource(Departure {
            seq: ExitSequence::new(cfg.exit.cue_delay, cfg.exit.close_delay),
            next: exit.next.clone(),
            elevator: exit.elevator,
        });
        near_armed = false;
        break;
    }
    if near_armed && !*prompt_shown {
        prompt.set("Press E to interact");
        *prompt_shown = true;
    } else if !near_armed && *prompt_shown {
        prompt.clear();
        *prompt_shown = false;
    }
}

fn run_departure(
    mut commands: Commands,
    time: Res<Time>,
    registry: Res<LevelRegistry>,
    departure: Option<ResMut<Departure>>,
    mut clips_ev: EventWriter<PlayClip>,
    mut sfx: EventWriter<PlaySfx>,
    mut load: EventWriter<LoadLevelRequest>,
) {
    let Some(mut departure) = departure else {
        return;
    };
    match departure.seq.advance(time.delta_secs()) {
        ExitAction::None => {}
        ExitAction::CueClose => {
            sfx.write(PlaySfx(SoundType::ElevatorOpen));
            if let Some(elevator) = departure.elevator {
                clips_ev.write(PlayClip::on(elevator, clips::CLOSE_ELEVATOR));
            }
        }
        ExitAction::Load => {
            let entry = registry.select(departure.next.as_deref());
            load.write(LoadLevelRequest {
                level: entry.id.clone(),
                bgm_track: entry.bgm_track,
            });
            commands.remove_resource::<Departure>();
        }
    }
}
