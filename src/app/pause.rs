use bevy::prelude::*;
use bevy::ui::{AlignItems, FlexDirection, JustifyContent, Node};

use crate::app::state::{GameFlowRequest, GameState, TogglePauseRequest};
use crate::audio::sfx::{PlaySfx, SoundType};
use crate::core::scene::registry::LevelRegistry;
use crate::core::scene::transition::{ActiveScene, LoadLevelRequest};
use crate::interaction::input::types::InputMap;

pub struct PausePlugin;

impl Plugin for PausePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            request_pause_toggle
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
        )
        .add_systems(OnEnter(GameState::Paused), spawn_pause_ui)
        .add_systems(
            Update,
            handle_pause_buttons.run_if(in_state(GameState::Paused)),
        )
        .add_systems(OnExit(GameState::Paused), despawn_pause_ui);
    }
}

fn request_pause_toggle(input: Res<InputMap>, mut toggles: EventWriter<TogglePauseRequest>) {
    if input.just_pressed("Pause") {
        toggles.write(TogglePauseRequest);
    }
}

#[derive(Component)]
struct PauseUiRoot;

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum PauseButton {
    Resume,
    ResetLevel,
    MainMenu,
}

fn spawn_pause_ui(mut commands: Commands) {
    commands
        .spawn((
            PauseUiRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        ))
        .with_children(|p| {
            p.spawn((
                Text::new("Paused"),
                TextFont {
                    font_size: 42.0,
                    ..default()
                },
                Node {
                    margin: UiRect::bottom(Val::Px(24.0)),
                    ..default()
                },
            ));
            for (button, label) in [
                (PauseButton::Resume, "Resume"),
                (PauseButton::ResetLevel, "Reset level"),
                (PauseButton::MainMenu, "Main menu"),
            ] {
                p.spawn((
                    button,
                    Button,
                    Node {
                        width: Val::Px(220.0),
                        height: Val::Px(48.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.15, 0.15, 0.22, 0.9)),
                ))
                .with_children(|p| {
                    p.spawn((
                        Text::new(label),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                    ));
                });
            }
        });
}

#[allow(clippy::too_many_arguments)]
fn handle_pause_buttons(
    buttons: Query<(&Interaction, &PauseButton), Changed<Interaction>>,
    registry: Res<LevelRegistry>,
    active: Res<ActiveScene>,
    mut flow: EventWriter<GameFlowRequest>,
    mut toggles: EventWriter<TogglePauseRequest>,
    mut load: EventWriter<LoadLevelRequest>,
    mut sfx: EventWriter<PlaySfx>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        sfx.write(PlaySfx(SoundType::ButtonClick));
        match button {
            PauseButton::Resume => {
                toggles.write(TogglePauseRequest);
            }
            PauseButton::ResetLevel => {
                let entry = registry.select(active.0.as_deref());
                load.write(LoadLevelRequest {
                    level: entry.id.clone(),
                    bgm_track: entry.bgm_track,
                });
                flow.write(GameFlowRequest(GameState::Playing));
            }
            PauseButton::MainMenu => {
                flow.write(GameFlowRequest(GameState::MainMenu));
            }
        }
    }
}

fn despawn_pause_ui(mut commands: Commands, roots: Query<Entity, With<PauseUiRoot>>) {
    for root in &roots {
        commands.entity(root).despawn();
    }
}
