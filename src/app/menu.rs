use bevy::prelude::*;
use bevy::ui::{AlignItems, FlexDirection, JustifyContent, Node};

use crate::app::state::{GameFlowRequest, GameState};
use crate::audio::bgm::BgmCommand;
use crate::audio::sfx::{PlaySfx, SetSfxMuted, SoundType};
use crate::core::prefs::Prefs;

pub const PREF_BGM_MUTED: &str = "bgm_muted";
pub const PREF_SFX_MUTED: &str = "sfx_muted";

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, apply_saved_mutes)
            .add_systems(OnEnter(GameState::MainMenu), spawn_menu_ui)
            .add_systems(
                Update,
                (handle_menu_buttons, handle_menu_keys).run_if(in_state(GameState::MainMenu)),
            )
            .add_systems(OnExit(GameState::MainMenu), despawn_menu_ui);
    }
}

#[derive(Component)]
struct MenuUiRoot;

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum MenuButton {
    Play,
    ToggleMusic,
    ToggleSound,
    Quit,
}

/// Marks a toggle button's label so its text tracks the pref.
#[derive(Component, Clone, Copy)]
enum ToggleLabel {
    Music,
    Sound,
}

fn toggle_label(kind: ToggleLabel, muted: bool) -> String {
    let name = match kind {
        ToggleLabel::Music => "Music",
        ToggleLabel::Sound => "Sound",
    };
    format!("{name}: {}", if muted { "off" } else { "on" })
}

/// Saved mute choices take effect before the first clip plays.
fn apply_saved_mutes(
    prefs: Res<Prefs>,
    mut bgm: EventWriter<BgmCommand>,
    mut sfx_muted: EventWriter<SetSfxMuted>,
) {
    if prefs.get_bool(PREF_BGM_MUTED, false) {
        bgm.write(BgmCommand::SetMuted(true));
    }
    if prefs.get_bool(PREF_SFX_MUTED, false) {
        sfx_muted.write(SetSfxMuted(true));
    }
}

fn spawn_menu_ui(mut commands: Commands, prefs: Res<Prefs>) {
    let bgm_muted = prefs.get_bool(PREF_BGM_MUTED, false);
    let sfx_muted = prefs.get_bool(PREF_SFX_MUTED, false);
    commands
        .spawn((
            MenuUiRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.02, 0.02, 0.05, 0.85)),
        ))
        .with_children(|p| {
            p.spawn((
                Text::new("VOLTCRATE"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                Node {
                    margin: UiRect::bottom(Val::Px(32.0)),
                    ..default()
                },
            ));
            spawn_button(p, MenuButton::Play, "Play", None);
            spawn_button(
                p,
                MenuButton::ToggleMusic,
                &toggle_label(ToggleLabel::Music, bgm_muted),
                Some(ToggleLabel::Music),
            );
            spawn_button(
                p,
                MenuButton::ToggleSound,
                &toggle_label(ToggleLabel::Sound, sfx_muted),
                Some(ToggleLabel::Sound),
            );
            spawn_button(p, MenuButton::Quit, "Quit", None);
        });
}

fn spawn_button(
    parent: &mut ChildSpawnerCommands,
    button: MenuButton,
    label: &str,
    label_marker: Option<ToggleLabel>,
) {
    parent
        .spawn((
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
            let mut text = p.spawn((
                Text::new(label),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
            ));
            if let Some(marker) = label_marker {
                text.insert(marker);
            }
        });
}

#[allow(clippy::too_many_arguments)]
fn handle_menu_buttons(
    buttons: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut labels: Query<(&mut Text, &ToggleLabel)>,
    mut prefs: ResMut<Prefs>,
    mut flow: EventWriter<GameFlowRequest>,
    mut bgm: EventWriter<BgmCommand>,
    mut sfx: EventWriter<PlaySfx>,
    mut sfx_muted: EventWriter<SetSfxMuted>,
    mut exit: EventWriter<AppExit>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        sfx.write(PlaySfx(SoundType::ButtonClick));
        match button {
            MenuButton::Play => {
                flow.write(GameFlowRequest(GameState::Playing));
            }
            MenuButton::ToggleMusic => {
                let muted = !prefs.get_bool(PREF_BGM_MUTED, false);
                prefs.set_bool(PREF_BGM_MUTED, muted);
                bgm.write(BgmCommand::SetMuted(muted));
                for (mut text, kind) in &mut labels {
                    if matches!(kind, ToggleLabel::Music) {
                        text.0 = toggle_label(ToggleLabel::Music, muted);
                    }
                }
            }
            MenuButton::ToggleSound => {
                let muted = !prefs.get_bool(PREF_SFX_MUTED, false);
                prefs.set_bool(PREF_SFX_MUTED, muted);
                sfx_muted.write(SetSfxMuted(muted));
                for (mut text, kind) in &mut labels {
                    if matches!(kind, ToggleLabel::Sound) {
                        text.0 = toggle_label(ToggleLabel::Sound, muted);
                    }
                }
            }
            MenuButton::Quit => {
                exit.write(AppExit::Success);
            }
        }
    }
}

fn handle_menu_keys(keys: Res<ButtonInput<KeyCode>>, mut flow: EventWriter<GameFlowRequest>) {
    if keys.just_pressed(KeyCode::Enter) {
        flow.write(GameFlowRequest(GameState::Playing));
    }
}

fn despawn_menu_ui(mut commands: Commands, roots: Query<Entity, With<MenuUiRoot>>) {
    for root in &roots {
        commands.entity(root).despawn();
    }
}
