//! Contextual interaction prompt shown at the bottom of the screen.

use bevy::prelude::*;

use crate::app::state::GameState;

#[derive(Resource, Debug, Default)]
pub struct InfoPrompt(Option<String>);

impl InfoPrompt {
    pub fn set(&mut self, text: impl Into<String>) {
        self.0 = Some(text.into());
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn text(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Component)]
struct PromptLabel;

pub struct PromptPlugin;

impl Plugin for PromptPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InfoPrompt>()
            .add_systems(Startup, spawn_prompt)
            .add_systems(Update, update_prompt)
            .add_systems(OnExit(GameState::Playing), clear_prompt);
    }
}

fn spawn_prompt(mut commands: Commands) {
    commands.spawn((
        PromptLabel,
        Text::new(""),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::srgba(0.95, 0.95, 0.9, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(64.0),
            align_self: AlignSelf::Center,
            justify_self: JustifySelf::Center,
            ..default()
        },
    ));
}

fn update_prompt(prompt: Res<InfoPrompt>, mut labels: Query<&mut Text, With<PromptLabel>>) {
    if !prompt.is_changed() {
        return;
    }
    for mut text in &mut labels {
        text.0 = prompt.text().unwrap_or("").to_string();
    }
}

fn clear_prompt(mut prompt: ResMut<InfoPrompt>) {
    prompt.clear();
}
