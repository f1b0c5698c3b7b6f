//! Fullscreen black overlay driven by the scene transition's fade alpha.

use bevy::prelude::*;

use crate::core::scene::transition::FadeAlpha;

#[derive(Component)]
struct FadeOverlay;

pub struct FaderPlugin;

impl Plugin for FaderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_overlay)
            .add_systems(Update, apply_alpha);
    }
}

fn spawn_overlay(mut commands: Commands) {
    commands.spawn((
        FadeOverlay,
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        // Above every other UI layer; clicks pass through to the menus.
        GlobalZIndex(i32::MAX - 1),
        bevy::ui::FocusPolicy::Pass,
    ));
}

fn apply_alpha(alpha: Res<FadeAlpha>, mut overlays: Query<&mut BackgroundColor, With<FadeOverlay>>) {
    if !alpha.is_changed() {
        return;
    }
    for mut color in &mut overlays {
        color.0 = Color::srgba(0.0, 0.0, 0.0, alpha.0.clamp(0.0, 1.0));
    }
}
