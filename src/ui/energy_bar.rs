//! On-screen energy bar; fill width tracks the normalized energy level
//! broadcast by the gameplay layer.

use bevy::prelude::*;

use crate::app::state::GameState;
use crate::gameplay::energy::EnergyChanged;

#[derive(Component)]
struct EnergyBarRoot;

#[derive(Component)]
struct EnergyBarFill;

pub struct EnergyBarPlugin;

impl Plugin for EnergyBarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_energy_bar).add_systems(
            Update,
            (update_fill, toggle_visibility),
        );
    }
}

fn spawn_energy_bar(mut commands: Commands) {
    commands
        .spawn((
            EnergyBarRoot,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(24.0),
                left: Val::Px(24.0),
                width: Val::Px(220.0),
                height: Val::Px(18.0),
                padding: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.05, 0.05, 0.08, 0.8)),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                EnergyBarFill,
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.2, 0.85, 0.95)),
            ));
        });
}

fn update_fill(
    mut events: EventReader<EnergyChanged>,
    mut fills: Query<&mut Node, With<EnergyBarFill>>,
) {
    let Some(level) = events.read().last() else {
        return;
    };
    for mut node in &mut fills {
        node.width = Val::Percent(level.0.clamp(0.0, 1.0) * 100.0);
    }
}

fn toggle_visibility(
    state: Res<State<GameState>>,
    mut roots: Query<&mut Visibility, With<EnergyBarRoot>>,
) {
    if !state.is_changed() {
        return;
    }
    let shown = matches!(state.get(), GameState::Playing | GameState::Paused);
    for mut visibility in &mut roots {
        *visibility = if shown {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}
