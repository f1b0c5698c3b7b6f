//! Third-person orbit camera: mouse look orbits around the player, the
//! camera trails a fixed distance behind the focus point.

use bevy::prelude::*;

use crate::app::state::GameState;
use crate::core::components::{GameCamera, Player};
use crate::interaction::input::types::InputMap;

const ORBIT_DISTANCE: f32 = 6.0;
const FOCUS_HEIGHT: f32 = 1.5;
const LOOK_SENSITIVITY: f32 = 0.003;
const PITCH_MIN: f32 = -1.0;
const PITCH_MAX: f32 = 0.35;

#[derive(Component, Debug)]
pub struct OrbitRig {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: -0.3,
            distance: ORBIT_DISTANCE,
        }
    }
}

/// Camera placement for a rig orbiting `focus`.
pub fn orbit_transform(rig: &OrbitRig, focus: Vec3) -> Transform {
    let rotation = Quat::from_euler(EulerRot::YXZ, rig.yaw, rig.pitch, 0.0);
    let offset = rotation * Vec3::new(0.0, 0.0, rig.distance);
    Transform::from_translation(focus + offset).looking_at(focus, Vec3::Y)
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            follow_player.run_if(in_state(GameState::Playing)),
        );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        GameCamera,
        OrbitRig::default(),
        Transform::from_xyz(0.0, 4.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn follow_player(
    input: Res<InputMap>,
    players: Query<&Transform, (With<Player>, Without<GameCamera>)>,
    mut cameras: Query<(&mut Transform, &mut OrbitRig), With<GameCamera>>,
) {
    let Ok(player_tf) = players.single() else {
        return;
    };
    let Ok((mut camera_tf, mut rig)) = cameras.single_mut() else {
        return;
    };
    let look = input.axis2("Look");
    rig.yaw -= look.x * LOOK_SENSITIVITY;
    rig.pitch = (rig.pitch - look.y * LOOK_SENSITIVITY).clamp(PITCH_MIN, PITCH_MAX);

    let focus = player_tf.translation + Vec3::Y * FOCUS_HEIGHT;
    *camera_tf = orbit_transform(&rig, focus);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_sits_behind_focus_at_rig_distance() {
        let rig = OrbitRig {
            yaw: 0.0,
            pitch: 0.0,
            distance: 6.0,
        };
        let focus = Vec3::new(1.0, 2.0, 3.0);
        let tf = orbit_transform(&rig, focus);
        assert!((tf.translation.distance(focus) - 6.0).abs() < 1e-4);
        // Looking back at the focus point.
        let forward = tf.rotation * Vec3::NEG_Z;
        let to_focus = (focus - tf.translation).normalize();
        assert!(forward.dot(to_focus) > 0.999);
    }
}
