//! Player locomotion: camera-relative run/walk, gravity integration, jump,
//! and grounding via the kinematic character controller. Skipped entirely
//! while the player holds a cube; the push protocol owns movement then.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{KinematicCharacterController, KinematicCharacterControllerOutput};

use crate::app::state::GameState;
use crate::audio::sfx::{LoopChannel, PlaySfx, SoundType, StartLoopCue, StopLoopCue};
use crate::core::components::{GameCamera, Player, PushState};
use crate::core::config::GameConfig;
use crate::core::system_order::MovementSet;
use crate::feedback::{clips, PlayClip};
use crate::interaction::input::types::InputMap;

/// Initial vertical velocity for a jump reaching `height` under `gravity`
/// (gravity is negative): v = sqrt(h * -2g).
pub fn jump_velocity(height: f32, gravity: f32) -> f32 {
    (height * -2.0 * gravity).sqrt()
}

/// Stick input mapped onto the ground plane, relative to the camera's yaw.
/// Input y is forward, x is strafe; the result is horizontal and at most
/// unit length.
pub fn camera_relative_move(input: Vec2, camera_rotation: Quat) -> Vec3 {
    let mut forward = camera_rotation * Vec3::NEG_Z;
    forward.y = 0.0;
    let mut right = camera_rotation * Vec3::X;
    right.y = 0.0;
    let dir = forward.normalize_or_zero() * input.y + right.normalize_or_zero() * input.x;
    dir.clamp_length_max(1.0)
}

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (read_grounding, apply_movement)
                .chain()
                .in_set(MovementSet)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn read_grounding(
    mut players: Query<(&mut Player, &KinematicCharacterControllerOutput)>,
    mut sfx: EventWriter<PlaySfx>,
) {
    for (mut player, output) in &mut players {
        let was_grounded = player.grounded;
        player.grounded = output.grounded;
        if player.grounded && !was_grounded && player.jumping {
            player.jumping = false;
            sfx.write(PlaySfx(SoundType::Land));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_movement(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    input: Res<InputMap>,
    camera: Query<&Transform, (With<GameCamera>, Without<Player>)>,
    mut players: Query<(
        &mut Transform,
        &mut Player,
        &PushState,
        &mut KinematicCharacterController,
    )>,
    mut clips_ev: EventWriter<PlayClip>,
    mut sfx: EventWriter<PlaySfx>,
    mut loop_start: EventWriter<StartLoopCue>,
    mut loop_stop: EventWriter<StopLoopCue>,
) {
    let dt = time.delta_secs();
    let Ok((mut transform, mut player, push_state, mut controller)) = players.single_mut() else {
        return;
    };
    if push_state.holding().is_some() {
        controller.translation = None;
        return;
    }

    let stick = input.axis2("Move");
    let stick = if stick.length() < cfg.player.move_deadzone {
        Vec2::ZERO
    } else {
        stick
    };
    let camera_rot = camera.single().map(|t| t.rotation).unwrap_or_default();
    let wish = camera_relative_move(stick, camera_rot);

    let walking = input.pressed("Walk");
    let speed = if walking {
        cfg.player.walk_speed
    } else {
        cfg.player.run_speed
    };
    let horizontal = wish * speed;

    if input.just_pressed("Jump") && player.grounded {
        player.vertical_velocity = jump_velocity(cfg.player.jump_height, cfg.player.gravity);
        player.jumping = true;
        clips_ev.write(PlayClip::player(clips::JUMP));
        sfx.write(PlaySfx(SoundType::Jump));
    }
    if player.grounded && player.vertical_velocity < 0.0 {
        // Small downward bias keeps the controller reporting ground contact.
        player.vertical_velocity = -2.0;
    }
    player.vertical_velocity += cfg.player.gravity * dt;

    controller.translation =
        Some((horizontal + Vec3::Y * player.vertical_velocity) * dt);

    // Face the movement direction.
    if wish.length_squared() > 1e-6 {
        let target = Transform::IDENTITY.looking_to(wish, Vec3::Y).rotation;
        transform.rotation = transform
            .rotation
            .slerp(target, (cfg.player.rotate_speed * dt).min(1.0));
    }

    // Gait cues and footstep loop.
    let moving = wish.length_squared() > 1e-6;
    if player.grounded && moving {
        let pitch = if walking {
            cfg.audio.footstep_walk_pitch
        } else {
            cfg.audio.footstep_run_pitch
        };
        loop_start.write(StartLoopCue {
            channel: LoopChannel::Footstep,
            pitch,
        });
        clips_ev.write(PlayClip::player(if walking {
            clips::WALKING
        } else {
            clips::RUNNING
        }));
    } else {
        loop_stop.write(StopLoopCue(LoopChannel::Footstep));
        if player.grounded {
            clips_ev.write(PlayClip::player(clips::IDLE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_velocity_reaches_requested_height() {
        // With v = sqrt(h * -2g), peak height h = v^2 / -2g exactly.
        let g = -20.0;
        let v = jump_velocity(1.2, g);
        let peak = v * v / (-2.0 * g);
        assert!((peak - 1.2).abs() < 1e-5);
    }

    #[test]
    fn move_is_camera_relative_and_horizontal() {
        // Camera yawed 90 degrees: pushing forward moves along world -X.
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let dir = camera_relative_move(Vec2::new(0.0, 1.0), rot);
        assert!((dir - Vec3::NEG_X).length() < 1e-4);
        assert_eq!(dir.y, 0.0);
    }

    #[test]
    fn pitched_camera_still_yields_unit_ground_speed() {
        let rot = Quat::from_rotation_x(-0.6);
        let dir = camera_relative_move(Vec2::new(0.0, 1.0), rot);
        assert!((dir.length() - 1.0).abs() < 1e-4);
        assert_eq!(dir.y, 0.0);
    }

    #[test]
    fn diagonal_input_is_clamped() {
        let dir = camera_relative_move(Vec2::splat(1.0), Quat::IDENTITY);
        assert!(dir.length() <= 1.0 + 1e-5);
    }
}
