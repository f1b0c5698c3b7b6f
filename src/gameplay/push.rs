//! Attach/push protocol between the player and an energy cube: proximity
//! detection, directional snap-attach, cooperative push displacement with
//! energy drain, and cooldown-protected detach.

use bevy::prelude::*;

use crate::app::state::GameState;
use crate::audio::sfx::{LoopChannel, StartLoopCue, StopLoopCue};
use crate::core::components::{EnergyCube, Player, PushState};
use crate::core::config::GameConfig;
use crate::core::system_order::ProtocolSet;
use crate::feedback::{clips, PlayClip};
use crate::gameplay::energy::{Energy, EnergyChanged};
use crate::interaction::input::types::InputMap;
use crate::ui::prompt::InfoPrompt;

/// Cube-local horizontal axes in enumeration order: front, back, right,
/// left. The first maximal dot product wins, so ties are deterministic.
pub fn side_axes(rotation: Quat) -> [Vec3; 4] {
    [
        rotation * Vec3::NEG_Z,
        rotation * Vec3::Z,
        rotation * Vec3::X,
        rotation * Vec3::NEG_X,
    ]
}

/// Axis most aligned with the player-to-cube direction.
pub fn snap_axis(rotation: Quat, player_pos: Vec3, cube_pos: Vec3) -> Vec3 {
    let to_cube = (cube_pos - player_pos).normalize_or_zero();
    let mut best = side_axes(rotation)[0];
    let mut best_dot = f32::MIN;
    for axis in side_axes(rotation) {
        let dot = to_cube.dot(axis);
        if dot > best_dot {
            best_dot = dot;
            best = axis;
        }
    }
    best
}

/// Where the player stands after snapping to `axis`: offset from the cube
/// surface by half-extent + capsule radius + margin, height preserved.
pub fn stand_position(
    cube_pos: Vec3,
    axis: Vec3,
    half_extent: f32,
    player_radius: f32,
    margin: f32,
    player_y: f32,
) -> Vec3 {
    let mut pos = cube_pos - axis * (half_extent + player_radius + margin);
    pos.y = player_y;
    pos
}

/// Standing on top disqualifies the attach (you cannot push what you ride).
pub fn standing_on_top(feet_y: f32, cube_top_y: f32, epsilon: f32) -> bool {
    feet_y > cube_top_y - epsilon
}

pub struct PushProtocolPlugin;

impl Plugin for PushProtocolPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                tick_protocol_cooldowns,
                update_proximity,
                handle_attach_detach,
                push_move,
            )
                .chain()
                .in_set(ProtocolSet)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn tick_protocol_cooldowns(
    time: Res<Time>,
    mut player_q: Query<&mut Player>,
    mut cubes: Query<&mut EnergyCube>,
) {
    let dt = time.delta_secs();
    for mut player in &mut player_q {
        player.attach_cooldown.tick(dt);
    }
    for mut cube in &mut cubes {
        cube.detach_cooldown.tick(dt);
    }
}

fn update_proximity(
    cfg: Res<GameConfig>,
    mut player_q: Query<(&Transform, &Player, &mut PushState)>,
    cubes: Query<(Entity, &Transform, &EnergyCube)>,
    mut prompt: ResMut<InfoPrompt>,
) {
    let Ok((player_tf, player, mut state)) = player_q.single_mut() else {
        return;
    };
    // Holding a cube: proximity is irrelevant until detach.
    if state.holding().is_some() {
        return;
    }

    let mut nearby = None;
    for (entity, cube_tf, cube) in &cubes {
        if cube.held || !cube.detach_cooldown.ready() {
            continue;
        }
        let dist = cube_tf.translation.distance(player_tf.translation);
        if dist >= cfg.interact.distance {
            continue;
        }
        let on_top = standing_on_top(
            player.feet_y(player_tf.translation.y),
            cube.top_y(cube_tf.translation.y),
            cfg.interact.on_top_epsilon,
        );
        if !on_top {
            nearby = Some(entity);
            break;
        }
    }

    match nearby {
        Some(entity) => {
            *state = PushState::Nearby(entity);
            prompt.set("Press F to push the cube");
        }
        None => {
            if matches!(*state, PushState::Nearby(_)) {
                prompt.clear();
            }
            *state = PushState::Idle;
        }
    }
}

fn handle_attach_detach(
    cfg: Res<GameConfig>,
    input: Res<InputMap>,
    mut player_q: Query<(&mut Transform, &mut Player, &mut PushState), Without<EnergyCube>>,
    mut cubes: Query<(&Transform, &mut EnergyCube)>,
    mut clips_ev: EventWriter<PlayClip>,
    mut loop_stop: EventWriter<StopLoopCue>,
    mut prompt: ResMut<InfoPrompt>,
) {
    if !input.just_pressed("Push") {
        return;
    }
    let Ok((mut player_tf, mut player, mut state)) = player_q.single_mut() else {
        return;
    };

    if let Some(held) = state.holding() {
        // Detach only after the flicker-suppression window.
        if !player.attach_cooldown.ready() {
            return;
        }
        if let Ok((_, mut cube)) = cubes.get_mut(held) {
            cube.held = false;
            cube.detach_cooldown.arm(cfg.interact.detach_cooldown);
        }
        player.attach_cooldown.arm(cfg.interact.attach_cooldown);
        *state = PushState::Idle;
        clips_ev.write(PlayClip::player(clips::IDLE));
        loop_stop.write(StopLoopCue(LoopChannel::Push));
        return;
    }

    let PushState::Nearby(cube_entity) = *state else {
        return;
    };
    if !player.attach_cooldown.ready() {
        return;
    }
    let Ok((cube_tf, mut cube)) = cubes.get_mut(cube_entity) else {
        *state = PushState::Idle;
        return;
    };

    let axis = snap_axis(cube_tf.rotation, player_tf.translation, cube_tf.translation);
    player_tf.translation = stand_position(
        cube_tf.translation,
        axis,
        cube.half_extent,
        player.radius,
        cfg.interact.snap_margin,
        player_tf.translation.y,
    );
    player_tf.rotation = Transform::IDENTITY.looking_to(axis, Vec3::Y).rotation;

    cube.held = true;
    player.attach_cooldown.arm(cfg.interact.attach_cooldown);
    *state = PushState::Attached(cube_entity);
    clips_ev.write(PlayClip::player(clips::PUSH_POSE));
    prompt.clear();
}

fn push_move(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    input: Res<InputMap>,
    mut energy: ResMut<Energy>,
    mut player_q: Query<(&mut Transform, &mut Player, &mut PushState), Without<EnergyCube>>,
    mut cubes: Query<(&mut Transform, &mut EnergyCube)>,
    mut clips_ev: EventWriter<PlayClip>,
    mut loop_start: EventWriter<StartLoopCue>,
    mut loop_stop: EventWriter<StopLoopCue>,
    mut changed: EventWriter<EnergyChanged>,
) {
    let Ok((mut player_tf, mut player, mut state)) = player_q.single_mut() else {
        return;
    };
    let Some(cube_entity) = state.holding() else {
        return;
    };
    let Ok((mut cube_tf, mut cube)) = cubes.get_mut(cube_entity) else {
        *state = PushState::Idle;
        return;
    };

    let forward_input = input.axis2("Move").y;
    let was_pushing = matches!(*state, PushState::Pushing(_));
    let pushing = forward_input > 0.0 && !energy.is_empty();

    if pushing {
        let dir = (player_tf.rotation * Vec3::NEG_Z).normalize_or_zero();
        let step = dir * cfg.player.push_speed * time.delta_secs();
        cube_tf.translation += step;
        player_tf.translation += step;

        energy.drain(cfg.energy.drain_rate, time.delta_secs());
        changed.write(EnergyChanged(energy.normalized()));

        *state = PushState::Pushing(cube_entity);
        clips_ev.write(PlayClip::player(clips::PUSHING));
        loop_start.write(StartLoopCue {
            channel: LoopChannel::Push,
            pitch: 1.0,
        });
    } else if matches!(*state, PushState::Pushing(_)) {
        // Pose only; no displacement, no drain.
        *state = PushState::Attached(cube_entity);
        clips_ev.write(PlayClip::player(clips::PUSH_POSE));
        loop_stop.write(StopLoopCue(LoopChannel::Push));
    }

    // Exhaustion forces the detach in the same update that reached zero,
    // whether the drain landed here or outside. Only a push is subject to
    // it; a plain attach at zero energy holds.
    if energy.is_empty() && (was_pushing || matches!(*state, PushState::Pushing(_))) {
        cube.held = false;
        cube.detach_cooldown.arm(cfg.interact.detach_cooldown);
        player.attach_cooldown.arm(cfg.interact.attach_cooldown);
        *state = PushState::Idle;
        clips_ev.write(PlayClip::player(clips::IDLE));
        loop_stop.write(StopLoopCue(LoopChannel::Push));
    }
}
