//! Animation cue dispatch: gameplay systems fire named clip requests and the
//! dispatcher applies the latest one to the character rig. No queueing; the
//! last request in a frame wins.

use bevy::prelude::*;

use crate::core::components::{ActiveClip, Player};
use crate::core::system_order::FeedbackSet;

/// Clip names used by gameplay; kept in one place so cue call sites and the
/// rig stay in sync.
pub mod clips {
    pub const IDLE: &str = "Idle";
    pub const WALKING: &str = "Walking";
    pub const RUNNING: &str = "Running";
    pub const JUMP: &str = "Jump";
    pub const PUSHING: &str = "Pushing";
    pub const PUSH_POSE: &str = "Push_Pose";
    pub const OPEN_ELEVATOR: &str = "OpenElevator";
    pub const CLOSE_ELEVATOR: &str = "CloseElevator";
}

#[derive(Event, Debug, Clone)]
pub struct PlayClip {
    /// Target rig; None addresses the player character.
    pub target: Option<Entity>,
    pub name: String,
}

impl PlayClip {
    pub fn player(name: &str) -> Self {
        Self {
            target: None,
            name: name.to_string(),
        }
    }

    pub fn on(target: Entity, name: &str) -> Self {
        Self {
            target: Some(target),
            name: name.to_string(),
        }
    }
}

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayClip>()
            .add_systems(Update, dispatch_clip_cues.in_set(FeedbackSet));
    }
}

fn dispatch_clip_cues(
    mut events: EventReader<PlayClip>,
    mut player_q: Query<(Entity, &mut ActiveClip), With<Player>>,
    mut rig_q: Query<&mut ActiveClip, Without<Player>>,
) {
    for ev in events.read() {
        match ev.target {
            None => {
                let Ok((entity, mut clip)) = player_q.single_mut() else {
                    // Missing rig degrades to a skipped cue.
                    continue;
                };
                if clip.0 != ev.name {
                    debug!(target: "feedback", "clip {:?} -> '{}'", entity, ev.name);
                    clip.0 = ev.name.clone();
                }
            }
            Some(target) => {
                let Ok(mut clip) = rig_q.get_mut(target) else {
                    continue;
                };
                if clip.0 != ev.name {
                    debug!(target: "feedback", "clip {:?} -> '{}'", target, ev.name);
                    clip.0 = ev.name.clone();
                }
            }
        }
    }
}
