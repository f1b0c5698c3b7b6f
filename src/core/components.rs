use bevy::prelude::*;

use crate::core::cooldown::Cooldown;

/// The controllable character. Vertical velocity persists across frames for
/// the gravity/jump arc; horizontal displacement is recomputed every frame.
#[derive(Component, Debug)]
pub struct Player {
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub jumping: bool,
    /// Capsule dimensions used for ground/on-top queries and snap offsets.
    pub radius: f32,
    pub height: f32,
    /// Suppresses attach/detach flicker on a held interact button.
    pub attach_cooldown: Cooldown,
}

impl Player {
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            vertical_velocity: 0.0,
            grounded: false,
            jumping: false,
            radius,
            height,
            attach_cooldown: Cooldown::idle(),
        }
    }

    /// Feet height used for the standing-on-top-of-cube check.
    pub fn feet_y(&self, translation_y: f32) -> f32 {
        translation_y - self.height * 0.5 + self.radius
    }
}

/// Player side of the attach/push handshake.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub enum PushState {
    #[default]
    Idle,
    /// In range of a cube that accepts an attach.
    Nearby(Entity),
    /// Holding the cube, no forward input.
    Attached(Entity),
    /// Holding and displacing the cube.
    Pushing(Entity),
}

impl PushState {
    pub fn holding(&self) -> Option<Entity> {
        match self {
            PushState::Attached(e) | PushState::Pushing(e) => Some(*e),
            _ => None,
        }
    }
}

/// A pushable energy cube. Single-owner: `held` is the attach lock.
#[derive(Component, Debug)]
pub struct EnergyCube {
    pub half_extent: f32,
    pub half_height: f32,
    pub held: bool,
    /// Blocks re-attach for a short window after a detach.
    pub detach_cooldown: Cooldown,
}

impl EnergyCube {
    pub fn new(half_extent: f32, half_height: f32) -> Self {
        Self {
            half_extent,
            half_height,
            held: false,
            detach_cooldown: Cooldown::idle(),
        }
    }

    pub fn top_y(&self, translation_y: f32) -> f32 {
        translation_y + self.half_height
    }
}

/// Everything spawned as part of a level; despawned wholesale on scene change.
#[derive(Component, Debug, Default)]
pub struct LevelEntity;

/// Tag for the third-person gameplay camera (movement derives its basis from it).
#[derive(Component, Debug, Default)]
pub struct GameCamera;

/// Latest animation clip requested for a rig; fire-and-forget, last write wins.
#[derive(Component, Debug, Default)]
pub struct ActiveClip(pub String);
