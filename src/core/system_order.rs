//! Central system ordering labels to make the frame sequence explicit.
//! 1. Input collection (PreUpdate, owned by the input plugin)
//! 2. Protocol (attach/push handshake mutates position first)
//! 3. Movement (locomotion short-circuits while attached)
//! 4. Feedback (cues react to the resulting state deltas)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ProtocolSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct MovementSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct FeedbackSet;
