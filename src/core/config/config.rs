use anyhow::Context;
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

use crate::audio::sfx::SoundType;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Voltcrate".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub run_speed: f32,
    pub walk_speed: f32,
    pub push_speed: f32,
    pub rotate_speed: f32,
    pub gravity: f32,
    pub jump_height: f32,
    pub radius: f32,
    pub height: f32,
    /// Horizontal input magnitude below this produces no rotation or gait cue.
    pub move_deadzone: f32,
}
impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            run_speed: 6.0,
            walk_speed: 2.0,
            push_speed: 2.0,
            rotate_speed: 10.0,
            gravity: -20.0,
            jump_height: 1.2,
            radius: 0.35,
            height: 1.8,
            move_deadzone: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnergyConfig {
    pub max: f32,
    /// Units per second while actively pushing.
    pub drain_rate: f32,
}
impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max: 1.0,
            drain_rate: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InteractConfig {
    pub distance: f32,
    /// Window after any attach or detach during which the opposite
    /// transition is suppressed.
    pub attach_cooldown: f32,
    pub detach_cooldown: f32,
    /// Feet-above-cube-top tolerance for the standing-on-top rejection.
    pub on_top_epsilon: f32,
    /// Extra gap between cube face and player capsule at snap.
    pub snap_margin: f32,
}
impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            distance: 2.0,
            attach_cooldown: 0.2,
            detach_cooldown: 0.2,
            on_top_epsilon: 0.1,
            snap_margin: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExitConfig {
    pub distance: f32,
    /// Armed on level entry; the switch ignores interaction until elapsed.
    pub cooldown: f32,
    /// Wait for the switch cue before the elevator-close clip.
    pub cue_delay: f32,
    /// Wait after the close clip before the level load hands off.
    pub close_delay: f32,
}
impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            distance: 2.0,
            cooldown: 4.0,
            cue_delay: 1.0,
            close_delay: 1.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChargePlateConfig {
    pub radius: f32,
    /// Cue plays first; the elevator-open clip follows after this delay.
    pub open_delay: f32,
}
impl Default for ChargePlateConfig {
    fn default() -> Self {
        Self {
            radius: 1.2,
            open_delay: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Fade-out and fade-in each run this long.
    pub fade_duration: f32,
    /// BGM track index started when gameplay begins.
    pub gameplay_bgm: usize,
    /// Track looping under the main menu.
    pub menu_bgm: usize,
}
impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fade_duration: 1.5,
            gameplay_bgm: 1,
            menu_bgm: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SfxGroupConfig {
    pub category: SoundType,
    pub clips: Vec<String>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}
fn default_volume() -> f32 {
    1.0
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub bgm_volume: f32,
    pub bgm_tracks: Vec<String>,
    pub sfx: Vec<SfxGroupConfig>,
    pub footstep_walk_pitch: f32,
    pub footstep_run_pitch: f32,
}
impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bgm_volume: 0.1,
            bgm_tracks: Vec::new(),
            sfx: Vec::new(),
            footstep_walk_pitch: 0.7,
            footstep_run_pitch: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub energy: EnergyConfig,
    pub interact: InteractConfig,
    pub exit: ExitConfig,
    pub charge_plate: ChargePlateConfig,
    pub scene: SceneConfig,
    pub audio: AudioConfig,
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
        ron::from_str(&raw).with_context(|| format!("parse {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = GameConfig::default();
        assert!(cfg.player.gravity < 0.0);
        assert!(cfg.energy.max > 0.0);
        assert!(cfg.interact.attach_cooldown > 0.0);
        assert_eq!(cfg.exit.cooldown, 4.0);
        assert_eq!(cfg.audio.footstep_walk_pitch, 0.7);
    }

    #[test]
    fn partial_ron_fills_remaining_defaults() {
        let cfg: GameConfig =
            ron::from_str("(energy: (max: 2.0), window: (title: \"t\"))").unwrap();
        assert_eq!(cfg.energy.max, 2.0);
        // drain_rate falls back within the partially-specified section
        assert_eq!(cfg.energy.drain_rate, 0.2);
        assert_eq!(cfg.window.title, "t");
        assert_eq!(cfg.player.run_speed, 6.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GameConfig::load_from_file(dir.path().join("nope.ron")).is_err());
    }
}
