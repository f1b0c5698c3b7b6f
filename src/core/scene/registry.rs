//! Data-driven level registry: which levels exist, what they contain, and
//! which one gameplay starts in. Loaded once at startup from RON.

use anyhow::Context;
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CubeSpec {
    pub pos: [f32; 3],
    #[serde(default = "default_cube_half")]
    pub half_extent: f32,
    #[serde(default = "default_cube_half")]
    pub half_height: f32,
    /// Yaw in degrees; decides which local axis faces where for snapping.
    #[serde(default)]
    pub yaw_deg: f32,
}
fn default_cube_half() -> f32 {
    0.5
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatterySpec {
    pub pos: [f32; 3],
    #[serde(default = "default_battery_amount")]
    pub amount: f32,
}
fn default_battery_amount() -> f32 {
    1.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlateSpec {
    pub pos: [f32; 3],
    /// Elevator rig animated by the open/close clips.
    pub elevator: [f32; 3],
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExitSpec {
    pub pos: [f32; 3],
    /// Switch starts disabled until a charge plate arms it.
    #[serde(default)]
    pub starts_enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelEntry {
    pub id: String,
    /// Destination of the level-exit trigger; None loops back to the entry
    /// level.
    #[serde(default)]
    pub next: Option<String>,
    /// BGM track index started when this level loads through a transition.
    #[serde(default)]
    pub bgm_track: Option<usize>,
    pub player_start: [f32; 3],
    #[serde(default)]
    pub cubes: Vec<CubeSpec>,
    #[serde(default)]
    pub batteries: Vec<BatterySpec>,
    #[serde(default)]
    pub plates: Vec<PlateSpec>,
    #[serde(default)]
    pub exit: Option<ExitSpec>,
}

#[derive(Debug, Deserialize, Resource, Clone)]
pub struct LevelRegistry {
    pub version: u32,
    /// Level entered when gameplay starts from the main menu.
    pub entry: String,
    pub list: Vec<LevelEntry>,
}

impl Default for LevelRegistry {
    /// Single flat test level used when levels.ron is missing or broken.
    fn default() -> Self {
        Self {
            version: 1,
            entry: "sandbox".into(),
            list: vec![LevelEntry {
                id: "sandbox".into(),
                next: None,
                bgm_track: None,
                player_start: [0.0, 1.0, 4.0],
                cubes: vec![CubeSpec {
                    pos: [0.0, 0.5, 0.0],
                    half_extent: 0.5,
                    half_height: 0.5,
                    yaw_deg: 0.0,
                }],
                batteries: vec![],
                plates: vec![PlateSpec {
                    pos: [4.0, 0.0, 0.0],
                    elevator: [6.0, 1.5, 0.0],
                }],
                exit: Some(ExitSpec {
                    pos: [6.0, 0.0, 0.0],
                    starts_enabled: false,
                }),
            }],
        }
    }
}

impl LevelRegistry {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
        let reg: LevelRegistry =
            ron::from_str(&raw).with_context(|| format!("parse {path:?}"))?;
        anyhow::ensure!(
            reg.version == 1,
            "LevelRegistry version {} unsupported (expected 1)",
            reg.version
        );
        anyhow::ensure!(!reg.list.is_empty(), "LevelRegistry list empty");
        Ok(reg)
    }

    pub fn get(&self, id: &str) -> Option<&LevelEntry> {
        self.list.iter().find(|e| e.id == id)
    }

    /// Requested id if it exists, else the registry entry level.
    pub fn select(&self, requested: Option<&str>) -> &LevelEntry {
        if let Some(id) = requested {
            if let Some(found) = self.get(id) {
                return found;
            }
            warn!(target: "scene", "Requested level '{id}' not found; using '{}'", self.entry);
        }
        self.get(&self.entry)
            .unwrap_or_else(|| &self.list[0])
    }
}

/// Level override via env var; the CLI flag takes precedence in `main`.
pub fn level_id_from_env() -> Option<String> {
    std::env::var("LEVEL_ID")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

pub fn vec3(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LevelRegistry {
        ron::from_str(
            r#"(
                version: 1,
                entry: "level_1",
                list: [
                    (id: "level_1", next: Some("level_2"), player_start: (0.0, 1.0, 0.0)),
                    (id: "level_2", player_start: (0.0, 1.0, 4.0)),
                ],
            )"#,
        )
        .unwrap()
    }

    #[test]
    fn select_prefers_requested_then_entry() {
        let reg = sample();
        assert_eq!(reg.select(Some("level_2")).id, "level_2");
        assert_eq!(reg.select(Some("missing")).id, "level_1");
        assert_eq!(reg.select(None).id, "level_1");
    }

    #[test]
    fn registry_rejects_wrong_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.ron");
        std::fs::write(
            &path,
            r#"(version: 2, entry: "a", list: [(id: "a", player_start: [0.0, 0.0, 0.0])])"#,
        )
        .unwrap();
        assert!(LevelRegistry::load_from_file(&path).is_err());
    }
}
