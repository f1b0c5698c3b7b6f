//! Persisted boolean preferences (audio mute toggles). Stored as a small RON
//! map next to the config assets; a missing or corrupt file degrades to
//! defaults, never a fault.

use anyhow::Context;
use bevy::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Resource, Debug)]
pub struct Prefs {
    path: PathBuf,
    values: HashMap<String, bool>,
}

impl Prefs {
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_file(&path) {
            Ok(v) => v,
            Err(e) => {
                if path.exists() {
                    warn!(target: "prefs", "Failed to read {:?}: {e:#}; using defaults", path);
                }
                HashMap::new()
            }
        };
        Self { path, values }
    }

    fn read_file(path: &Path) -> anyhow::Result<HashMap<String, bool>> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
        ron::from_str(&raw).with_context(|| format!("parse {path:?}"))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    /// Sets and persists immediately; a write failure is logged and ignored.
    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
        if let Err(e) = self.write_file() {
            warn!(target: "prefs", "Failed to persist {:?}: {e:#}", self.path);
        }
    }

    fn write_file(&self) -> anyhow::Result<()> {
        let raw = ron::ser::to_string_pretty(&self.values, Default::default())
            .context("serialize prefs")?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("create {dir:?}"))?;
        }
        std::fs::write(&self.path, raw).with_context(|| format!("write {:?}", self.path))
    }
}
