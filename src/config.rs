use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::value_cache::DEFAULT_EXPIRE_FRAMES;

/// Tunables of a [`History`](crate::command::History)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest groups are dropped once the history grows past this many
    pub max_groups: Option<usize>,
    /// Frames a continuous-edit tracker may go untouched before it is discarded
    pub expire_frames: u64,
    /// Keep stepping through groups that applied nothing during undo/redo
    pub skip_inert_groups: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_groups: None,
            expire_frames: DEFAULT_EXPIRE_FRAMES,
            skip_inert_groups: false,
        }
    }
}

impl HistoryConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
