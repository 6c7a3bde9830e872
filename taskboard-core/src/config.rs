/// Configuration for the task board.
/// Reads config.json from ~/.config/taskboard/config.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{DEFAULT_PRIORITY_LEVEL, DEFAULT_TASK_PROGRESS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    #[serde(default)]
    pub template_defaults: TemplateDefaults,
    /// Directory for local board snapshots. Platform data dir when unset.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

/// Lookup ids backfilled into template tasks that don't carry their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefaults {
    #[serde(default = "default_priority_level")]
    pub priority_level: u64,
    #[serde(default = "default_task_progress")]
    pub task_progress: u64,
}

fn default_priority_level() -> u64 {
    DEFAULT_PRIORITY_LEVEL
}

fn default_task_progress() -> u64 {
    DEFAULT_TASK_PROGRESS
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            priority_level: default_priority_level(),
            task_progress: default_task_progress(),
        }
    }
}

/// Default config path: ~/.config/taskboard/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join("config.json")
}

/// Snapshot directory from config, or the platform-local data dir.
pub fn resolve_snapshot_dir(configured: &Option<PathBuf>) -> PathBuf {
    match configured {
        Some(dir) => dir.clone(),
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskboard")
            .join("snapshots"),
    }
}

/// Load config from path. Returns default if the file doesn't exist or can't be parsed.
pub fn load_config(path: &Path) -> BoardConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!(
                "[taskboard.config] Failed to parse config {}: {}",
                path.display(),
                e
            );
            BoardConfig::default()
        }),
        Err(_) => {
            log::info!(
                "[taskboard.config] No config at {}, using defaults",
                path.display()
            );
            BoardConfig::default()
        }
    }
}
