//! # Configuration
//!
//! Settings are managed by [`confique`], layered in priority order:
//! 1. **Environment variables**: `WORKOUT_DATA_DIR`, `WORKOUT_SAVE_DEBOUNCE_MS`,
//!    `WORKOUT_IMPORT_LIMIT`, `WORKOUT_HEALTH_EXPORT`.
//! 2. **Config file**: `workout.toml` in the OS config directory (via
//!    `directories`). A missing file is not an error.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where `saved_workouts.json` and friends live |
//! | `save_debounce_ms` | `500` | Quiet period before the store writes |
//! | `import_limit` | `100` | Activities requested per import |
//! | `import_timeout_secs` | `30` | Bound on the activity fetch |
//! | `metric_timeout_secs` | `10` | Bound on each energy query |
//! | `health_export` | none | Health export file used by `workout import` |

use crate::error::{Result, WorkoutError};
use crate::import::ImportSettings;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "workout.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "jstoen", "workout")
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkoutConfig {
    /// Directory holding the persisted data. Defaults to the OS data directory.
    #[config(env = "WORKOUT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(default = 500, env = "WORKOUT_SAVE_DEBOUNCE_MS")]
    pub save_debounce_ms: u64,

    #[config(default = 100, env = "WORKOUT_IMPORT_LIMIT")]
    pub import_limit: usize,

    #[config(default = 30)]
    pub import_timeout_secs: u64,

    #[config(default = 10)]
    pub metric_timeout_secs: u64,

    /// Health-data export read by the desktop import provider.
    #[config(env = "WORKOUT_HEALTH_EXPORT")]
    pub health_export: Option<PathBuf>,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            save_debounce_ms: 500,
            import_limit: 100,
            import_timeout_secs: 30,
            metric_timeout_secs: 10,
            health_export: None,
        }
    }
}

impl WorkoutConfig {
    /// Load from the environment and `file` (when given), over the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| WorkoutError::Config(e.to_string()))
    }

    /// Load using the default config file location.
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_config_file().as_deref())
    }

    pub fn default_config_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| WorkoutError::Config("no home directory found".to_string())),
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            fetch_limit: self.import_limit,
            fetch_timeout: Duration::from_secs(self.import_timeout_secs),
            metric_timeout: Duration::from_secs(self.metric_timeout_secs),
        }
    }
}
