//! Data directory and file locations
//!
//! Paths come from a pure lookup over environment variables so tests can
//! resolve them without touching the process environment.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Overrides the data directory
pub const DATA_DIR_VAR: &str = "NEON_SNAKE_DATA_DIR";
/// Overrides the high score file
pub const HIGHSCORE_FILE_VAR: &str = "NEON_SNAKE_HIGHSCORE_FILE";

const APP_DIR: &str = "neon-snake";
const HIGHSCORE_FILE: &str = "highscore.txt";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Where the game keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub highscore_file: PathBuf,
    pub settings_file: PathBuf,
}

impl DataPaths {
    /// Resolve paths from an environment lookup
    pub fn resolve(env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir(&non_empty));
        let highscore_file = non_empty(HIGHSCORE_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(HIGHSCORE_FILE));
        let settings_file = data_dir.join(SETTINGS_FILE);

        Self {
            data_dir,
            highscore_file,
            settings_file,
        }
    }

    /// Resolve paths from the process environment
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }
}

#[cfg(target_os = "windows")]
fn default_data_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    env("LOCALAPPDATA")
        .map(PathBuf::from)
        .or_else(|| env("USERPROFILE").map(|home| PathBuf::from(home).join("AppData").join("Local")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(target_os = "macos")]
fn default_data_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    env("HOME")
        .map(|home| PathBuf::from(home).join("Library").join("Application Support"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_data_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    env("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Read a whole file as text
pub fn read_text(path: &Path) -> Result<String, PersistenceError> {
    fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write text, creating parent directories first
pub fn write_text(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}
