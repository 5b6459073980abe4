//! Best score persistence
//!
//! The file holds a single decimal integer. Anything unreadable counts
//! as no score yet.

use std::path::{Path, PathBuf};

use crate::persistence::{self, PersistenceError};

/// Best score backed by a text file
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
    best: u64,
}

impl HighScoreStore {
    /// Load the stored best; missing or corrupt files give 0
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = match read_best(&path) {
            Ok(best) => {
                log::info!("Loaded high score {} from {}", best, path.display());
                best
            }
            Err(PersistenceError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("No high score yet at {}", path.display());
                0
            }
            Err(e) => {
                log::warn!("Ignoring high score file: {}", e);
                0
            }
        };
        Self { path, best }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a finished or running score
    ///
    /// Returns true on a new best. The new best is kept in memory even when
    /// writing it out fails.
    pub fn record(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        match persistence::write_text(&self.path, &score.to_string()) {
            Ok(()) => log::info!("New high score {}", score),
            Err(e) => log::warn!("Could not save high score: {}", e),
        }
        true
    }
}

fn read_best(path: &Path) -> Result<u64, PersistenceError> {
    let text = persistence::read_text(path)?;
    text.trim()
        .parse::<u64>()
        .map_err(|e| PersistenceError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
