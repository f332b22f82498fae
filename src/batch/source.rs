//! Filesystem-backed game source.

use super::{GameBundle, GameSource};
use crate::cli::types::GameId;
use crate::error::{Result, RinkError};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads one `<game_id>.json` bundle per game from a directory.
///
/// This is the seam the fetch collaborator delivers into; the pipeline
/// itself never talks to the network.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, game_id: GameId) -> PathBuf {
        self.dir.join(format!("{}.json", game_id.as_u64()))
    }
}

impl GameSource for JsonDirSource {
    fn load(&self, game_id: GameId) -> Result<GameBundle> {
        let path = self.path_for(game_id);
        let text = fs::read_to_string(&path).map_err(|e| RinkError::Source {
            message: format!("{}: {e}", path.display()),
        })?;
        serde_json::from_str(&text).map_err(|e| RinkError::Source {
            message: format!("{}: {e}", path.display()),
        })
    }
}
