//! Saving and loading replays together with their run metadata
//!
//! A replay is saved as two files:
//! - `<path>` - the replay document (JSON array of frames)
//! - `<path>.meta.json` - grid size, modes and the scored outcome
//!
//! The frame document stays a bare array so any consumer of the replay
//! format can read it; the sidecar is optional on load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::log::ReplayLog;
use crate::error::{Error, Result};
use crate::eval::{EpisodeOutcome, FitnessStrategy};
use crate::game::{BoundaryMode, SpawnMode, WorldConfig};

/// Metadata saved next to a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayMetadata {
    /// Grid width in cells
    pub grid_width: usize,

    /// Grid height in cells
    pub grid_height: usize,

    pub spawn_mode: SpawnMode,

    pub boundary_mode: BoundaryMode,

    /// Strategy that produced `fitness`
    pub strategy: FitnessStrategy,

    /// Apples eaten
    pub score: u32,

    /// Steps simulated, equal to the number of frames
    pub steps: u32,

    pub fitness: f64,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ReplayMetadata {
    pub fn new(world: &WorldConfig, strategy: FitnessStrategy, outcome: &EpisodeOutcome) -> Self {
        Self {
            grid_width: world.grid_width,
            grid_height: world.grid_height,
            spawn_mode: world.spawn_mode,
            boundary_mode: world.boundary_mode,
            strategy,
            score: outcome.score,
            steps: outcome.steps,
            fitness: outcome.fitness,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata sidecar for a replay document
pub fn metadata_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".meta.json");
    PathBuf::from(name)
}

/// Save a replay and its metadata
pub fn save_replay(log: &ReplayLog, metadata: &ReplayMetadata, path: &Path) -> Result<()> {
    log.save(path)?;

    let meta_path = metadata_path(path);
    let meta_json = serde_json::to_string_pretty(metadata)?;
    std::fs::write(&meta_path, meta_json).map_err(|e| Error::io(&meta_path, e))?;

    info!(
        path = %path.display(),
        frames = log.len(),
        score = metadata.score,
        fitness = metadata.fitness,
        "replay saved"
    );
    Ok(())
}

/// Load a replay and, when present, its metadata
pub fn load_replay(path: &Path) -> Result<(ReplayLog, Option<ReplayMetadata>)> {
    let log = ReplayLog::load(path)?;

    let meta_path = metadata_path(path);
    let metadata = match std::fs::read_to_string(&meta_path) {
        Ok(json) => Some(serde_json::from_str(&json).map_err(|e| Error::document(&meta_path, e))?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %meta_path.display(), "no replay metadata");
            None
        }
        Err(e) => return Err(Error::io(&meta_path, e)),
    };

    Ok((log, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{EpisodeEnd, StrategyKind};
    use crate::game::{Cell, CollisionType};
    use crate::replay::Frame;
    use tempfile::TempDir;

    fn outcome() -> EpisodeOutcome {
        EpisodeOutcome {
            score: 2,
            steps: 2,
            fitness: 202.0,
            shaped_reward: 0.0,
            end: EpisodeEnd::Collision(CollisionType::Wall),
        }
    }

    fn log() -> ReplayLog {
        ReplayLog::from(vec![
            Frame {
                snake: vec![Cell::new(1, 1)],
                apples: vec![Cell::new(2, 1)],
                score: 1,
            },
            Frame {
                snake: vec![Cell::new(2, 1), Cell::new(1, 1)],
                apples: vec![Cell::new(3, 3)],
                score: 2,
            },
        ])
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(
            metadata_path(Path::new("out/game_states.json")),
            PathBuf::from("out/game_states.json.meta.json")
        );
    }

    #[test]
    fn test_save_and_load_with_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game_states.json");
        let metadata = ReplayMetadata::new(
            &WorldConfig::new(12, 8),
            FitnessStrategy::new(StrategyKind::Balanced),
            &outcome(),
        );

        save_replay(&log(), &metadata, &path).unwrap();
        let (loaded, loaded_meta) = load_replay(&path).unwrap();

        assert_eq!(loaded, log());
        let loaded_meta = loaded_meta.unwrap();
        assert_eq!(loaded_meta, metadata);
        assert_eq!(loaded_meta.grid_width, 12);
        assert_eq!(loaded_meta.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_metadata_is_optional() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bare.json");
        log().save(&path).unwrap();

        let (loaded, metadata) = load_replay(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert!(metadata.is_none());
    }
}
