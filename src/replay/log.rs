//! Frame recording and the replay document
//!
//! A replay document is one JSON array with an element per simulated step:
//!
//! ```json
//! [
//!   {"snake": [[15, 15]], "apples": [[3, 7]], "score": 0},
//!   {"snake": [[16, 15]], "apples": [[3, 7]], "score": 0}
//! ]
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::eval::FitnessStrategy;
use crate::game::{Cell, GridWorld};

/// Snapshot of the world after one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Snake cells, head first
    pub snake: Vec<Cell>,
    pub apples: Vec<Cell>,
    pub score: u32,
}

impl Frame {
    /// Capture the current state of a world
    pub fn capture<R: Rng>(world: &GridWorld<R>) -> Self {
        Self {
            snake: world.snake().cells().copied().collect(),
            apples: world.apples().to_vec(),
            score: world.score(),
        }
    }
}

/// Ordered frames of one episode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayLog {
    frames: Vec<Frame>,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append the next frame in step order
    pub fn record(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Score the recorded episode: apples from the last frame, steps from
    /// the frame count
    pub fn fitness(&self, strategy: &FitnessStrategy) -> f64 {
        let apples = self.last().map_or(0, |frame| frame.score);
        let steps = u32::try_from(self.len()).unwrap_or(u32::MAX);
        strategy.evaluate(apples, steps)
    }

    /// Serialize to the replay document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.frames)?)
    }

    /// Parse a replay document
    pub fn from_json(json: &str) -> Result<Self> {
        let frames: Vec<Frame> = serde_json::from_str(json)?;
        Ok(Self { frames })
    }

    /// Write the replay document, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    /// Read a replay document
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let frames: Vec<Frame> =
            serde_json::from_str(&json).map_err(|e| Error::document(path, e))?;
        Ok(Self { frames })
    }
}

impl From<Vec<Frame>> for ReplayLog {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl<'a> IntoIterator for &'a ReplayLog {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{StrategyKind, StrategyRegistry};
    use crate::game::{Direction, WorldConfig};
    use tempfile::TempDir;

    fn frame(snake: &[(i32, i32)], apples: &[(i32, i32)], score: u32) -> Frame {
        Frame {
            snake: snake.iter().copied().map(Cell::from).collect(),
            apples: apples.iter().copied().map(Cell::from).collect(),
            score,
        }
    }

    fn sample_log() -> ReplayLog {
        ReplayLog::from(vec![
            frame(&[(5, 5)], &[(6, 5)], 0),
            frame(&[(6, 5)], &[(1, 1), (2, 8), (9, 0)], 1),
            frame(&[(6, 4), (6, 5)], &[(1, 1), (2, 8), (9, 0)], 1),
        ])
    }

    #[test]
    fn test_document_format() {
        let log = ReplayLog::from(vec![frame(&[(2, 3), (1, 3)], &[(4, 0)], 2)]);
        let value: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"snake": [[2, 3], [1, 3]], "apples": [[4, 0]], "score": 2}])
        );
    }

    #[test]
    fn test_roundtrip_with_multiple_apples() {
        let log = sample_log();
        let back = ReplayLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run").join("game_states.json");

        let log = sample_log();
        log.save(&path).unwrap();

        assert_eq!(ReplayLog::load(&path).unwrap(), log);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ReplayLog::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_load_malformed_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, r#"[{"snake": [[1]], "apples": [], "score": 0}]"#).unwrap();

        let err = ReplayLog::load(&path).unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn test_empty_log() {
        let log = ReplayLog::from_json("[]").unwrap();
        assert!(log.is_empty());
        let strategy = StrategyRegistry::builtin().get("balanced").unwrap();
        assert_eq!(log.fitness(&strategy), 0.0);
    }

    #[test]
    fn test_fitness_from_recorded_episode() {
        let strategy = FitnessStrategy::new(StrategyKind::Balanced);
        // score 1 after 3 steps
        assert_eq!(sample_log().fitness(&strategy), 103.0);
    }

    #[test]
    fn test_capture() {
        let mut world = GridWorld::new(WorldConfig::small().with_seed(3)).unwrap();
        world.step(Direction::Up);

        let frame = Frame::capture(&world);

        assert_eq!(frame.snake, vec![Cell::new(5, 4)]);
        assert_eq!(frame.apples, world.apples());
        assert_eq!(frame.score, world.score());
    }
}
