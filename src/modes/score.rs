//! Re-scoring a saved replay with a named fitness strategy
//!
//! Apples come from the last frame's score and steps from the frame
//! count, so any strategy in the registry can be applied after the fact.

use anyhow::{Context, Result};
use std::path::Path;

use crate::eval::StrategyRegistry;
use crate::replay::ReplayLog;

/// Fitness of a recorded episode
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayScore {
    pub strategy: String,
    pub apples: u32,
    pub steps: usize,
    pub fitness: f64,
}

/// Load `path` and evaluate it with `strategy` from `registry`
pub fn score_replay(
    path: &Path,
    strategy: &str,
    registry: &StrategyRegistry,
) -> Result<ReplayScore> {
    let fitness_strategy = registry.get(strategy)?;
    let log = ReplayLog::load(path)
        .with_context(|| format!("Failed to load replay from {:?}", path))?;

    Ok(ReplayScore {
        strategy: strategy.to_string(),
        apples: log.last().map_or(0, |frame| frame.score),
        steps: log.len(),
        fitness: log.fitness(&fitness_strategy),
    })
}
