//! Baseline demo runs
//!
//! Plays a number of recorded episodes with the built-in greedy baseline,
//! keeps the best one and saves it as a replay with metadata. The saved
//! replay is what the replay viewer and the score mode consume.
//!
//! # Example
//!
//! ```rust,ignore
//! use evo_snake::modes::{DemoConfig, DemoMode};
//! use std::path::PathBuf;
//!
//! let config = DemoConfig::new(20, PathBuf::from("runs/game_states.json"));
//! let mut demo_mode = DemoMode::new(config)?;
//! let report = demo_mode.run()?;
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::eval::{EpisodeOutcome, EpisodeRunner, GreedyPolicy, RunConfig, StrategyRegistry};
use crate::game::{GridWorld, WorldConfig};
use crate::metrics::GenerationStats;
use crate::replay::{save_replay, ReplayLog, ReplayMetadata};

/// Configuration for demo mode
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Number of episodes to play
    pub episodes: usize,

    /// Where the best episode's replay is written
    pub save_path: PathBuf,

    /// Log progress every N episodes
    ///
    /// There is no population here, so each block of N episodes is closed
    /// as one stats generation and its summary describes that block.
    pub log_frequency: usize,

    /// Grid size, modes and seed
    pub world: WorldConfig,

    /// Strategy, step cap and encoding
    pub run: RunConfig,
}

impl DemoConfig {
    /// Create a demo configuration with defaults
    ///
    /// ```rust
    /// use evo_snake::modes::DemoConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = DemoConfig::new(20, PathBuf::from("runs/game_states.json"));
    /// assert_eq!(config.log_frequency, 10);
    /// ```
    pub fn new(episodes: usize, save_path: PathBuf) -> Self {
        Self {
            episodes,
            save_path,
            log_frequency: 10,
            world: WorldConfig::default(),
            run: RunConfig::default(),
        }
    }
}

/// What a demo run produced
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub best: EpisodeOutcome,
    /// 0-based index of the best episode
    pub best_episode: usize,
    pub episodes: usize,
}

/// Demo mode driving the greedy baseline
pub struct DemoMode {
    world: GridWorld,
    runner: EpisodeRunner,
    stats: GenerationStats,
    config: DemoConfig,
}

impl DemoMode {
    /// Create a demo mode; fails on invalid world or run configuration
    pub fn new(config: DemoConfig) -> Result<Self> {
        let registry = StrategyRegistry::builtin();
        let runner = EpisodeRunner::new(&config.world, &config.run, &registry)
            .context("Invalid run configuration")?;
        runner
            .check_policy(&GreedyPolicy)
            .context("The greedy baseline needs the distances encoding")?;
        let world = GridWorld::new(config.world.clone()).context("Invalid world configuration")?;

        Ok(Self {
            world,
            runner,
            stats: GenerationStats::new(config.log_frequency.max(1)),
            config,
        })
    }

    /// Episode statistics, grouped in blocks of `log_frequency`
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Play every episode, then save the best one
    pub fn run(&mut self) -> Result<DemoReport> {
        anyhow::ensure!(self.config.episodes > 0, "episodes must be at least 1");

        info!(
            episodes = self.config.episodes,
            grid_width = self.config.world.grid_width,
            grid_height = self.config.world.grid_height,
            spawn_mode = %self.config.world.spawn_mode,
            boundary_mode = %self.config.world.boundary_mode,
            strategy = %self.config.run.strategy,
            step_cap = self.config.run.step_cap,
            "starting demo"
        );

        let mut best: Option<(usize, EpisodeOutcome, ReplayLog)> = None;

        for episode in 0..self.config.episodes {
            let mut log = ReplayLog::new();
            let outcome = self
                .runner
                .play(&mut self.world, &mut GreedyPolicy, &mut log)
                .with_context(|| format!("Episode {} failed", episode + 1))?;

            self.stats.record_episode(outcome.fitness, outcome.steps, outcome.score);

            if best.as_ref().map_or(true, |(_, top, _)| outcome.fitness > top.fitness) {
                best = Some((episode, outcome, log));
            }

            if (episode + 1) % self.config.log_frequency.max(1) == 0 {
                let summary = self.stats.end_generation();
                info!(
                    episode = episode + 1,
                    block = summary.generation,
                    block_best_fitness = summary.best_fitness,
                    block_mean_fitness = summary.mean_fitness,
                    block_best_score = summary.best_score,
                    rolling_mean_fitness = self.stats.mean_fitness(),
                    "progress"
                );
            }
        }

        let (best_episode, outcome, log) = best.context("no episode was played")?;

        let metadata = ReplayMetadata::new(&self.config.world, *self.runner.strategy(), &outcome);
        save_replay(&log, &metadata, &self.config.save_path)
            .with_context(|| format!("Failed to save replay to {:?}", self.config.save_path))?;

        info!(
            best_episode = best_episode + 1,
            score = outcome.score,
            steps = outcome.steps,
            fitness = outcome.fitness,
            end = ?outcome.end,
            "demo finished"
        );

        Ok(DemoReport {
            best: outcome,
            best_episode,
            episodes: self.config.episodes,
        })
    }
}
