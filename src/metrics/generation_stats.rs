//! Per-generation fitness statistics
//!
//! Episodes are recorded as they are evaluated; closing a generation folds
//! them into a [`GenerationSummary`] and pushes it into rolling windows for
//! smoothed progress lines.

use serde::Serialize;
use std::collections::VecDeque;

/// Aggregate over one generation's episodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// 1-based generation number; a progress block when episodes are not
    /// grouped by population
    pub generation: usize,
    pub candidates: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub best_score: u32,
    pub mean_steps: f64,
}

/// Generation statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use evo_snake::metrics::GenerationStats;
///
/// let mut stats = GenerationStats::new(10);
///
/// stats.record_episode(12.5, 140, 2);
/// stats.record_episode(-3.0, 20, 0);
/// let summary = stats.end_generation();
///
/// assert_eq!(summary.generation, 1);
/// assert_eq!(summary.best_fitness, 12.5);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct GenerationStats {
    /// Fitness of each episode in the open generation
    current_fitness: Vec<f64>,
    current_steps: u64,
    current_best_score: u32,

    /// Best fitness per generation (rolling window)
    best_fitness: VecDeque<f64>,

    /// Mean fitness per generation (rolling window)
    mean_fitness: VecDeque<f64>,

    /// Best score per generation (rolling window)
    best_scores: VecDeque<u32>,

    /// Best fitness seen in any generation
    all_time_best: Option<f64>,

    total_generations: usize,
    total_episodes: usize,
    total_steps: u64,

    /// Window size for rolling averages
    window_size: usize,
}

impl GenerationStats {
    /// Create a tracker averaging over the last `window_size` generations
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            current_fitness: Vec::new(),
            current_steps: 0,
            current_best_score: 0,
            best_fitness: VecDeque::with_capacity(window_size),
            mean_fitness: VecDeque::with_capacity(window_size),
            best_scores: VecDeque::with_capacity(window_size),
            all_time_best: None,
            total_generations: 0,
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record one evaluated episode in the open generation
    pub fn record_episode(&mut self, fitness: f64, steps: u32, score: u32) {
        self.current_fitness.push(fitness);
        self.current_steps += u64::from(steps);
        self.current_best_score = self.current_best_score.max(score);
        self.total_episodes += 1;
        self.total_steps += u64::from(steps);
    }

    /// Close the open generation and return its summary
    ///
    /// A generation without episodes summarizes to zeros and leaves the
    /// rolling windows untouched.
    pub fn end_generation(&mut self) -> GenerationSummary {
        self.total_generations += 1;

        let candidates = self.current_fitness.len();
        let mut summary = GenerationSummary {
            generation: self.total_generations,
            candidates,
            best_fitness: 0.0,
            mean_fitness: 0.0,
            best_score: self.current_best_score,
            mean_steps: 0.0,
        };

        if candidates > 0 {
            let best = self
                .current_fitness
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            summary.best_fitness = best;
            summary.mean_fitness = self.current_fitness.iter().sum::<f64>() / candidates as f64;
            summary.mean_steps = self.current_steps as f64 / candidates as f64;

            Self::push_deque(&mut self.best_fitness, best, self.window_size);
            Self::push_deque(&mut self.mean_fitness, summary.mean_fitness, self.window_size);
            Self::push_deque(&mut self.best_scores, summary.best_score, self.window_size);
            self.all_time_best = Some(self.all_time_best.map_or(best, |b| b.max(best)));
        }

        self.current_fitness.clear();
        self.current_steps = 0;
        self.current_best_score = 0;

        summary
    }

    /// Mean of the per-generation best fitness over the window
    pub fn mean_best_fitness(&self) -> f64 {
        Self::mean(&self.best_fitness)
    }

    /// Mean of the per-generation mean fitness over the window
    pub fn mean_fitness(&self) -> f64 {
        Self::mean(&self.mean_fitness)
    }

    /// Mean of the per-generation best score over the window
    pub fn mean_best_score(&self) -> f64 {
        if self.best_scores.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.best_scores.iter().map(|&s| u64::from(s)).sum();
        sum as f64 / self.best_scores.len() as f64
    }

    pub fn all_time_best(&self) -> Option<f64> {
        self.all_time_best
    }

    pub fn total_generations(&self) -> usize {
        self.total_generations
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary for log output
    ///
    /// `Generations: 3 | Episodes: 60 | Best: 41.20 | Mean: 7.85 | Score: 2.33 | All-time: 55.00`
    pub fn format_summary(&self) -> String {
        let all_time = self
            .all_time_best
            .map_or_else(|| "-".to_string(), |best| format!("{best:.2}"));
        format!(
            "Generations: {} | Episodes: {} | Best: {:.2} | Mean: {:.2} | Score: {:.2} | All-time: {}",
            self.total_generations,
            self.total_episodes,
            self.mean_best_fitness(),
            self.mean_fitness(),
            self.mean_best_score(),
            all_time,
        )
    }

    fn mean(deque: &VecDeque<f64>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f64>() / deque.len() as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self::new(10)
    }
}
