//! Fitness evaluation configuration

use serde::{Deserialize, Serialize};

use super::sensor::Encoding;
use crate::error::{Error, Result};

/// Per-step shaping weights used in training mode
///
/// Each step contributes
/// `distance_scale * (previous_distance - current_distance)`
/// plus `apple_bonus` when the score increases, plus `step_penalty`, plus
/// `death_penalty` on the step that ends the episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardShaping {
    /// Scale of the approach bonus toward the nearest apple
    ///
    /// Default: 1.0
    pub distance_scale: f64,

    /// Bonus for each apple eaten
    ///
    /// Default: 10.0
    pub apple_bonus: f64,

    /// Added on the terminal step, whether by collision or step cap
    ///
    /// Default: -10.0
    pub death_penalty: f64,

    /// Added every step, so the total grows with elapsed steps
    ///
    /// Default: -0.01
    pub step_penalty: f64,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            distance_scale: 1.0,
            apple_bonus: 10.0,
            death_penalty: -10.0,
            step_penalty: -0.01,
        }
    }
}

/// Which signal becomes the candidate's fitness in training mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessSource {
    /// Accumulated shaped reward
    Shaped,
    /// The terminal fitness strategy alone
    Terminal,
    /// Shaped reward plus terminal fitness
    Combined,
}

/// Configuration for episode evaluation
///
/// # Example
///
/// ```rust
/// use evo_snake::eval::RunConfig;
///
/// let config = RunConfig {
///     strategy: "time_decay".to_string(),
///     step_cap: 500,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Registry name of the terminal fitness strategy
    ///
    /// Default: "balanced"
    pub strategy: String,

    /// Maximum steps per episode, independent of grid size
    ///
    /// Default: 1000
    pub step_cap: u32,

    /// Observation layout; fixed for the whole run
    ///
    /// Default: distances
    pub encoding: Encoding,

    /// Fitness signal in training mode
    ///
    /// Default: shaped
    pub fitness_source: FitnessSource,

    /// Training-mode shaping weights
    pub shaping: RewardShaping,

    /// Number of optimizer generations
    ///
    /// Default: 50
    pub generations: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strategy: "balanced".to_string(),
            step_cap: 1000,
            encoding: Encoding::Distances,
            fitness_source: FitnessSource::Shaped,
            shaping: RewardShaping::default(),
            generations: 50,
        }
    }
}

impl RunConfig {
    /// Validate configuration parameters
    ///
    /// The strategy name is checked against the registry separately, when
    /// the runner is built.
    pub fn validate(&self) -> Result<()> {
        if self.strategy.is_empty() {
            return Err(Error::config("strategy name must not be empty"));
        }

        if self.step_cap == 0 {
            return Err(Error::config("step_cap must be at least 1"));
        }

        if self.generations == 0 {
            return Err(Error::config("generations must be at least 1"));
        }

        let shaping = &self.shaping;
        let weights = [
            ("distance_scale", shaping.distance_scale),
            ("apple_bonus", shaping.apple_bonus),
            ("death_penalty", shaping.death_penalty),
            ("step_penalty", shaping.step_penalty),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::config(format!("{name} must be finite, got {value}")));
        }

        if shaping.death_penalty > 0.0 || shaping.step_penalty > 0.0 {
            return Err(Error::config(format!(
                "death_penalty and step_penalty must not be positive, got {} and {}",
                shaping.death_penalty, shaping.step_penalty
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.strategy, "balanced");
        assert_eq!(config.step_cap, 1000);
        assert_eq!(config.encoding, Encoding::Distances);
        assert_eq!(config.fitness_source, FitnessSource::Shaped);
        assert_eq!(config.generations, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_step_cap() {
        let config = RunConfig {
            step_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_generations() {
        let config = RunConfig {
            generations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_shaping_weights() {
        let mut config = RunConfig::default();
        config.shaping.distance_scale = f64::NAN;
        assert!(config.validate().is_err());

        config.shaping.distance_scale = 1.0;
        config.shaping.death_penalty = 5.0;
        assert!(config.validate().is_err());

        config.shaping.death_penalty = -5.0;
        config.shaping.step_penalty = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = RunConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"fitness_source\":\"shaped\""));
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
