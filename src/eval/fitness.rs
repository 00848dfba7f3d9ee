//! Terminal fitness strategies
//!
//! A strategy turns the outcome of one episode (apples eaten, steps
//! survived) into a scalar for the optimizer. Strategies are looked up by
//! name in a [`StrategyRegistry`], an immutable table built once at startup
//! and passed around by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Formula family of a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// `apples * a + steps * t`
    Balanced,
    /// `apples * a + sqrt(steps) * t`
    TimeDecay,
    /// `apples * a`, plus `steps * t` once at least one apple is eaten
    Threshold,
    /// `apples * a + steps * t` with apple-heavy weights
    ApplePriority,
    /// `apples * a + steps * t` with the time term disabled
    OnlyApple,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Balanced,
        StrategyKind::TimeDecay,
        StrategyKind::Threshold,
        StrategyKind::ApplePriority,
        StrategyKind::OnlyApple,
    ];

    /// Registry name
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Balanced => "balanced",
            StrategyKind::TimeDecay => "time_decay",
            StrategyKind::Threshold => "threshold",
            StrategyKind::ApplePriority => "apple_priority",
            StrategyKind::OnlyApple => "only_apple",
        }
    }

    /// Default `(apple_weight, time_weight)`
    pub fn default_weights(&self) -> (f64, f64) {
        match self {
            StrategyKind::Balanced => (100.0, 1.0),
            StrategyKind::TimeDecay => (100.0, 10.0),
            StrategyKind::Threshold => (100.0, 1.0),
            StrategyKind::ApplePriority => (200.0, 0.1),
            StrategyKind::OnlyApple => (1.0, 0.0),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pure scoring function over `(apples, steps)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStrategy {
    pub kind: StrategyKind,
    pub apple_weight: f64,
    pub time_weight: f64,
}

impl FitnessStrategy {
    /// Strategy with its default weights
    pub fn new(kind: StrategyKind) -> Self {
        let (apple_weight, time_weight) = kind.default_weights();
        Self::with_weights(kind, apple_weight, time_weight)
    }

    pub fn with_weights(kind: StrategyKind, apple_weight: f64, time_weight: f64) -> Self {
        Self {
            kind,
            apple_weight,
            time_weight,
        }
    }

    pub fn evaluate(&self, apples: u32, steps: u32) -> f64 {
        let apple_term = f64::from(apples) * self.apple_weight;
        let steps = f64::from(steps);

        let time_term = match self.kind {
            StrategyKind::TimeDecay => steps.sqrt() * self.time_weight,
            StrategyKind::Threshold if apples == 0 => 0.0,
            StrategyKind::Balanced
            | StrategyKind::Threshold
            | StrategyKind::ApplePriority
            | StrategyKind::OnlyApple => steps * self.time_weight,
        };

        apple_term + time_term
    }
}

/// Immutable name → strategy table
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, FitnessStrategy>,
}

impl StrategyRegistry {
    /// The five built-in strategies with default weights
    pub fn builtin() -> Self {
        let strategies = StrategyKind::ALL
            .iter()
            .map(|kind| (kind.name().to_string(), FitnessStrategy::new(*kind)))
            .collect();
        Self { strategies }
    }

    /// Return a registry extended with, or overriding, `name`
    pub fn register(mut self, name: impl Into<String>, strategy: FitnessStrategy) -> Self {
        self.strategies.insert(name.into(), strategy);
        self
    }

    /// Look up a strategy; unknown names are a configuration error
    pub fn get(&self, name: &str) -> Result<FitnessStrategy> {
        self.strategies
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownStrategy(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.strategies.keys().map(String::as_str)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
