//! Policy evaluation: observations, action gating, fitness and episodes
//!
//! Provides:
//! - Observation encoding ([`SensorEncoder`])
//! - Output gating to a legal direction ([`select_direction`])
//! - Named terminal fitness strategies ([`StrategyRegistry`])
//! - Episode driving in training and play mode ([`EpisodeRunner`])
//! - The optimizer callback seam ([`PopulationEvaluator`], [`Trainer`])

pub mod architecture;
pub mod bridge;
pub mod config;
pub mod fitness;
pub mod gate;
pub mod policy;
pub mod runner;
pub mod sensor;

pub use architecture::ArchitectureSpec;
pub use bridge::{Candidate, EvaluateFn, Optimizer, PopulationEvaluator, Trainer};
pub use config::{FitnessSource, RewardShaping, RunConfig};
pub use fitness::{FitnessStrategy, StrategyKind, StrategyRegistry};
pub use gate::{select_direction, ACTION_COUNT};
pub use policy::{FnPolicy, GreedyPolicy, Policy};
pub use runner::{EpisodeEnd, EpisodeOutcome, EpisodeRunner};
pub use sensor::{Encoding, SensorEncoder, DISTANCE_INPUTS};
