//! Driving one episode to completion under a policy
//!
//! Every step runs the same pipeline: encode the world, activate the
//! policy, gate the outputs to a legal direction, step the world. Training
//! mode accumulates a shaped reward on top; play mode records a frame per
//! step instead. Both stop at the first collision or at the step cap.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{FitnessSource, RewardShaping, RunConfig};
use super::fitness::{FitnessStrategy, StrategyRegistry};
use super::gate::{select_direction, ACTION_COUNT};
use super::policy::Policy;
use super::sensor::SensorEncoder;
use crate::error::{Error, Result};
use crate::game::{CollisionType, GridWorld, WorldConfig};
use crate::replay::{Frame, ReplayLog};

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    Collision(CollisionType),
    /// The step cap was reached with the snake still alive
    StepCap,
}

/// Result of one episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Apples eaten
    pub score: u32,
    /// Steps simulated
    pub steps: u32,
    /// Value handed back to the optimizer
    pub fitness: f64,
    /// Accumulated shaped reward; always zero in play mode
    pub shaped_reward: f64,
    pub end: EpisodeEnd,
}

enum Mode<'a> {
    Train,
    Play(&'a mut ReplayLog),
}

/// Runs episodes with a fixed encoder, strategy and step cap
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    encoder: SensorEncoder,
    strategy: FitnessStrategy,
    shaping: RewardShaping,
    source: FitnessSource,
    step_cap: u32,
}

impl EpisodeRunner {
    /// Build a runner for worlds shaped like `world`
    ///
    /// Fails on an invalid run config or a strategy name missing from
    /// `registry`; nothing is simulated before both checks pass.
    pub fn new(
        world: &WorldConfig,
        config: &RunConfig,
        registry: &StrategyRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let strategy = registry.get(&config.strategy)?;

        Ok(Self {
            encoder: SensorEncoder::for_world(config.encoding, world),
            strategy,
            shaping: config.shaping,
            source: config.fitness_source,
            step_cap: config.step_cap,
        })
    }

    pub fn encoder(&self) -> &SensorEncoder {
        &self.encoder
    }

    pub fn strategy(&self) -> &FitnessStrategy {
        &self.strategy
    }

    pub fn step_cap(&self) -> u32 {
        self.step_cap
    }

    /// Check the policy's declared arity against the encoder and the gate
    pub fn check_policy<P: Policy + ?Sized>(&self, policy: &P) -> Result<()> {
        let observation = self.encoder.observation_len();
        if policy.input_size() != observation {
            return Err(Error::InputMismatch {
                observation,
                policy: policy.input_size(),
            });
        }
        if policy.output_size() != ACTION_COUNT {
            return Err(Error::OutputMismatch(policy.output_size()));
        }
        Ok(())
    }

    /// Run a training episode and score it per the configured fitness source
    pub fn train<R, P>(&self, world: &mut GridWorld<R>, policy: &mut P) -> Result<EpisodeOutcome>
    where
        R: Rng,
        P: Policy + ?Sized,
    {
        self.run(world, policy, Mode::Train)
    }

    /// Run an unshaped episode, appending one frame per step to `log`
    ///
    /// The fitness is the terminal strategy over the final score and the
    /// number of steps taken.
    pub fn play<R, P>(
        &self,
        world: &mut GridWorld<R>,
        policy: &mut P,
        log: &mut ReplayLog,
    ) -> Result<EpisodeOutcome>
    where
        R: Rng,
        P: Policy + ?Sized,
    {
        self.run(world, policy, Mode::Play(log))
    }

    fn run<R, P>(
        &self,
        world: &mut GridWorld<R>,
        policy: &mut P,
        mut mode: Mode<'_>,
    ) -> Result<EpisodeOutcome>
    where
        R: Rng,
        P: Policy + ?Sized,
    {
        self.check_policy(policy)?;
        if self.encoder.dimensions() != (world.width(), world.height()) {
            return Err(Error::config(format!(
                "world is {}x{} but the encoder was built for {:?}",
                world.width(),
                world.height(),
                self.encoder.dimensions()
            )));
        }

        world.reset();

        let mut observation = Vec::with_capacity(self.encoder.observation_len());
        let mut shaped_reward = 0.0;
        let mut collision = None;

        while !world.is_done() && world.steps() < self.step_cap {
            self.encoder.encode_into(world, &mut observation);
            let outputs = policy.activate(&observation);
            let direction = select_direction(&outputs, world.snake().direction)?;

            let before = world.nearest_apple_distance();
            let info = world.step(direction);
            collision = info.collision;

            match &mut mode {
                Mode::Train => {
                    let mut reward = self.shaping.step_penalty;
                    if info.ate_apple {
                        reward += self.shaping.apple_bonus;
                    } else if let (Some(before), Some(after)) = (before, world.nearest_apple_distance()) {
                        reward += self.shaping.distance_scale * (before - after);
                    }
                    if world.is_done() || world.steps() >= self.step_cap {
                        reward += self.shaping.death_penalty;
                    }
                    shaped_reward += reward;
                }
                Mode::Play(log) => log.record(Frame::capture(world)),
            }
        }

        let score = world.score();
        let steps = world.steps();
        let terminal = self.strategy.evaluate(score, steps);
        let fitness = match mode {
            Mode::Play(_) => terminal,
            Mode::Train => match self.source {
                FitnessSource::Shaped => shaped_reward,
                FitnessSource::Terminal => terminal,
                FitnessSource::Combined => shaped_reward + terminal,
            },
        };
        let end = match collision {
            Some(kind) => EpisodeEnd::Collision(kind),
            None => EpisodeEnd::StepCap,
        };

        debug!(score, steps, fitness, ?end, "episode finished");

        Ok(EpisodeOutcome {
            score,
            steps,
            fitness,
            shaped_reward,
            end,
        })
    }
}
