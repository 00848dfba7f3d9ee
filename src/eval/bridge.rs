//! The seam between the simulation core and an external optimizer
//!
//! The optimizer owns the population, selection and variation. The core
//! only sees the per-generation callback: build each candidate's policy,
//! run one training episode, write the fitness back.

use rand::{rngs::StdRng, Rng};
use tracing::{info, warn};

use super::config::RunConfig;
use super::fitness::StrategyRegistry;
use super::policy::Policy;
use super::runner::{EpisodeOutcome, EpisodeRunner};
use crate::error::{Error, Result};
use crate::game::{GridWorld, WorldConfig};
use crate::metrics::{GenerationStats, GenerationSummary};
use crate::replay::ReplayLog;

/// One member of the optimizer's population
pub trait Candidate {
    type Policy: Policy;

    /// Build an activatable policy from this candidate's genome
    fn policy(&self) -> Self::Policy;

    fn set_fitness(&mut self, fitness: f64);

    /// Fitness from the last evaluation, if any
    fn fitness(&self) -> Option<f64>;
}

/// Callback the optimizer invokes once per generation
pub type EvaluateFn<'a, C> = dyn FnMut(&mut [C]) -> Result<()> + 'a;

/// An external evolutionary optimizer
pub trait Optimizer {
    type Candidate: Candidate;

    /// Evolve for `generations`, calling `evaluate` on every generation's
    /// population, and return the best candidate found
    fn run(
        &mut self,
        evaluate: &mut EvaluateFn<'_, Self::Candidate>,
        generations: usize,
    ) -> Result<Self::Candidate>;
}

/// Evaluates whole populations on one shared world
///
/// Candidates run strictly one after another and the world is reset before
/// each of them, so no state leaks between candidates. A parallel variant
/// needs a world per worker.
pub struct PopulationEvaluator<R = StdRng> {
    world: GridWorld<R>,
    runner: EpisodeRunner,
    stats: GenerationStats,
}

impl PopulationEvaluator<StdRng> {
    pub fn new(world: WorldConfig, runner: EpisodeRunner) -> Result<Self> {
        Ok(Self::with_world(GridWorld::new(world)?, runner))
    }
}

impl<R: Rng> PopulationEvaluator<R> {
    pub fn with_world(world: GridWorld<R>, runner: EpisodeRunner) -> Self {
        Self {
            world,
            runner,
            stats: GenerationStats::default(),
        }
    }

    /// Score every candidate with one training episode
    ///
    /// All policies are arity-checked before the first episode runs, and
    /// fitness and stats are only written once every episode succeeded, so
    /// a failed generation leaves no partial results behind.
    pub fn evaluate_population<C: Candidate>(
        &mut self,
        candidates: &mut [C],
    ) -> Result<GenerationSummary> {
        if candidates.is_empty() {
            warn!("empty population");
        }

        let mut policies = candidates
            .iter()
            .map(|candidate| {
                let policy = candidate.policy();
                self.runner.check_policy(&policy).map(|()| policy)
            })
            .collect::<Result<Vec<_>>>()?;

        let outcomes = policies
            .iter_mut()
            .map(|policy| self.runner.train(&mut self.world, policy))
            .collect::<Result<Vec<_>>>()?;

        for (candidate, outcome) in candidates.iter_mut().zip(&outcomes) {
            candidate.set_fitness(outcome.fitness);
            self.stats.record_episode(outcome.fitness, outcome.steps, outcome.score);
        }

        let summary = self.stats.end_generation();
        info!(
            generation = summary.generation,
            candidates = summary.candidates,
            best_fitness = summary.best_fitness,
            mean_fitness = summary.mean_fitness,
            best_score = summary.best_score,
            "generation evaluated"
        );
        Ok(summary)
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn runner(&self) -> &EpisodeRunner {
        &self.runner
    }

    pub fn world(&self) -> &GridWorld<R> {
        &self.world
    }
}

/// Training followed by a recorded showcase episode
///
/// Training and play use separate worlds so a replay never observes the
/// state left behind by the last training episode.
pub struct Trainer<R = StdRng> {
    evaluator: PopulationEvaluator<R>,
    play_world: GridWorld<R>,
}

impl Trainer<StdRng> {
    /// Build a trainer, failing on any configuration error before
    /// simulating anything
    pub fn new(
        world: WorldConfig,
        config: &RunConfig,
        registry: &StrategyRegistry,
    ) -> Result<Self> {
        let runner = EpisodeRunner::new(&world, config, registry)?;
        let play_world = GridWorld::new(world.clone())?;
        let evaluator = PopulationEvaluator::new(world, runner)?;
        Ok(Self {
            evaluator,
            play_world,
        })
    }
}

impl<R: Rng> Trainer<R> {
    pub fn with_worlds(
        train_world: GridWorld<R>,
        play_world: GridWorld<R>,
        runner: EpisodeRunner,
    ) -> Self {
        Self {
            evaluator: PopulationEvaluator::with_world(train_world, runner),
            play_world,
        }
    }

    /// Hand the evaluation callback to `optimizer` and return its best
    /// candidate
    pub fn learn<O: Optimizer>(
        &mut self,
        optimizer: &mut O,
        generations: usize,
    ) -> Result<O::Candidate> {
        if generations == 0 {
            return Err(Error::config("generations must be at least 1"));
        }

        let evaluator = &mut self.evaluator;
        let mut evaluate = |candidates: &mut [O::Candidate]| {
            evaluator.evaluate_population(candidates).map(|_| ())
        };
        let best = optimizer.run(&mut evaluate, generations)?;

        info!(
            fitness = ?best.fitness(),
            summary = %self.evaluator.stats().format_summary(),
            "training finished"
        );
        Ok(best)
    }

    /// Run one recorded play episode with `best`
    pub fn play<C: Candidate>(&mut self, best: &C) -> Result<(EpisodeOutcome, ReplayLog)> {
        let runner = self.evaluator.runner();
        let mut log = ReplayLog::with_capacity(runner.step_cap() as usize);
        let mut policy = best.policy();
        let outcome = runner.play(&mut self.play_world, &mut policy, &mut log)?;

        info!(
            score = outcome.score,
            steps = outcome.steps,
            fitness = outcome.fitness,
            "showcase episode finished"
        );
        Ok((outcome, log))
    }

    pub fn evaluator(&self) -> &PopulationEvaluator<R> {
        &self.evaluator
    }
}
