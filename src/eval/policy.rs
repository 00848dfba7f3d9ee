//! The policy activation interface
//!
//! Policies are external: an evolved network, a scripted controller, a test
//! stub. The core only needs their declared arity and `activate`.

use super::gate::ACTION_COUNT;
use super::sensor::DISTANCE_INPUTS;

/// A control policy mapping observations to one score per direction
pub trait Policy {
    /// Observation length this policy was built for
    fn input_size(&self) -> usize;

    /// Number of scores produced by [`Policy::activate`]
    fn output_size(&self) -> usize {
        ACTION_COUNT
    }

    /// Score each direction in canonical order (Up, Down, Left, Right)
    fn activate(&mut self, observation: &[f64]) -> Vec<f64>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn input_size(&self) -> usize {
        (**self).input_size()
    }

    fn output_size(&self) -> usize {
        (**self).output_size()
    }

    fn activate(&mut self, observation: &[f64]) -> Vec<f64> {
        (**self).activate(observation)
    }
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn input_size(&self) -> usize {
        (**self).input_size()
    }

    fn output_size(&self) -> usize {
        (**self).output_size()
    }

    fn activate(&mut self, observation: &[f64]) -> Vec<f64> {
        (**self).activate(observation)
    }
}

/// Adapts a closure into a [`Policy`]
pub struct FnPolicy<F> {
    input_size: usize,
    f: F,
}

impl<F> FnPolicy<F>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    pub fn new(input_size: usize, f: F) -> Self {
        Self { input_size, f }
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn activate(&mut self, observation: &[f64]) -> Vec<f64> {
        (self.f)(observation)
    }
}

/// Baseline controller over the distance encoding
///
/// Heads toward the nearest apple along the larger offset and refuses moves
/// that would step into a wall. It ignores its own body, so it is a yardstick
/// for evolved policies rather than a strong player.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    const WALL: f64 = -1.0e6;
}

impl Policy for GreedyPolicy {
    fn input_size(&self) -> usize {
        DISTANCE_INPUTS
    }

    fn activate(&mut self, observation: &[f64]) -> Vec<f64> {
        let (left, right, up, down) = (observation[0], observation[1], observation[2], observation[3]);
        let (dx, dy) = (observation[4], observation[5]);

        let mut scores = vec![-dy, dy, -dx, dx];
        for (score, room) in scores.iter_mut().zip([up, down, left, right]) {
            if room <= 0.0 {
                *score = Self::WALL;
            }
        }
        scores
    }
}
