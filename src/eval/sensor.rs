//! Observation encoding for policies
//!
//! Two layouts are available and one is fixed for a whole run, because the
//! optimizer binds the network input arity when it builds its population.
//!
//! - [`Encoding::Distances`]: six values `[left, right, up, down, dx, dy]`.
//!   The first four are the head's distances to each wall, normalized to
//!   `[0, 1]` by `width - 1` / `height - 1`; `dx`, `dy` is the offset to the
//!   nearest apple under the same normalization (`0, 0` when none exists),
//!   taken the short way across the edges in wrap mode.
//! - [`Encoding::Occupancy`]: one value per cell in row-major order, `-1.0`
//!   for snake, `1.0` for an apple and `0.0` for empty.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{GridWorld, WorldConfig};

/// Length of the [`Encoding::Distances`] observation
pub const DISTANCE_INPUTS: usize = 6;

const SNAKE_CELL: f64 = -1.0;
const APPLE_CELL: f64 = 1.0;

/// Observation layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Distances,
    Occupancy,
}

/// Derives fixed-length observations from a world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorEncoder {
    encoding: Encoding,
    width: usize,
    height: usize,
}

impl SensorEncoder {
    pub fn new(encoding: Encoding, width: usize, height: usize) -> Self {
        Self {
            encoding,
            width,
            height,
        }
    }

    pub fn for_world(encoding: Encoding, config: &WorldConfig) -> Self {
        Self::new(encoding, config.grid_width, config.grid_height)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Grid size this encoder was built for, `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Declared observation length
    pub fn observation_len(&self) -> usize {
        match self.encoding {
            Encoding::Distances => DISTANCE_INPUTS,
            Encoding::Occupancy => self.width * self.height,
        }
    }

    /// Encode the current world state
    pub fn encode<R: Rng>(&self, world: &GridWorld<R>) -> Vec<f64> {
        let mut observation = Vec::with_capacity(self.observation_len());
        self.encode_into(world, &mut observation);
        observation
    }

    /// Encode into a reused buffer, replacing its contents
    pub fn encode_into<R: Rng>(&self, world: &GridWorld<R>, observation: &mut Vec<f64>) {
        debug_assert_eq!((world.width(), world.height()), (self.width, self.height));
        observation.clear();
        match self.encoding {
            Encoding::Distances => self.encode_distances(world, observation),
            Encoding::Occupancy => self.encode_occupancy(world, observation),
        }
    }

    fn encode_distances<R: Rng>(&self, world: &GridWorld<R>, observation: &mut Vec<f64>) {
        let head = world.snake().head();
        let w = (self.width - 1) as f64;
        let h = (self.height - 1) as f64;
        let (x, y) = (f64::from(head.x), f64::from(head.y));

        let (dx, dy) = match world.nearest_apple() {
            Some(apple) => {
                let (dx, dy) = world.offset(head, apple);
                (f64::from(dx) / w, f64::from(dy) / h)
            }
            None => (0.0, 0.0),
        };

        observation.extend_from_slice(&[x / w, (w - x) / w, y / h, (h - y) / h, dx, dy]);
    }

    fn encode_occupancy<R: Rng>(&self, world: &GridWorld<R>, observation: &mut Vec<f64>) {
        observation.resize(self.width * self.height, 0.0);

        for &apple in world.apples() {
            observation[self.cell_index(apple.x, apple.y)] = APPLE_CELL;
        }
        for &segment in world.snake().cells() {
            if world.is_in_bounds(segment) {
                observation[self.cell_index(segment.x, segment.y)] = SNAKE_CELL;
            }
        }
    }

    fn cell_index(&self, x: i32, y: i32) -> usize {
        (y as usize) * self.width + (x as usize)
    }
}
