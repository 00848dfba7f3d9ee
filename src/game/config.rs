use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// How apples are placed on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// Exactly one apple; a new one appears as soon as it is eaten
    Single,
    /// A batch of 2..=5 apples, refilled only once all are eaten
    Multi,
}

/// What happens when the head leaves the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Leaving the grid ends the episode
    Bounded,
    /// The head re-enters on the opposite edge; only self-collision ends the episode
    Wrap,
}

impl fmt::Display for SpawnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpawnMode::Single => "single",
            SpawnMode::Multi => "multi",
        })
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundaryMode::Bounded => "bounded",
            BoundaryMode::Wrap => "wrap",
        })
    }
}

/// Configuration for the grid world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Apple placement policy
    pub spawn_mode: SpawnMode,
    /// Edge policy
    pub boundary_mode: BoundaryMode,
    /// Seed for apple placement; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 30,
            initial_snake_length: 1,
            spawn_mode: SpawnMode::Single,
            boundary_mode: BoundaryMode::Bounded,
            seed: None,
        }
    }
}

impl WorldConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_spawn_mode(mut self, spawn_mode: SpawnMode) -> Self {
        self.spawn_mode = spawn_mode;
        self
    }

    pub fn with_boundary_mode(mut self, boundary_mode: BoundaryMode) -> Self {
        self.boundary_mode = boundary_mode;
        self
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.grid_width * self.grid_height
    }

    /// Validate configuration parameters
    ///
    /// The sensor normalizes by `width - 1` and `height - 1`, so both
    /// dimensions must be at least 2. The starting body is laid out to the
    /// left of the centre cell and has to fit on the grid.
    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(Error::config(format!(
                "grid must be at least 2x2, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }

        if i32::try_from(self.area()).is_err() {
            return Err(Error::config(format!(
                "grid {}x{} is too large",
                self.grid_width, self.grid_height
            )));
        }

        if self.initial_snake_length == 0 {
            return Err(Error::config("initial_snake_length must be at least 1"));
        }

        let room = self.grid_width / 2 + 1;
        if self.initial_snake_length > room {
            return Err(Error::config(format!(
                "initial_snake_length ({}) does not fit on a grid {} cells wide",
                self.initial_snake_length, self.grid_width
            )));
        }

        Ok(())
    }
}
