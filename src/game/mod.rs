//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The same world serves headless fitness evaluation and recorded play.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{BoundaryMode, SpawnMode, WorldConfig};
pub use engine::{GridWorld, StepInfo};
pub use state::{Cell, CollisionType, Snake};
