//! evo_snake - Snake simulation core for neuroevolution
//!
//! This library provides:
//! - The deterministic grid world (game module)
//! - Observation encoding, action gating, fitness strategies, episode
//!   driving and the optimizer callback seam (eval module)
//! - Replay recording, persistence and paced playback (replay module)
//! - Per-generation statistics (metrics module)
//! - A terminal replay viewer and binary modes (render, modes modules)

pub mod error;
pub mod eval;
pub mod game;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod replay;

pub use error::{Error, Result};
