//! Episode recording and replay
//!
//! Provides:
//! - Per-step frame snapshots and the replay document ([`ReplayLog`])
//! - Metadata sidecars for saved replays
//! - Paced playback for an external renderer ([`play`])

pub mod log;
pub mod persistence;
pub mod player;

pub use log::{Frame, ReplayLog};
pub use persistence::{load_replay, metadata_path, save_replay, ReplayMetadata};
pub use player::{play, Playback};
