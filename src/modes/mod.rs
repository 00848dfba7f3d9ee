pub mod demo;
pub mod replay;
pub mod score;

pub use demo::{DemoConfig, DemoMode, DemoReport};
pub use replay::ReplayMode;
pub use score::{score_replay, ReplayScore};
