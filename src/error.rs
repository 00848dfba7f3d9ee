//! Error types for the simulation and evaluation core.
//!
//! Configuration errors are raised while wiring a run together, before any
//! episode is simulated. I/O errors come from the one-shot load/save paths
//! (replay documents, architecture files) and are handed back to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `evo_snake` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A fitness strategy name that is not in the registry
    #[error("unknown fitness strategy `{0}`")]
    UnknownStrategy(String),

    /// The encoder and the policy disagree on the observation length
    #[error("observation length {observation} does not match policy input size {policy}")]
    InputMismatch { observation: usize, policy: usize },

    /// The policy does not produce one score per direction
    #[error("policy produces {0} outputs, expected 4")]
    OutputMismatch(usize),

    /// Any other invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// File system errors, tagged with the offending path
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document on disk that does not parse
    #[error("malformed document {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// In-memory JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for `evo_snake` operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }

    /// True for the errors that can only come from setup, never from a
    /// running simulation.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownStrategy(_)
                | Self::InputMismatch { .. }
                | Self::OutputMismatch(_)
                | Self::Config(_)
        )
    }
}
