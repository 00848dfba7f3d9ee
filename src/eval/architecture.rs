//! Initial network architecture document
//!
//! The optimizer binds its genome topology from this document before
//! training starts. The core reads it only to check that the declared arity
//! matches the sensor encoding and the action set.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::gate::ACTION_COUNT;
use super::sensor::SensorEncoder;
use crate::error::{Error, Result};

/// `{input_size, output_size, hidden_layers}` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureSpec {
    pub input_size: usize,
    pub output_size: usize,
    #[serde(default)]
    pub hidden_layers: Vec<usize>,
}

impl ArchitectureSpec {
    pub fn new(input_size: usize, output_size: usize, hidden_layers: Vec<usize>) -> Self {
        Self {
            input_size,
            output_size,
            hidden_layers,
        }
    }

    /// Architecture matching an encoder, with no hidden layers
    pub fn for_encoder(encoder: &SensorEncoder) -> Self {
        Self::new(encoder.observation_len(), ACTION_COUNT, Vec::new())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the document from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&json).map_err(|e| Error::document(path, e))
    }

    /// Total hidden neurons across all layers
    pub fn hidden_count(&self) -> usize {
        self.hidden_layers.iter().sum()
    }

    /// Check the declared arity against the encoder and the action set
    pub fn validate(&self, encoder: &SensorEncoder) -> Result<()> {
        if self.input_size != encoder.observation_len() {
            return Err(Error::InputMismatch {
                observation: encoder.observation_len(),
                policy: self.input_size,
            });
        }
        if self.output_size != ACTION_COUNT {
            return Err(Error::OutputMismatch(self.output_size));
        }
        if self.hidden_layers.contains(&0) {
            return Err(Error::config("hidden layers must not be empty"));
        }
        Ok(())
    }
}
