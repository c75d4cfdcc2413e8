//! Experiment configuration.
//!
//! A configuration can be built in code, or loaded from a JSON file where every
//! field is optional:
//!
//! ```json
//! { "n_bit": 1000, "trials": 50, "max_retries": 2, "seed": 7,
//!   "oracle": "density-matrix", "noise": 0.05 }
//! ```

use crate::errors::ProtocolError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which measurement oracle backs an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OracleKind {
    /// Closed-form BB84 statistics.
    #[default]
    Ideal,
    /// Density-matrix simulation, optionally with depolarizing noise.
    DensityMatrix,
}

/// Parameters of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Carriers sent per trial
    #[serde(default = "default_n_bit")]
    pub n_bit: usize,

    /// Trials per condition (Eve absent / present)
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Extra attempts allowed for a trial whose oracle failed
    #[serde(default)]
    pub max_retries: usize,

    /// Master seed; `None` seeds from the operating system
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub oracle: OracleKind,

    /// Depolarizing probability per transmission (density-matrix oracle only)
    #[serde(default)]
    pub noise: Option<f64>,
}

fn default_n_bit() -> usize {
    20
}

fn default_trials() -> usize {
    5
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_bit: default_n_bit(),
            trials: default_trials(),
            max_retries: 0,
            seed: None,
            oracle: OracleKind::default(),
            noise: None,
        }
    }
}

impl ExperimentConfig {
    pub fn new(n_bit: usize, trials: usize) -> Self {
        Self {
            n_bit,
            trials,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_oracle(mut self, oracle: OracleKind) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_noise(mut self, p: f64) -> Self {
        self.noise = Some(p);
        self
    }

    /// Parses a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json)
            .map_err(|e| ProtocolError::InvalidConfiguration(format!("malformed config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProtocolError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Checks the configuration before any oracle is touched.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.n_bit == 0 {
            return Err(ProtocolError::InvalidConfiguration(
                "n_bit must be positive".to_string(),
            ));
        }
        if self.trials == 0 {
            return Err(ProtocolError::InvalidConfiguration(
                "trials must be positive".to_string(),
            ));
        }
        if let Some(p) = self.noise {
            if !(0.0..=1.0).contains(&p) {
                return Err(ProtocolError::InvalidConfiguration(format!(
                    "noise must be between 0.0 and 1.0, got {p}"
                )));
            }
        }
        Ok(())
    }
}
