pub mod cancel;
pub mod config;
mod core;
pub mod oracle;
pub mod protocols;
mod randomness;

pub use crate::cancel::CancelToken;
pub use crate::config::{ExperimentConfig, OracleKind};
pub use crate::core::{
    Basis, Bit, Gate, Measurement, MeasurementResult, QuantumChannel, QuantumState, errors, utils,
};
pub use crate::oracle::{DensityMatrixOracle, IdealOracle, MeasurementOracle, MeasurementRequest};
pub use crate::protocols::bb84::{ExperimentSummary, TrialResult, run_experiment, run_trial};
pub use crate::randomness::RandomSource;
