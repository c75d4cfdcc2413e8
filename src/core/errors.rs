use crate::protocols::qkd::bb84::{Condition, TrialFailure};
use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Invalid Dimensions: carrier gates act on a single qubit (2x2)")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone)]
pub enum MeasurementError {
    #[error("Measurement must have at least one operator")]
    Empty,

    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions: carrier measurements act on a single qubit (2x2)")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone)]
pub enum StateError {
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Dimension mismatch")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Measurement outcome {0} has zero probability")]
    ImpossibleOutcome(usize),
}

#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("Channel must have at least one Kraus operator")]
    Empty,

    #[error("Kraus operators do not sum to Identity (Trace preserving relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions: carrier channels act on a single qubit (2x2)")]
    InvalidDimensions,

    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),
}

/// Failures raised by a measurement oracle backend.
#[derive(Error, Debug, Clone)]
pub enum OracleError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle returned {got} outcomes for a batch of {expected} requests")]
    BatchMismatch { expected: usize, got: usize },

    #[error("State simulation error: {0}")]
    State(#[from] StateError),
}

/// Errors surfaced by the trial runner and the experiment aggregator.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    /// Rejected before any oracle call.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The whole trial is abandoned; no partial result is kept.
    #[error("Oracle failure: {0}")]
    OracleFailure(#[from] OracleError),

    #[error("Cancellation requested, in-flight results discarded")]
    CancellationRequested,

    /// `failures` holds every failed attempt of the run, retried or not.
    #[error(
        "Trial {trial} ({condition}) failed after all retries: {succeeded} of {requested} trials succeeded, {} failed attempts; last error: {source}",
        .failures.len()
    )]
    TrialsExhausted {
        condition: Condition,
        trial: usize,
        succeeded: usize,
        requested: usize,
        failures: Vec<TrialFailure>,
        source: Box<ProtocolError>,
    },
}
