use super::{TrialResult, run_trial};
use crate::RandomSource;
use crate::cancel::CancelToken;
use crate::config::ExperimentConfig;
use crate::errors::ProtocolError;
use crate::oracle::MeasurementOracle;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Whether Eve sits on the channel during a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    NoEavesdropper,
    Eavesdropper,
}

impl Condition {
    pub fn eve_present(self) -> bool {
        matches!(self, Condition::Eavesdropper)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::NoEavesdropper => write!(f, "without eavesdropper"),
            Condition::Eavesdropper => write!(f, "with eavesdropper"),
        }
    }
}

/// Per-trial series for one condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    /// QBER of each trial, in trial order.
    pub qber: Vec<f64>,
    /// Sifted key length of each trial; 0 marks a trial with no data.
    pub sifted_lengths: Vec<usize>,
    /// Arithmetic mean of `qber`.
    pub mean_qber: f64,
}

impl ConditionSummary {
    fn record(&mut self, result: &TrialResult) {
        self.qber.push(result.qber);
        self.sifted_lengths.push(result.sifted.len());
        self.mean_qber = mean(&self.qber);
    }

    /// Total sifted bits across all trials.
    pub fn sifted_bits(&self) -> usize {
        self.sifted_lengths.iter().sum()
    }
}

/// A trial attempt that failed and was either retried or ended the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialFailure {
    pub condition: Condition,
    pub trial: usize,
    /// 0 for the first attempt.
    pub attempt: usize,
    pub reason: String,
}

/// Result of an experiment, consumed by reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub n_bit: usize,
    pub trials: usize,
    pub without_eve: ConditionSummary,
    pub with_eve: ConditionSummary,
    /// Failed attempts that were retried successfully.
    pub failures: Vec<TrialFailure>,
}

impl ExperimentSummary {
    pub fn condition(&self, condition: Condition) -> &ConditionSummary {
        match condition {
            Condition::NoEavesdropper => &self.without_eve,
            Condition::Eavesdropper => &self.with_eve,
        }
    }

    fn condition_mut(&mut self, condition: Condition) -> &mut ConditionSummary {
        match condition {
            Condition::NoEavesdropper => &mut self.without_eve,
            Condition::Eavesdropper => &mut self.with_eve,
        }
    }

    /// Mean QBER increase caused by the eavesdropper.
    pub fn qber_gap(&self) -> f64 {
        self.with_eve.mean_qber - self.without_eve.mean_qber
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Runs `config.trials` trials for each condition and averages their QBER.
///
/// Trial `i` runs without Eve, then with Eve, before trial `i + 1` starts. A
/// trial whose oracle fails is rerun up to `config.max_retries` times, each
/// failure being kept in the summary.
///
/// # Errors
///
/// - `InvalidConfiguration` if `n_bit` or `trials` is 0, before any oracle call.
/// - `TrialsExhausted` when a trial still fails after its retries, with the
///   number of trials that succeeded up to then, every failed attempt so far
///   and the last error.
/// - `CancellationRequested` as soon as `cancel` is observed.
#[instrument(
    skip_all,
    fields(n_bit = config.n_bit, trials = config.trials, oracle = oracle.name())
)]
pub fn run_experiment<O>(
    config: &ExperimentConfig,
    rng: &mut RandomSource,
    oracle: &mut O,
    cancel: &CancelToken,
) -> Result<ExperimentSummary, ProtocolError>
where
    O: MeasurementOracle + ?Sized,
{
    config.validate()?;
    info!("starting BB84 experiment");

    let requested = 2 * config.trials;
    let mut succeeded = 0;
    let mut summary = ExperimentSummary {
        n_bit: config.n_bit,
        trials: config.trials,
        without_eve: ConditionSummary::default(),
        with_eve: ConditionSummary::default(),
        failures: Vec::new(),
    };

    for trial in 0..config.trials {
        for condition in [Condition::NoEavesdropper, Condition::Eavesdropper] {
            let attempt = run_with_retries(
                config,
                condition,
                trial,
                rng,
                oracle,
                cancel,
                &mut summary.failures,
            );
            let result = attempt.map_err(|source| match source {
                ProtocolError::OracleFailure(_) => ProtocolError::TrialsExhausted {
                    condition,
                    trial,
                    succeeded,
                    requested,
                    failures: std::mem::take(&mut summary.failures),
                    source: Box::new(source),
                },
                other => other,
            })?;

            debug!(
                trial,
                %condition,
                sifted = result.sifted.len(),
                errors = result.sifted.error_count(),
                qber = result.qber,
                "trial complete"
            );
            summary.condition_mut(condition).record(&result);
            succeeded += 1;
        }
    }

    info!(
        mean_qber_without_eve = summary.without_eve.mean_qber,
        mean_qber_with_eve = summary.with_eve.mean_qber,
        retried = summary.failures.len(),
        "experiment complete"
    );
    Ok(summary)
}

fn run_with_retries<O>(
    config: &ExperimentConfig,
    condition: Condition,
    trial: usize,
    rng: &mut RandomSource,
    oracle: &mut O,
    cancel: &CancelToken,
    failures: &mut Vec<TrialFailure>,
) -> Result<TrialResult, ProtocolError>
where
    O: MeasurementOracle + ?Sized,
{
    let mut attempt = 0;
    loop {
        match run_trial(config.n_bit, condition.eve_present(), rng, oracle, cancel) {
            Ok(raw) => return Ok(TrialResult::from(raw)),
            Err(err @ ProtocolError::OracleFailure(_)) => {
                failures.push(TrialFailure {
                    condition,
                    trial,
                    attempt,
                    reason: err.to_string(),
                });
                if attempt >= config.max_retries {
                    return Err(err);
                }
                warn!(trial, %condition, attempt, error = %err, "trial failed, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
