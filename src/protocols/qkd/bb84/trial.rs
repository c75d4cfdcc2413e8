use super::Carrier;
use crate::RandomSource;
use crate::cancel::CancelToken;
use crate::core::{Basis, Bit};
use crate::errors::{OracleError, ProtocolError};
use crate::oracle::{MeasurementOracle, MeasurementRequest};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Eve's side of an intercepted trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveRecord {
    pub bases: Vec<Basis>,
    pub results: Vec<Bit>,
}

/// Everything recorded during one protocol run, before sifting.
///
/// All sequences are index-aligned: position `i` describes carrier `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrial {
    pub alice_bits: Vec<Bit>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    pub bob_results: Vec<Bit>,
    pub eve: Option<EveRecord>,
}

impl RawTrial {
    pub fn len(&self) -> usize {
        self.alice_bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice_bits.is_empty()
    }
}

/// Runs `n` carriers through one BB84 exchange.
///
/// Alice's bits and bases, Bob's bases and (with `eve_present`) Eve's bases are
/// drawn from `rng` in that order. The oracle then sees one batch per hop: Eve's
/// readings of Alice's carriers first, then Bob's readings of whatever reached
/// him.
///
/// # Errors
///
/// - `InvalidConfiguration` if `n` is 0, before anything is drawn.
/// - `OracleFailure` if the oracle fails or answers a batch with the wrong
///   number of outcomes. Nothing of the trial is kept.
/// - `CancellationRequested` if `cancel` fires before or during the trial.
#[instrument(level = "debug", skip(rng, oracle, cancel), fields(oracle = oracle.name()))]
pub fn run_trial<O>(
    n: usize,
    eve_present: bool,
    rng: &mut RandomSource,
    oracle: &mut O,
    cancel: &CancelToken,
) -> Result<RawTrial, ProtocolError>
where
    O: MeasurementOracle + ?Sized,
{
    if n == 0 {
        return Err(ProtocolError::InvalidConfiguration(
            "a trial needs at least one carrier".to_string(),
        ));
    }
    cancel.check()?;

    let alice_bits = rng.next_bits(n);
    let alice_bases = rng.next_bases(n);
    let bob_bases = rng.next_bases(n);
    let eve_bases = eve_present.then(|| rng.next_bases(n));

    let carriers: Vec<Carrier> = (0..n)
        .map(|i| {
            Carrier::new(
                alice_bits[i],
                alice_bases[i],
                bob_bases[i],
                eve_bases.as_ref().map(|bases| bases[i]),
            )
        })
        .collect();

    let eve_results = if eve_present {
        let requests: Vec<_> = carriers.iter().filter_map(Carrier::eve_request).collect();
        Some(submit(oracle, &requests, cancel)?)
    } else {
        None
    };

    let bob_requests: Vec<_> = carriers
        .iter()
        .enumerate()
        .map(|(i, carrier)| carrier.bob_request(eve_results.as_ref().map(|bits| bits[i])))
        .collect();
    let bob_results = submit(oracle, &bob_requests, cancel)?;

    trace!(?alice_bits, ?bob_results, "raw trial");

    let eve = match (eve_bases, eve_results) {
        (Some(bases), Some(results)) => Some(EveRecord { bases, results }),
        _ => None,
    };

    Ok(RawTrial {
        alice_bits,
        alice_bases,
        bob_bases,
        bob_results,
        eve,
    })
}

/// Sends one batch, discarding the answer if the trial was cancelled meanwhile.
fn submit<O>(
    oracle: &mut O,
    requests: &[MeasurementRequest],
    cancel: &CancelToken,
) -> Result<Vec<Bit>, ProtocolError>
where
    O: MeasurementOracle + ?Sized,
{
    cancel.check()?;

    let outcomes = oracle.measure_batch(requests)?;
    if outcomes.len() != requests.len() {
        return Err(OracleError::BatchMismatch {
            expected: requests.len(),
            got: outcomes.len(),
        }
        .into());
    }

    cancel.check()?;
    Ok(outcomes)
}
