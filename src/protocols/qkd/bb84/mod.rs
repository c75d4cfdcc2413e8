//! BB84 Quantum Key Distribution Protocol.
//!
//! Alice encodes random bits in random bases, Bob reads each carrier in a random
//! basis of his own, and both keep only the positions where the bases agreed
//! (sifting). An eavesdropper running a measure-and-resend attack picks the
//! wrong basis half of the time and forwards a carrier that Bob then reads
//! wrongly half of the time, so the sifted key shows a quantum bit error rate
//! (QBER) of about 25% instead of 0.
//!
//! The pipeline, leaves first:
//!
//! ```text
//!   RandomSource ─→ Carrier ─→ run_trial ─→ TrialResult (sift + qber) ─→ run_experiment
//!                     │            │
//!                     └─ MeasurementOracle (one batch per hop)
//! ```

mod carrier;
mod experiment;
mod sifting;
mod trial;

pub use carrier::{Carrier, CarrierOutcome};
pub use experiment::{
    Condition, ConditionSummary, ExperimentSummary, TrialFailure, mean, run_experiment,
};
pub use sifting::{SiftedKeyPair, TrialResult, qber, sift};
pub use trial::{EveRecord, RawTrial, run_trial};
