use super::{EveRecord, RawTrial};
use crate::core::{Basis, Bit};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Alice's and Bob's keys after discarding mismatched-basis positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftedKeyPair {
    pub alice: Vec<Bit>,
    pub bob: Vec<Bit>,
}

impl SiftedKeyPair {
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    /// Positions where the two keys disagree.
    pub fn error_count(&self) -> usize {
        self.alice
            .iter()
            .zip(&self.bob)
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Keeps position `i` iff `alice_bases[i] == bob_bases[i]`, in carrier order.
///
/// Inputs are index-aligned; should their lengths differ, only the common
/// prefix is considered.
pub fn sift(
    alice_bases: &[Basis],
    bob_bases: &[Basis],
    alice_bits: &[Bit],
    bob_bits: &[Bit],
) -> SiftedKeyPair {
    let mut sifted = SiftedKeyPair::default();

    for (((a_basis, b_basis), &a_bit), &b_bit) in alice_bases
        .iter()
        .zip(bob_bases)
        .zip(alice_bits)
        .zip(bob_bits)
    {
        if a_basis == b_basis {
            sifted.alice.push(a_bit);
            sifted.bob.push(b_bit);
        }
    }

    sifted
}

/// Fraction of sifted positions in error; 0 for an empty sifted key.
pub fn qber(sifted: &SiftedKeyPair) -> f64 {
    if sifted.is_empty() {
        return 0.0;
    }
    sifted.error_count() as f64 / sifted.len() as f64
}

/// A completed protocol run with its sifted key and error rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub alice_bits: Vec<Bit>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    pub bob_results: Vec<Bit>,
    pub eve: Option<EveRecord>,
    pub sifted: SiftedKeyPair,
    pub qber: f64,
}

impl From<RawTrial> for TrialResult {
    fn from(raw: RawTrial) -> Self {
        let sifted = sift(
            &raw.alice_bases,
            &raw.bob_bases,
            &raw.alice_bits,
            &raw.bob_results,
        );
        let error_rate = qber(&sifted);

        trace!(
            sifted_alice = ?sifted.alice,
            sifted_bob = ?sifted.bob,
            errors = sifted.error_count(),
            sifted_len = sifted.len(),
            "sifted trial"
        );

        Self {
            alice_bits: raw.alice_bits,
            alice_bases: raw.alice_bases,
            bob_bases: raw.bob_bases,
            bob_results: raw.bob_results,
            eve: raw.eve,
            sifted,
            qber: error_rate,
        }
    }
}

impl TrialResult {
    pub fn eve_present(&self) -> bool {
        self.eve.is_some()
    }
}
