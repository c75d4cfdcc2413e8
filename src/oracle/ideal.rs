use crate::RandomSource;
use crate::core::{Basis, Bit};
use crate::errors::OracleError;
use crate::oracle::MeasurementOracle;

/// Closed-form, noiseless BB84 statistics.
///
/// Matching bases reproduce the prepared bit; conjugate bases yield a fair coin
/// drawn from the oracle's own random stream.
#[derive(Debug, Clone)]
pub struct IdealOracle {
    rng: RandomSource,
}

impl IdealOracle {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(RandomSource::from_seed(seed))
    }
}

impl MeasurementOracle for IdealOracle {
    fn name(&self) -> &str {
        "ideal"
    }

    fn measure(
        &mut self,
        prepared_bit: Bit,
        prepared_basis: Basis,
        measurement_basis: Basis,
    ) -> Result<Bit, OracleError> {
        if prepared_basis == measurement_basis {
            Ok(prepared_bit)
        } else {
            Ok(self.rng.next_bit())
        }
    }
}
