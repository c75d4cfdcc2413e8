use crate::RandomSource;
use crate::core::{Basis, Bit, QuantumChannel, QuantumState};
use crate::errors::OracleError;
use crate::oracle::MeasurementOracle;

/// A statistical simulator for reading carriers.
///
/// Each reading prepares the carrier as a density matrix, optionally passes it
/// through a quantum channel (the transmission noise), and samples a projective
/// measurement in the requested basis from its Born probabilities.
#[derive(Debug, Clone)]
pub struct DensityMatrixOracle {
    /// Optional quantum channel applied to every carrier before it is read.
    pub channel: Option<QuantumChannel>,
    rng: RandomSource,
}

impl DensityMatrixOracle {
    /// Creates a new noise-free `DensityMatrixOracle`.
    pub fn new(rng: RandomSource) -> Self {
        Self { channel: None, rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(RandomSource::from_seed(seed))
    }

    /// Sets the quantum channel every carrier crosses.
    ///
    /// # Arguments
    ///
    /// * `channel` - The `QuantumChannel` to apply.
    pub fn with_channel(mut self, channel: QuantumChannel) -> Self {
        self.channel = Some(channel);
        self
    }
}

impl MeasurementOracle for DensityMatrixOracle {
    fn name(&self) -> &str {
        "density-matrix"
    }

    fn measure(
        &mut self,
        prepared_bit: Bit,
        prepared_basis: Basis,
        measurement_basis: Basis,
    ) -> Result<Bit, OracleError> {
        let mut state = QuantumState::encode(prepared_bit, prepared_basis)?;

        if let Some(chan) = &self.channel {
            state.apply_channel(chan);
        }

        let result = state.measure(&measurement_basis.measurement(), &mut self.rng)?;
        Ok(result.bit())
    }
}
