//! Measurement oracles.
//!
//! The protocol never touches a quantum backend directly. Every carrier reading
//! goes through a [`MeasurementOracle`], which answers "a carrier prepared as
//! `prepared_bit` in `prepared_basis` was read in `measurement_basis`: which bit
//! came out?". Implementations may be closed-form ([`IdealOracle`]), a
//! statistical simulator ([`DensityMatrixOracle`]), or a wrapper over real
//! hardware; the protocol logic cannot tell them apart.

mod density;
mod ideal;

pub use density::DensityMatrixOracle;
pub use ideal::IdealOracle;

use crate::RandomSource;
use crate::config::{ExperimentConfig, OracleKind};
use crate::core::{Basis, Bit, QuantumChannel};
use crate::errors::{OracleError, ProtocolError};
use serde::{Deserialize, Serialize};

/// One carrier reading submitted to an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRequest {
    pub prepared_bit: Bit,
    pub prepared_basis: Basis,
    pub measurement_basis: Basis,
}

impl MeasurementRequest {
    pub fn new(prepared_bit: Bit, prepared_basis: Basis, measurement_basis: Basis) -> Self {
        Self {
            prepared_bit,
            prepared_basis,
            measurement_basis,
        }
    }
}

/// Source of BB84 measurement statistics.
///
/// Handles are used through `&mut self`: a backend that is not reentrant is never
/// entered twice, and callers wanting parallelism hold one oracle per worker.
pub trait MeasurementOracle {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Reads one carrier.
    ///
    /// With matching bases an ideal backend returns `prepared_bit`; otherwise the
    /// outcome is uniform and independent of it. Noisy backends may deviate.
    fn measure(
        &mut self,
        prepared_bit: Bit,
        prepared_basis: Basis,
        measurement_basis: Basis,
    ) -> Result<Bit, OracleError>;

    /// Reads a whole batch, returning one outcome per request in request order.
    ///
    /// High-latency backends should override this to submit a single job.
    fn measure_batch(&mut self, requests: &[MeasurementRequest]) -> Result<Vec<Bit>, OracleError> {
        requests
            .iter()
            .map(|r| self.measure(r.prepared_bit, r.prepared_basis, r.measurement_basis))
            .collect()
    }
}

/// Builds the oracle an [`ExperimentConfig`] asks for, drawing its randomness
/// from a fork of `rng`.
pub fn from_config(
    config: &ExperimentConfig,
    rng: &mut RandomSource,
) -> Result<Box<dyn MeasurementOracle>, ProtocolError> {
    let oracle_rng = rng.fork();

    match (config.oracle, config.noise) {
        (OracleKind::Ideal, None) => Ok(Box::new(IdealOracle::new(oracle_rng))),
        (OracleKind::Ideal, Some(_)) => Err(ProtocolError::InvalidConfiguration(
            "noise requires the density-matrix oracle".to_string(),
        )),
        (OracleKind::DensityMatrix, noise) => {
            let mut oracle = DensityMatrixOracle::new(oracle_rng);
            if let Some(p) = noise {
                let channel = QuantumChannel::depolarizing(p)
                    .map_err(|e| ProtocolError::InvalidConfiguration(e.to_string()))?;
                oracle = oracle.with_channel(channel);
            }
            Ok(Box::new(oracle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_requested_backend() {
        let mut rng = RandomSource::from_seed(1);

        let ideal = from_config(&ExperimentConfig::default(), &mut rng).unwrap();
        assert_eq!(ideal.name(), "ideal");

        let noisy = ExperimentConfig::default()
            .with_oracle(OracleKind::DensityMatrix)
            .with_noise(0.1);
        assert_eq!(from_config(&noisy, &mut rng).unwrap().name(), "density-matrix");
    }

    #[test]
    fn rejects_noise_on_ideal_backend() {
        let mut rng = RandomSource::from_seed(1);
        let config = ExperimentConfig::default().with_noise(0.1);
        assert!(matches!(
            from_config(&config, &mut rng),
            Err(ProtocolError::InvalidConfiguration(_))
        ));
    }
}
