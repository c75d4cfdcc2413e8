use crate::core::{Basis, Bit};
use crate::errors::OracleError;
use crate::oracle::{MeasurementOracle, MeasurementRequest};

/// One transmitted qubit, described by the choices made on each side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carrier {
    pub alice_bit: Bit,
    pub alice_basis: Basis,
    pub bob_basis: Basis,
    /// Present iff Eve intercepts this carrier.
    pub eve_basis: Option<Basis>,
}

/// What came out of a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierOutcome {
    pub eve_bit: Option<Bit>,
    pub bob_bit: Bit,
}

impl Carrier {
    pub fn new(
        alice_bit: Bit,
        alice_basis: Basis,
        bob_basis: Basis,
        eve_basis: Option<Basis>,
    ) -> Self {
        Self {
            alice_bit,
            alice_basis,
            bob_basis,
            eve_basis,
        }
    }

    /// Eve's reading of Alice's carrier, if she intercepts.
    pub fn eve_request(&self) -> Option<MeasurementRequest> {
        self.eve_basis
            .map(|eve_basis| MeasurementRequest::new(self.alice_bit, self.alice_basis, eve_basis))
    }

    /// Bob's reading.
    ///
    /// When Eve intercepted, Bob receives her re-prepared carrier encoding
    /// `eve_bit` in her basis; otherwise he receives Alice's.
    pub fn bob_request(&self, eve_bit: Option<Bit>) -> MeasurementRequest {
        match (self.eve_basis, eve_bit) {
            (Some(eve_basis), Some(bit)) => MeasurementRequest::new(bit, eve_basis, self.bob_basis),
            _ => MeasurementRequest::new(self.alice_bit, self.alice_basis, self.bob_basis),
        }
    }

    /// Simulates this carrier end to end with one oracle call per hop.
    pub fn simulate<O>(&self, oracle: &mut O) -> Result<CarrierOutcome, OracleError>
    where
        O: MeasurementOracle + ?Sized,
    {
        let eve_bit = self
            .eve_request()
            .map(|req| read(oracle, req))
            .transpose()?;
        let bob_bit = read(oracle, self.bob_request(eve_bit))?;

        Ok(CarrierOutcome { eve_bit, bob_bit })
    }
}

fn read<O>(oracle: &mut O, req: MeasurementRequest) -> Result<Bit, OracleError>
where
    O: MeasurementOracle + ?Sized,
{
    oracle.measure(req.prepared_bit, req.prepared_basis, req.measurement_basis)
}
