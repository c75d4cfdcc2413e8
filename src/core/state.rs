use crate::core::errors::StateError;
use crate::core::utils::{self, QUBIT_DIM, trace};
use crate::core::{Basis, Bit, Gate, Measurement, MeasurementResult, QuantumChannel};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

/// Density matrix of one carrier qubit.
#[derive(Clone, Debug)]
pub struct QuantumState {
    pub density_matrix: Array2<Complex64>,
}

impl Default for QuantumState {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0>.
    pub fn new() -> Self {
        let mut density_matrix = Array2::<Complex64>::zeros((QUBIT_DIM, QUBIT_DIM));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self { density_matrix }
    }

    /// Prepares `bit` in `basis`: X on |0> for a one, then H for the diagonal basis.
    pub fn encode(bit: Bit, basis: Basis) -> Result<Self, StateError> {
        let mut state = Self::new();

        if bit {
            state.apply(&Gate::x())?;
        }
        if let Some(rotation) = basis.rotation() {
            state.apply(&rotation)?;
        }

        Ok(state)
    }

    /// Checks the validity of a density matrix
    fn check_density_matrix(matrix: &Array2<Complex64>) -> Result<(), StateError> {
        let (rows, cols) = matrix.dim();

        if rows != QUBIT_DIM || cols != QUBIT_DIM {
            return Err(StateError::DimensionMismatch {
                expected: QUBIT_DIM,
                got_rows: rows,
                got_cols: cols,
            });
        }

        let tr = trace(matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > 1e-12 {
            return Err(StateError::InvalidTrace(tr));
        }

        Ok(())
    }

    /// Creates a QuantumState from a generic density matrix.
    pub fn from_density_matrix(matrix: Array2<Complex64>) -> Result<Self, StateError> {
        Self::check_density_matrix(&matrix)?;
        Ok(Self {
            density_matrix: matrix,
        })
    }

    /// Checks if a QuantumState is valid.
    pub fn is_valid(&self) -> Result<(), StateError> {
        Self::check_density_matrix(&self.density_matrix)
    }

    /// rho -> U rho U†
    pub fn apply(&mut self, gate: &Gate) -> Result<(), StateError> {
        let (rows, cols) = gate.matrix.dim();
        if rows != QUBIT_DIM || cols != QUBIT_DIM {
            return Err(StateError::DimensionMismatch {
                expected: QUBIT_DIM,
                got_rows: rows,
                got_cols: cols,
            });
        }

        self.density_matrix = utils::conjugate(&gate.matrix, &self.density_matrix);
        Ok(())
    }

    /// Apply QuantumChannel to QuantumState: rho -> sum_k K rho K†
    pub fn apply_channel(&mut self, channel: &QuantumChannel) {
        let mut new_rho = Array2::<Complex64>::zeros((QUBIT_DIM, QUBIT_DIM));

        for k in &channel.kraus_ops {
            new_rho = new_rho + utils::conjugate(k, &self.density_matrix);
        }

        self.density_matrix = new_rho;
    }

    /// Returns the Born probability of each measurement outcome.
    pub fn probabilities(&self, measurement: &Measurement) -> Result<Vec<f64>, StateError> {
        let mut probs = Vec::with_capacity(measurement.operators.len());
        let mut sum_probs = 0.0;

        for op in &measurement.operators {
            let p_k = trace(&utils::conjugate(op, &self.density_matrix)).re.max(0.0);
            probs.push(p_k);
            sum_probs += p_k;
        }

        if sum_probs < 1e-12 {
            return Err(StateError::InvalidTrace(Complex64::new(sum_probs, 0.0)));
        }

        // Due to float, renormalazation of probabilities to ensure completeness
        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok(probs)
    }

    /// Randomly selects operator index ponderating using `probs`
    fn pick_outcome<R: Rng>(probs: &[f64], rng: &mut R) -> usize {
        let roll: f64 = rng.random();

        let mut cumulative = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if roll < cumulative {
                return i;
            }
        }
        probs.len().saturating_sub(1)
    }

    /// Phisical measurment which changes the state irretrievably
    pub fn measure<R: Rng>(
        &mut self,
        measurement: &Measurement,
        rng: &mut R,
    ) -> Result<MeasurementResult, StateError> {
        let probs = self.probabilities(measurement)?;

        let outcome_idx = Self::pick_outcome(&probs, rng);
        let p_selected = probs[outcome_idx];

        if p_selected <= 1e-12 {
            return Err(StateError::ImpossibleOutcome(outcome_idx));
        }

        // rho' = (M_k * rho * M_k†) / p_k
        let numerator = utils::conjugate(&measurement.operators[outcome_idx], &self.density_matrix);
        self.density_matrix = numerator.mapv(|val| val / Complex64::new(p_selected, 0.0));

        Ok(MeasurementResult {
            index: outcome_idx,
            probability: p_selected,
        })
    }
}
