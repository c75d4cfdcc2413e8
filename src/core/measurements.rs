use crate::core::errors::MeasurementError;
use crate::core::utils::{self, QUBIT_DIM};
use crate::core::{Bit, Gate};
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// One of the two conjugate BB84 bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Z basis {|0>, |1>}, encoded as 0.
    Rectilinear,
    /// X basis {|+>, |->}, encoded as 1.
    Diagonal,
}

impl Basis {
    /// Maps a uniform random bit onto a basis (`false` -> rectilinear).
    pub fn from_bit(bit: Bit) -> Self {
        if bit {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    pub fn as_bit(self) -> Bit {
        matches!(self, Basis::Diagonal)
    }

    /// Projective measurement reading a carrier in this basis.
    pub fn measurement(self) -> Measurement {
        match self {
            Basis::Rectilinear => Measurement::z_basis(),
            Basis::Diagonal => Measurement::x_basis(),
        }
    }

    /// Gate rotating |0>/|1> into this basis, if any.
    pub fn rotation(self) -> Option<Gate> {
        match self {
            Basis::Rectilinear => None,
            Basis::Diagonal => Some(Gate::h()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Measurement {
    /// List of measurement operators. Outcome `k` reads as bit `k == 1`.
    pub operators: Vec<Array2<Complex64>>,
}

impl Measurement {
    pub fn new(operators: Vec<Array2<Complex64>>) -> Result<Self, MeasurementError> {
        if operators.is_empty() {
            return Err(MeasurementError::Empty);
        }

        if !operators.iter().all(utils::is_qubit_operator) {
            return Err(MeasurementError::InvalidDimensions);
        }

        if !utils::check_completeness(&operators, QUBIT_DIM) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self { operators })
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    pub fn z_basis() -> Measurement {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        Measurement {
            operators: vec![
                utils::outer_product(&v0, &v0),
                utils::outer_product(&v1, &v1),
            ],
        }
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    pub fn x_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        let v_plus: Array1<Complex64> = array![inv_sqrt2, inv_sqrt2];
        let v_minus: Array1<Complex64> = array![inv_sqrt2, -inv_sqrt2];

        Measurement {
            operators: vec![
                utils::outer_product(&v_plus, &v_plus),
                utils::outer_product(&v_minus, &v_minus),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Applied measurment operator index
    pub index: usize,
    /// Born probability of the selected outcome before collapse
    pub probability: f64,
}

impl MeasurementResult {
    /// Outcome read as a key bit.
    pub fn bit(&self) -> Bit {
        self.index == 1
    }
}
