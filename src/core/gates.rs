use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// Represents a single-qubit quantum gate.
///
/// A gate is defined by its 2x2 unitary matrix. These are the operations Alice
/// and Eve use to encode a bit in a basis before a carrier leaves them.
#[derive(Clone, Debug)]
pub struct Gate {
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Arguments
    ///
    /// * `matrix` - A 2x2, unitary `Array2<Complex64>`.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if:
    /// - The matrix is not square.
    /// - The matrix is not 2x2.
    /// - The matrix is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(GateError::NotSquareMatrix);
        }

        if !utils::is_qubit_operator(&matrix) {
            return Err(GateError::InvalidDimensions);
        }

        if !utils::is_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        Ok(Self { matrix })
    }

    // --- Standard Gates ---

    /// Creates a Pauli-X gate (NOT gate). Encodes bit 1.
    pub fn x() -> Gate {
        Gate {
            matrix: arr2(&[
                [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            ]),
        }
    }

    /// Creates a Hadamard gate. Rotates the rectilinear basis onto the diagonal one.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate {
            matrix: arr2(&[
                [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
                [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
            ]),
        }
    }
}
