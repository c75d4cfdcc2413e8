//! Utility functions for single-qubit operator algebra.
//!
//! This module contains helper functions for:
//! - Matrix operations (trace, adjoint, outer product, conjugation).
//! - Unitarity and completeness checks for gates, measurements and channels.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Dimension of a carrier's Hilbert space.
pub const QUBIT_DIM: usize = 2;

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Conjugate transpose $M^\dagger$.
pub fn dagger(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|c| c.conj())
}

/// Computes $K \rho K^\dagger$.
pub fn conjugate(op: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    op.dot(rho).dot(&dagger(op))
}

/// Checks that an operator is a 2x2 matrix.
pub fn is_qubit_operator(matrix: &Array2<Complex64>) -> bool {
    matrix.dim() == (QUBIT_DIM, QUBIT_DIM)
}

/// Checks if a given matrix is unitary
pub fn is_unitary(matrix: &Array2<Complex64>) -> bool {
    let (rows, _) = matrix.dim();
    let eye = Array2::<Complex64>::eye(rows);
    let product = matrix.dot(&dagger(matrix));

    product
        .iter()
        .zip(eye.iter())
        .all(|(a, b)| (*a - *b).norm() < 1e-6)
}

/// Checks completeness relation for measurement or Kraus operators.
///
/// Verifies if $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let eye = Array2::<Complex64>::eye(dim);
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            acc + dagger(op).dot(op)
        });
    sum.iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < 1e-9)
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}
