//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: prepare-and-measure key distribution over two conjugate bases,
//!   simulated with an optional measure-and-resend eavesdropper.

pub mod bb84;
