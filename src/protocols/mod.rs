//! Quantum Cryptography Protocols.
//!
//! This module contains the protocol layer built on top of the measurement
//! oracles: currently BB84 key distribution with eavesdropping detection.

pub mod qkd;
pub use qkd::bb84;
