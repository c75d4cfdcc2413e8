mod channels;
pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use channels::QuantumChannel;
pub use gates::Gate;
pub use measurements::{Basis, Measurement, MeasurementResult};
pub use state::QuantumState;

/// A classical key bit or measurement outcome; `true` is 1.
pub type Bit = bool;
