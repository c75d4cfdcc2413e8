//! Cooperative cancellation for trials and experiments.

use crate::errors::ProtocolError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.
///
/// Clones observe the same flag, so one handle can be moved to another thread
/// (or a signal handler) while the experiment holds the other.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with `CancellationRequested` once `cancel` has been called.
    pub fn check(&self) -> Result<(), ProtocolError> {
        if self.is_cancelled() {
            return Err(ProtocolError::CancellationRequested);
        }
        Ok(())
    }
}
