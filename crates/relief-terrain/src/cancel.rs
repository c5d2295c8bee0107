//! Cooperative cancellation for long-running sculpting passes.
//!
//! Multi-pass operators poll a [`CancelToken`] between passes (or between rows
//! for per-row scans). A pass that has started always runs to completion, so
//! the grid only ever holds fully committed passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::TerrainError;

/// Shared flag that lets another thread request early termination.
///
/// Cloning the token shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Running operators stop at their next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Checkpoint: `Err(Cancelled)` if cancellation was requested.
    pub fn check(&self) -> Result<(), TerrainError> {
        if self.is_cancelled() {
            Err(TerrainError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_passes_checkpoint() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancelToken::new();
        let remote = token.clone();
        remote.cancel();
        assert!(token.is_cancelled(), "Cancelling a clone must cancel the original");
        assert_eq!(token.check(), Err(TerrainError::Cancelled));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();
        assert!(token.is_cancelled());
    }
}
