//! Cooperative cancellation shared by every worker of a run.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag checked by workers at every batch flush.
///
/// Cloning yields a handle to the same flag.
///
/// # Examples
/// ```
/// use cliquegen_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let worker_view = token.clone();
/// assert!(!worker_view.is_cancelled());
/// token.cancel();
/// assert!(worker_view.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every worker holding this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
