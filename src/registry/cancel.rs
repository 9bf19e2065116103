//! Shared cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A set-once flag shared between a registry entry and the background work
/// serving it.
///
/// Clones observe the same flag. The flag goes from unset to set exactly
/// once and never resets, so it stays meaningful after the registry entry
/// that created it has been dropped.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag. Returns true if this call is the one that set it.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    /// Returns true once any clone has been canceled.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
