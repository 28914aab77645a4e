//! Scoped input suppression for the duration of a drag.
//!
//! While a gesture is active the host shows a drag cursor and suppresses
//! text selection. The lock is held by a [`SuppressionGuard`] and released
//! when the guard drops, so every way a gesture can end (pointer-up, cancel,
//! engine teardown) restores the host state.

use std::cell::Cell;
use std::rc::Rc;

/// Host-side effect toggled around a gesture.
pub trait InputSuppression {
    /// Show the drag cursor and block selection.
    fn acquire(&self);
    /// Restore the cursor and selection behavior.
    fn release(&self);
}

/// Suppression that does nothing. Used when there is no host surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSuppression;

impl InputSuppression for NoopSuppression {
    fn acquire(&self) {}
    fn release(&self) {}
}

/// Suppression that counts how many locks are currently held.
///
/// Handy for hosts that need to query the state instead of reacting to it.
#[derive(Debug, Default)]
pub struct SuppressionCounter {
    held: Cell<usize>,
}

impl SuppressionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding locks.
    pub fn held(&self) -> usize {
        self.held.get()
    }

    /// Whether any lock is outstanding.
    pub fn is_suppressed(&self) -> bool {
        self.held.get() > 0
    }
}

impl InputSuppression for SuppressionCounter {
    fn acquire(&self) {
        self.held.set(self.held.get() + 1);
    }

    fn release(&self) {
        self.held.set(self.held.get().saturating_sub(1));
    }
}

/// Holds the suppression lock until dropped.
pub struct SuppressionGuard {
    target: Rc<dyn InputSuppression>,
}

impl SuppressionGuard {
    /// Acquire the lock on `target`.
    pub fn acquire(target: Rc<dyn InputSuppression>) -> Self {
        target.acquire();
        Self { target }
    }
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        self.target.release();
    }
}

impl std::fmt::Debug for SuppressionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuppressionGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let counter = Rc::new(SuppressionCounter::new());
        {
            let _guard = SuppressionGuard::acquire(counter.clone());
            assert!(counter.is_suppressed());
        }
        assert!(!counter.is_suppressed());
    }

    #[test]
    fn test_release_never_underflows() {
        let counter = SuppressionCounter::new();
        counter.release();
        assert_eq!(counter.held(), 0);
    }
}
