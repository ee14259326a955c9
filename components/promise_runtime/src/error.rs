//! Errors reported by the host run-loop.
//!
//! Promise operations never fail at the call site; their failures become
//! rejections. Only draining the queue can report an error.

use thiserror::Error;

/// Errors raised while driving the event loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The configured per-drain budget ran out before the queue emptied.
    #[error("microtask budget of {budget} exhausted with {remaining} microtasks still queued")]
    MicrotaskBudgetExceeded {
        /// The configured budget
        budget: usize,
        /// Microtasks left in the queue
        remaining: usize,
    },
}

/// Result type for event loop operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
