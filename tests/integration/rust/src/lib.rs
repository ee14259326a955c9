//! Integration test suite for the promise runtime
//!
//! These tests drive promises through a real [`EventLoop`] the way a host
//! would, across the core_types / promise_runtime boundary.
//!
//! [`EventLoop`]: promise_runtime::EventLoop

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use promise_runtime;
}
