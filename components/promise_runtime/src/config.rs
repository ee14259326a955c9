//! Event loop configuration.

use serde::{Deserialize, Serialize};

/// Tunables for an [`EventLoop`](crate::EventLoop).
///
/// Every field has a default, so hosts can deserialize a partial table from
/// their own configuration files.
///
/// # Examples
///
/// ```
/// use promise_runtime::EventLoopConfig;
///
/// let config = EventLoopConfig::default().with_microtask_budget(10_000);
/// assert_eq!(config.max_microtasks_per_drain, Some(10_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopConfig {
    /// Upper bound on microtasks run by one `run_until_idle` call.
    ///
    /// `None` drains without limit. A bound turns a runaway chain of
    /// self-scheduling reactions into a `RuntimeError` instead of a hang.
    pub max_microtasks_per_drain: Option<usize>,
}

impl EventLoopConfig {
    /// Sets the per-drain microtask budget.
    pub fn with_microtask_budget(mut self, budget: usize) -> Self {
        self.max_microtasks_per_drain = Some(budget);
        self
    }
}
