//! Event loop implementation.
//!
//! The event loop is the host side of the deferred callback queue: it hands
//! out [`SharedJobQueue`] handles to promises and drains the microtasks they
//! schedule, one turn at a time.

use crate::config::EventLoopConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::task_queue::{MicroTask, MicrotaskQueue, SharedJobQueue};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The host run-loop.
///
/// Each turn takes the oldest microtask and runs it to completion before the
/// next one starts. Microtasks enqueued during a drain run in the same drain,
/// after everything queued before them.
///
/// # Examples
///
/// ```
/// use promise_runtime::{EventLoop, Promise, PromiseState};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let jobs = event_loop.job_queue();
///
/// let promise = Promise::resolve(&jobs, 1).then(None, None);
/// assert_eq!(promise.state(), PromiseState::Pending);
///
/// event_loop.run_until_idle().unwrap();
/// assert_eq!(promise.value(), Some(Value::from(1)));
/// ```
#[derive(Debug, Default)]
pub struct EventLoop {
    microtask_queue: MicrotaskQueue,
    config: EventLoopConfig,
}

impl EventLoop {
    /// Creates a new EventLoop with an empty queue and default configuration.
    pub fn new() -> Self {
        Self::with_config(EventLoopConfig::default())
    }

    /// Creates a new EventLoop with the given configuration.
    pub fn with_config(config: EventLoopConfig) -> Self {
        Self {
            microtask_queue: MicrotaskQueue::new(),
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EventLoopConfig {
        &self.config
    }

    /// Returns a handle promises can schedule their reactions on.
    pub fn job_queue(&self) -> SharedJobQueue {
        Arc::new(self.microtask_queue.clone())
    }

    /// Adds a microtask to the microtask queue.
    ///
    /// The microtask will be executed on a later turn.
    pub fn enqueue_microtask(&mut self, microtask: MicroTask) {
        self.microtask_queue.enqueue(microtask);
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.microtask_queue.is_empty()
    }

    /// Returns the number of queued microtasks.
    pub fn pending_microtasks(&self) -> usize {
        self.microtask_queue.len()
    }

    /// Runs exactly one turn.
    ///
    /// # Returns
    ///
    /// `true` if a microtask ran, `false` if the queue was empty.
    pub fn run_one(&mut self) -> bool {
        match self.microtask_queue.dequeue() {
            Some(microtask) => {
                microtask.run();
                true
            }
            None => false,
        }
    }

    /// Runs microtasks until the queue is empty.
    ///
    /// # Returns
    ///
    /// The number of microtasks that ran.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::MicrotaskBudgetExceeded`] if the configured
    /// budget is spent while work remains. The remaining microtasks stay
    /// queued and a later call resumes them.
    pub fn run_until_idle(&mut self) -> RuntimeResult<usize> {
        let mut ran = 0usize;
        loop {
            if let Some(budget) = self.config.max_microtasks_per_drain {
                if ran >= budget && !self.microtask_queue.is_empty() {
                    let remaining = self.microtask_queue.len();
                    warn!(budget, remaining, "microtask budget exhausted");
                    return Err(RuntimeError::MicrotaskBudgetExceeded { budget, remaining });
                }
            }

            let Some(microtask) = self.microtask_queue.dequeue() else {
                break;
            };
            trace!(turn = ran, "running microtask");
            microtask.run();
            ran += 1;
        }

        debug!(ran, "microtask queue drained");
        Ok(ran)
    }
}
