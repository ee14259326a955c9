//! Deferred callback queue.
//!
//! Promises never run continuations inline: every continuation becomes a
//! [`MicroTask`] handed to a [`JobQueue`]. The host owns the queue and drains
//! it strictly after the current unit of work returns.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A unit of deferred work.
///
/// Microtasks carry promise reactions. They return nothing: any failure
/// inside has already been turned into a rejection of some promise.
pub struct MicroTask {
    callback: Box<dyn FnOnce() + Send>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the microtask runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) {
        (self.callback)()
    }
}

impl std::fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// The collaborator promises schedule their reactions on.
///
/// Implementations must run enqueued tasks in FIFO order, on a later turn
/// than the call to `enqueue`, and must never run a task from inside
/// `enqueue` itself.
pub trait JobQueue: Send + Sync {
    /// Appends a microtask to the end of the queue.
    fn enqueue(&self, microtask: MicroTask);
}

/// Shared handle to the queue a promise schedules on.
pub type SharedJobQueue = Arc<dyn JobQueue>;

/// The default FIFO microtask queue.
///
/// Clones share the same underlying queue, so one handle can be given to
/// promises while another is drained by the [`EventLoop`](crate::EventLoop).
/// The internal lock is only held to push or pop, never while a task runs.
#[derive(Debug, Clone, Default)]
pub struct MicrotaskQueue {
    queue: Arc<Mutex<VecDeque<MicroTask>>>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&self, microtask: MicroTask) {
        self.queue.lock().push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&self) -> Option<MicroTask> {
        self.queue.lock().pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl JobQueue for MicrotaskQueue {
    fn enqueue(&self, microtask: MicroTask) {
        MicrotaskQueue::enqueue(self, microtask);
    }
}
