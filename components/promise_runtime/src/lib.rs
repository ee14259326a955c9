//! Promise runtime.
//!
//! This crate provides a deferred-value primitive following the Promise/A+
//! specification, together with the queue and run-loop it schedules on:
//! - Settlement cells that settle exactly once
//! - Chained continuations (`then`, `catch`, `finally`) that always run on a
//!   later turn, in registration order
//! - The resolution procedure that unwraps nested thenables
//! - Aggregation combinators (`all`, `race`, `all_settled`)
//!
//! # Overview
//!
//! - [`EventLoop`] - Host run-loop draining the microtask queue
//! - [`JobQueue`] - The deferred callback queue promises are given
//! - [`Promise`] - Promise/A+ compliant settlement cell
//! - [`Deferred`] - Promise bundled with its settling capabilities
//!
//! # Examples
//!
//! ```
//! use promise_runtime::{EventLoop, Promise, SettledOutcome};
//! use core_types::Value;
//!
//! let mut event_loop = EventLoop::new();
//! let jobs = event_loop.job_queue();
//!
//! let outcomes = Promise::all_settled(
//!     &jobs,
//!     vec![
//!         Value::from(Promise::resolve(&jobs, 1)),
//!         Value::from(Promise::reject(&jobs, "e")),
//!     ],
//! );
//! event_loop.run_until_idle().unwrap();
//!
//! assert_eq!(
//!     outcomes.value(),
//!     Some(Value::Array(vec![
//!         SettledOutcome::Fulfilled(Value::from(1)).into(),
//!         SettledOutcome::Rejected(Value::from("e")).into(),
//!     ]))
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combinators;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod promise;
pub mod resolution;
pub mod task_queue;

// Re-export main types at crate root
pub use combinators::SettledOutcome;
pub use config::EventLoopConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use event_loop::EventLoop;
pub use promise::{Deferred, Promise, PromiseState, Rejecter, Resolver};
pub use resolution::SELF_RESOLUTION_MESSAGE;
pub use task_queue::{JobQueue, MicroTask, MicrotaskQueue, SharedJobQueue};
