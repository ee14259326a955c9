//! Promise implementation following the Promise/A+ specification.
//!
//! A [`Promise`] is a handle to a settlement cell: it starts pending, settles
//! at most once, and schedules every registered continuation on its job
//! queue, in registration order, never inline.

use crate::resolution::resolve_promise;
use crate::task_queue::{MicroTask, SharedJobQueue};
use core_types::{Completion, Function, HostObject, Value};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled,
    /// The promise has been rejected with a reason.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReactionKind {
    Fulfill,
    Reject,
}

/// A continuation registered through `then`.
///
/// Runs the handler (or the passthrough when there is none) and feeds its
/// completion into the derived promise.
struct PromiseReaction {
    derived: Promise,
    handler: Option<Function>,
    kind: ReactionKind,
}

impl PromiseReaction {
    fn run(self, argument: Value) {
        let completion = match (&self.handler, self.kind) {
            (Some(handler), _) => handler.call(&Value::Undefined, &[argument]),
            (None, ReactionKind::Fulfill) => Ok(argument),
            (None, ReactionKind::Reject) => Err(argument),
        };
        match completion {
            Ok(value) => resolve_promise(&self.derived, value),
            Err(reason) => self.derived.reject_with(reason),
        }
    }
}

enum CellState {
    Pending {
        fulfill_reactions: Vec<PromiseReaction>,
        reject_reactions: Vec<PromiseReaction>,
    },
    Fulfilled(Value),
    Rejected(Value),
}

struct PromiseCell {
    state: CellState,
    /// Set once any continuation has been registered.
    handled: bool,
}

impl Drop for PromiseCell {
    fn drop(&mut self) {
        if let CellState::Rejected(reason) = &self.state {
            if !self.handled {
                warn!(%reason, "promise rejected with no handler");
            }
        }
    }
}

struct Shared {
    cell: Mutex<PromiseCell>,
    jobs: SharedJobQueue,
}

/// A promise: a single-assignment placeholder for a value that will become
/// available later.
///
/// Clones are handles to the same cell. Only the [`Resolver`]/[`Rejecter`]
/// pair handed out at construction (or by [`Promise::deferred`]) can settle
/// it; everyone else can only observe it and register continuations.
///
/// # Examples
///
/// ```
/// use promise_runtime::{EventLoop, Promise, PromiseState};
/// use core_types::{Function, Value};
///
/// let mut event_loop = EventLoop::new();
/// let jobs = event_loop.job_queue();
///
/// let promise = Promise::new(&jobs, |resolve, _reject| {
///     resolve.resolve(20);
///     Ok(())
/// });
/// let doubled = promise.then(
///     Some(Function::unary(|v| Ok(Value::from(v.as_number().unwrap_or(0.0) * 2.0)))),
///     None,
/// );
///
/// assert_eq!(promise.state(), PromiseState::Fulfilled);
/// assert_eq!(doubled.state(), PromiseState::Pending);
///
/// event_loop.run_until_idle().unwrap();
/// assert_eq!(doubled.value(), Some(Value::from(40)));
/// ```
#[derive(Clone)]
pub struct Promise {
    shared: Arc<Shared>,
}

impl Promise {
    /// Creates a promise and runs `executor` synchronously with its settling
    /// capabilities.
    ///
    /// An `Err` returned by the executor rejects the promise, unless it was
    /// already resolved.
    pub fn new<F>(jobs: &SharedJobQueue, executor: F) -> Promise
    where
        F: FnOnce(Resolver, Rejecter) -> Result<(), Value>,
    {
        let promise = Promise::pending(jobs.clone());
        let (resolver, rejecter) = promise.resolving_functions();
        if let Err(reason) = executor(resolver, rejecter.clone()) {
            rejecter.reject(reason);
        }
        promise
    }

    /// Creates a pending promise together with its settling capabilities.
    ///
    /// This is the factory conformance suites drive settlement through.
    pub fn deferred(jobs: &SharedJobQueue) -> Deferred {
        let promise = Promise::pending(jobs.clone());
        let (resolve, reject) = promise.resolving_functions();
        Deferred {
            promise,
            resolve,
            reject,
        }
    }

    pub(crate) fn pending(jobs: SharedJobQueue) -> Promise {
        Promise {
            shared: Arc::new(Shared {
                cell: Mutex::new(PromiseCell {
                    state: CellState::Pending {
                        fulfill_reactions: Vec::new(),
                        reject_reactions: Vec::new(),
                    },
                    handled: false,
                }),
                jobs,
            }),
        }
    }

    pub(crate) fn resolving_functions(&self) -> (Resolver, Rejecter) {
        let already_resolved = Arc::new(AtomicBool::new(false));
        (
            Resolver {
                promise: self.clone(),
                already_resolved: already_resolved.clone(),
            },
            Rejecter {
                promise: self.clone(),
                already_resolved,
            },
        )
    }

    /// Returns the current state.
    pub fn state(&self) -> PromiseState {
        match self.shared.cell.lock().state {
            CellState::Pending { .. } => PromiseState::Pending,
            CellState::Fulfilled(_) => PromiseState::Fulfilled,
            CellState::Rejected(_) => PromiseState::Rejected,
        }
    }

    /// Returns true while the promise is pending.
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// Returns the fulfillment value, if fulfilled.
    pub fn value(&self) -> Option<Value> {
        match &self.shared.cell.lock().state {
            CellState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the rejection reason, if rejected.
    pub fn reason(&self) -> Option<Value> {
        match &self.shared.cell.lock().state {
            CellState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Returns whether both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Returns the queue this promise schedules its reactions on.
    pub fn job_queue(&self) -> &SharedJobQueue {
        &self.shared.jobs
    }

    /// Recovers a promise of this runtime from a value, if it is one.
    pub fn from_value(value: &Value) -> Option<Promise> {
        value
            .as_object()?
            .as_any()
            .downcast_ref::<Promise>()
            .cloned()
    }

    pub(crate) fn fulfill(&self, value: Value) {
        self.settle(ReactionKind::Fulfill, value);
    }

    pub(crate) fn reject_with(&self, reason: Value) {
        self.settle(ReactionKind::Reject, reason);
    }

    fn settle(&self, kind: ReactionKind, result: Value) {
        let (reactions, discarded) = {
            let mut cell = self.shared.cell.lock();
            if !matches!(cell.state, CellState::Pending { .. }) {
                trace!(?kind, "promise already settled; ignoring");
                return;
            }
            let settled = match kind {
                ReactionKind::Fulfill => CellState::Fulfilled(result.clone()),
                ReactionKind::Reject => CellState::Rejected(result.clone()),
            };
            match mem::replace(&mut cell.state, settled) {
                CellState::Pending {
                    fulfill_reactions,
                    reject_reactions,
                } => match kind {
                    ReactionKind::Fulfill => (fulfill_reactions, reject_reactions),
                    ReactionKind::Reject => (reject_reactions, fulfill_reactions),
                },
                _ => (Vec::new(), Vec::new()),
            }
        };
        drop(discarded);

        trace!(?kind, reactions = reactions.len(), "promise settled");
        for reaction in reactions {
            self.schedule(reaction, result.clone());
        }
    }

    fn schedule(&self, reaction: PromiseReaction, argument: Value) {
        self.shared
            .jobs
            .enqueue(MicroTask::new(move || reaction.run(argument)));
    }

    fn register(&self, on_fulfilled: PromiseReaction, on_rejected: PromiseReaction) {
        let ready = {
            let mut cell = self.shared.cell.lock();
            cell.handled = true;
            match &mut cell.state {
                CellState::Pending {
                    fulfill_reactions,
                    reject_reactions,
                } => {
                    fulfill_reactions.push(on_fulfilled);
                    reject_reactions.push(on_rejected);
                    None
                }
                CellState::Fulfilled(value) => Some((on_fulfilled, value.clone())),
                CellState::Rejected(reason) => Some((on_rejected, reason.clone())),
            }
        };
        if let Some((reaction, argument)) = ready {
            self.schedule(reaction, argument);
        }
    }

    /// Registers continuations and returns the promise they settle.
    ///
    /// A missing `on_fulfilled` passes the value through and a missing
    /// `on_rejected` re-raises the reason. The handler's completion resolves
    /// the returned promise: `Ok` goes through the resolution procedure,
    /// `Err` rejects it.
    ///
    /// # Arguments
    ///
    /// * `on_fulfilled` - Optional handler called with the fulfillment value
    /// * `on_rejected` - Optional handler called with the rejection reason
    pub fn then(&self, on_fulfilled: Option<Function>, on_rejected: Option<Function>) -> Promise {
        let derived = Promise::pending(self.shared.jobs.clone());
        self.register(
            PromiseReaction {
                derived: derived.clone(),
                handler: on_fulfilled,
                kind: ReactionKind::Fulfill,
            },
            PromiseReaction {
                derived: derived.clone(),
                handler: on_rejected,
                kind: ReactionKind::Reject,
            },
        );
        derived
    }

    /// Registers a rejection handler. Same as `then(None, on_rejected)`.
    pub fn catch(&self, on_rejected: Option<Function>) -> Promise {
        self.then(None, on_rejected)
    }

    /// Registers a callback run once this promise settles either way.
    ///
    /// The returned promise settles like this one once the callback's result
    /// (itself unwrapped if it is a thenable) has fulfilled. If the callback
    /// raises, or its result rejects, that reason wins instead.
    pub fn finally(&self, on_finally: Option<Function>) -> Promise {
        let Some(on_finally) = on_finally else {
            return self.then(None, None);
        };
        let jobs = self.shared.jobs.clone();

        let on_fulfilled = {
            let on_finally = on_finally.clone();
            let jobs = jobs.clone();
            Function::unary(move |value| {
                let outcome = on_finally.call(&Value::Undefined, &[])?;
                let restore = Function::new(move |_| Ok(value.clone()));
                Ok(Promise::resolve(&jobs, outcome).then(Some(restore), None).into())
            })
        };
        let on_rejected = Function::unary(move |reason| {
            let outcome = on_finally.call(&Value::Undefined, &[])?;
            let rethrow = Function::new(move |_| Err(reason.clone()));
            Ok(Promise::resolve(&jobs, outcome).then(Some(rethrow), None).into())
        });

        self.then(Some(on_fulfilled), Some(on_rejected))
    }
}

fn callable(arg: Option<&Value>) -> Option<Function> {
    match arg {
        Some(Value::Function(f)) => Some(f.clone()),
        _ => None,
    }
}

impl HostObject for Promise {
    fn get(&self, key: &str) -> Completion {
        let promise = self.clone();
        let method = match key {
            "then" => Function::new(move |args| {
                Ok(promise.then(callable(args.first()), callable(args.get(1))).into())
            }),
            "catch" => Function::new(move |args| Ok(promise.catch(callable(args.first())).into())),
            "finally" => {
                Function::new(move |args| Ok(promise.finally(callable(args.first())).into()))
            }
            _ => return Ok(Value::Undefined),
        };
        Ok(Value::Function(method))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Value::object(promise)
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// The capability that resolves a promise.
///
/// Shares an already-resolved latch with its [`Rejecter`]: only the first
/// call of either has any effect, even while a resolution is still waiting
/// on a pending thenable.
#[derive(Clone)]
pub struct Resolver {
    promise: Promise,
    already_resolved: Arc<AtomicBool>,
}

impl Resolver {
    /// Resolves the promise with `value`, unwrapping thenables.
    pub fn resolve(&self, value: impl Into<Value>) {
        if self.already_resolved.swap(true, Ordering::AcqRel) {
            return;
        }
        resolve_promise(&self.promise, value.into());
    }

    /// Wraps this capability as a one-argument [`Function`].
    pub fn into_function(self) -> Function {
        Function::unary(move |value| {
            self.resolve(value);
            Ok(Value::Undefined)
        })
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("already_resolved", &self.already_resolved.load(Ordering::Acquire))
            .finish()
    }
}

/// The capability that rejects a promise.
#[derive(Clone)]
pub struct Rejecter {
    promise: Promise,
    already_resolved: Arc<AtomicBool>,
}

impl Rejecter {
    /// Rejects the promise with `reason`. The reason is never unwrapped.
    pub fn reject(&self, reason: impl Into<Value>) {
        if self.already_resolved.swap(true, Ordering::AcqRel) {
            return;
        }
        self.promise.reject_with(reason.into());
    }

    /// Wraps this capability as a one-argument [`Function`].
    pub fn into_function(self) -> Function {
        Function::unary(move |reason| {
            self.reject(reason);
            Ok(Value::Undefined)
        })
    }
}

impl fmt::Debug for Rejecter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejecter")
            .field("already_resolved", &self.already_resolved.load(Ordering::Acquire))
            .finish()
    }
}

/// A pending promise bundled with the capabilities that settle it.
#[derive(Debug, Clone)]
pub struct Deferred {
    /// The promise
    pub promise: Promise,
    /// Resolves `promise`
    pub resolve: Resolver,
    /// Rejects `promise`
    pub reject: Rejecter,
}
