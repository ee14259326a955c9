//! Promise constructors and aggregation combinators.
//!
//! Everything here is built on `then` and the resolution procedure; none of
//! it touches a cell directly except `resolve` and `reject`.

use crate::promise::{Promise, Rejecter, Resolver};
use crate::resolution::resolve_promise;
use crate::task_queue::SharedJobQueue;
use core_types::{Function, Value};
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;

/// The outcome of one input of [`Promise::all_settled`].
///
/// Converts to and from the `{status, value}` / `{status, reason}` records
/// `all_settled` fulfills with.
#[derive(Debug, Clone, PartialEq)]
pub enum SettledOutcome {
    /// The input fulfilled with this value.
    Fulfilled(Value),
    /// The input rejected with this reason.
    Rejected(Value),
}

impl SettledOutcome {
    /// Parses an outcome record.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Record(fields) = value else {
            return None;
        };
        match fields.get("status")?.as_str()? {
            "fulfilled" => Some(SettledOutcome::Fulfilled(fields.get("value")?.clone())),
            "rejected" => Some(SettledOutcome::Rejected(fields.get("reason")?.clone())),
            _ => None,
        }
    }
}

impl From<SettledOutcome> for Value {
    fn from(outcome: SettledOutcome) -> Self {
        match outcome {
            SettledOutcome::Fulfilled(value) => {
                Value::record([("status", Value::from("fulfilled")), ("value", value)])
            }
            SettledOutcome::Rejected(reason) => {
                Value::record([("status", Value::from("rejected")), ("reason", reason)])
            }
        }
    }
}

/// Positional result slots shared by the per-input reactions.
struct Tally {
    slots: Vec<Value>,
    remaining: usize,
}

impl Tally {
    fn new(len: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Tally {
            slots: vec![Value::Undefined; len],
            remaining: len,
        }))
    }

    /// Stores a result. Returns every slot once the last one is filled.
    fn record(&mut self, index: usize, value: Value) -> Option<Vec<Value>> {
        self.slots[index] = value;
        self.remaining -= 1;
        (self.remaining == 0).then(|| mem::take(&mut self.slots))
    }
}

fn record_into(
    tally: &Arc<Mutex<Tally>>,
    index: usize,
    resolver: &Resolver,
    wrap: fn(Value) -> Value,
) -> Function {
    let tally = tally.clone();
    let resolver = resolver.clone();
    Function::unary(move |value| {
        let finished = tally.lock().record(index, wrap(value));
        if let Some(slots) = finished {
            resolver.resolve(Value::Array(slots));
        }
        Ok(Value::Undefined)
    })
}

impl Promise {
    /// Returns `value` unchanged if it already is a promise of this runtime,
    /// otherwise a new promise resolved with it.
    pub fn resolve(jobs: &SharedJobQueue, value: impl Into<Value>) -> Promise {
        let value = value.into();
        if let Some(promise) = Promise::from_value(&value) {
            return promise;
        }
        let promise = Promise::pending(jobs.clone());
        resolve_promise(&promise, value);
        promise
    }

    /// Returns a new promise rejected with `reason`. The reason is taken as
    /// is, even when it is a thenable.
    pub fn reject(jobs: &SharedJobQueue, reason: impl Into<Value>) -> Promise {
        let promise = Promise::pending(jobs.clone());
        promise.reject_with(reason.into());
        promise
    }

    /// Fulfills with every input's value, in input order, once all inputs
    /// have fulfilled. Rejects with the first rejection.
    ///
    /// An empty input fulfills immediately with an empty array.
    pub fn all<I>(jobs: &SharedJobQueue, inputs: I) -> Promise
    where
        I: IntoIterator<Item = Value>,
    {
        let inputs: Vec<Value> = inputs.into_iter().collect();
        Promise::new(jobs, |resolver, rejecter| {
            if inputs.is_empty() {
                resolver.resolve(Value::Array(Vec::new()));
                return Ok(());
            }
            let tally = Tally::new(inputs.len());
            for (index, input) in inputs.into_iter().enumerate() {
                let on_fulfilled = record_into(&tally, index, &resolver, |value| value);
                Promise::resolve(jobs, input)
                    .then(Some(on_fulfilled), Some(rejecter.clone().into_function()));
            }
            Ok(())
        })
    }

    /// Settles like whichever input settles first.
    ///
    /// An empty input leaves the returned promise pending forever.
    pub fn race<I>(jobs: &SharedJobQueue, inputs: I) -> Promise
    where
        I: IntoIterator<Item = Value>,
    {
        Promise::new(jobs, |resolver, rejecter| {
            for input in inputs {
                Promise::resolve(jobs, input).then(
                    Some(resolver.clone().into_function()),
                    Some(rejecter.clone().into_function()),
                );
            }
            Ok(())
        })
    }

    /// Fulfills with one outcome record per input, in input order, once
    /// every input has settled. Never rejects.
    ///
    /// An empty input fulfills immediately with an empty array.
    pub fn all_settled<I>(jobs: &SharedJobQueue, inputs: I) -> Promise
    where
        I: IntoIterator<Item = Value>,
    {
        let inputs: Vec<Value> = inputs.into_iter().collect();
        Promise::new(jobs, |resolver, _rejecter: Rejecter| {
            if inputs.is_empty() {
                resolver.resolve(Value::Array(Vec::new()));
                return Ok(());
            }
            let tally = Tally::new(inputs.len());
            for (index, input) in inputs.into_iter().enumerate() {
                let on_fulfilled = record_into(&tally, index, &resolver, |value| {
                    SettledOutcome::Fulfilled(value).into()
                });
                let on_rejected = record_into(&tally, index, &resolver, |reason| {
                    SettledOutcome::Rejected(reason).into()
                });
                Promise::resolve(jobs, input).then(Some(on_fulfilled), Some(on_rejected));
            }
            Ok(())
        })
    }
}
