//! The promise resolution procedure.
//!
//! Given a candidate value, decide whether it settles the target promise
//! directly or whether the target has to adopt the state of a thenable.
//! Adoption can nest to any depth; synchronous nesting is unrolled into a
//! loop so the call stack does not grow with the chain.

use crate::promise::Promise;
use core_types::{Function, JsError, Value};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// Message of the `TypeError` a promise is rejected with when resolved with
/// itself.
pub const SELF_RESOLUTION_MESSAGE: &str = "The promise and the return value are the same";

/// Runs the resolution procedure for `target` with `candidate`.
pub(crate) fn resolve_promise(target: &Promise, candidate: Value) {
    let mut next = Some(candidate);
    while let Some(candidate) = next.take() {
        next = resolution_step(target, candidate);
    }
}

/// One step of the procedure. Returns the next candidate when a thenable
/// resolved synchronously with another value.
fn resolution_step(target: &Promise, candidate: Value) -> Option<Value> {
    if Promise::from_value(&candidate).is_some_and(|p| p.ptr_eq(target)) {
        debug!("promise resolved with itself");
        target.reject_with(JsError::type_error(SELF_RESOLUTION_MESSAGE).into());
        return None;
    }

    if !candidate.is_object_like() {
        target.fulfill(candidate);
        return None;
    }

    let then = match candidate.get("then") {
        Ok(then) => then,
        Err(reason) => {
            debug!(%reason, "reading then failed");
            target.reject_with(reason);
            return None;
        }
    };

    match then {
        Value::Function(then) => adopt(target, candidate, then),
        _ => {
            target.fulfill(candidate);
            None
        }
    }
}

/// First-call-wins guard shared by the callbacks of one adoption attempt.
#[derive(Debug, Default)]
struct ResolutionToken {
    fired: bool,
    /// True while the thenable's `then` is still on the stack.
    in_call: bool,
    /// Candidate handed to inner-resolve while `in_call` was set.
    deferred: Option<Value>,
}

fn adopt(target: &Promise, thenable: Value, then: Function) -> Option<Value> {
    let token = Arc::new(Mutex::new(ResolutionToken {
        in_call: true,
        ..ResolutionToken::default()
    }));

    let on_resolve = {
        let token = token.clone();
        let target = target.clone();
        Function::unary(move |value| {
            let mut guard = token.lock();
            if guard.fired {
                return Ok(Value::Undefined);
            }
            guard.fired = true;
            if guard.in_call {
                guard.deferred = Some(value);
            } else {
                drop(guard);
                resolve_promise(&target, value);
            }
            Ok(Value::Undefined)
        })
    };
    let on_reject = {
        let token = token.clone();
        let target = target.clone();
        Function::unary(move |reason| {
            {
                let mut guard = token.lock();
                if guard.fired {
                    return Ok(Value::Undefined);
                }
                guard.fired = true;
            }
            target.reject_with(reason);
            Ok(Value::Undefined)
        })
    };

    trace!("adopting thenable");
    let outcome = then.call(
        &thenable,
        &[Value::Function(on_resolve), Value::Function(on_reject)],
    );

    let mut guard = token.lock();
    guard.in_call = false;
    if let Err(reason) = outcome {
        if guard.fired {
            trace!("then raised after a callback fired; ignoring");
        } else {
            guard.fired = true;
            drop(guard);
            debug!(%reason, "calling then failed");
            target.reject_with(reason);
            return None;
        }
    }
    guard.deferred.take()
}
