//! Unit tests for the resolution procedure

use crate::support::{
    call, counted_thenable, rejecting_thenable, resolving_thenable, thenable, Harness,
    HeldThenable, Log, ThrowingGetter,
};
use core_types::{ErrorKind, Function, JsError, Value};
use parking_lot::Mutex;
use promise_runtime::{Promise, PromiseState, SELF_RESOLUTION_MESSAGE};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn assert_self_resolution_error(reason: Option<Value>) {
    match reason {
        Some(Value::Error(error)) => {
            assert_eq!(error.kind, ErrorKind::TypeError);
            assert_eq!(error.message, SELF_RESOLUTION_MESSAGE);
        }
        other => panic!("expected a TypeError, got {other:?}"),
    }
}

#[test]
fn resolving_with_itself_rejects() {
    let h = Harness::new();
    let d = Promise::deferred(&h.jobs);
    d.resolve.resolve(d.promise.clone());
    assert_self_resolution_error(d.promise.reason());
}

#[test]
fn handler_returning_its_own_derived_promise_rejects() {
    let mut h = Harness::new();
    let slot: Arc<Mutex<Option<Promise>>> = Arc::new(Mutex::new(None));
    let s = slot.clone();
    let derived = Promise::resolve(&h.jobs, 1).then(
        Some(Function::unary(move |_| {
            Ok(s.lock().clone().map(Value::from).unwrap_or_default())
        })),
        None,
    );
    *slot.lock() = Some(derived.clone());

    h.run();
    assert_self_resolution_error(derived.reason());
}

#[test]
fn non_thenable_object_fulfills_as_is() {
    let h = Harness::new();
    let record = Value::record([("answer", Value::from(42))]);
    let promise = Promise::resolve(&h.jobs, record.clone());
    assert_eq!(promise.value(), Some(record));
}

#[test]
fn non_callable_then_fulfills_with_candidate() {
    let h = Harness::new();
    let candidate = Value::record([("then", Value::from("not callable"))]);
    let promise = Promise::resolve(&h.jobs, candidate.clone());
    assert_eq!(promise.value(), Some(candidate));
}

#[test]
fn failing_then_getter_rejects() {
    let h = Harness::new();
    let promise = Promise::resolve(&h.jobs, Value::object(ThrowingGetter(Value::from("getter"))));
    assert_eq!(promise.reason(), Some(Value::from("getter")));
}

#[test]
fn then_is_read_exactly_once() {
    let h = Harness::new();
    let (candidate, reads) = counted_thenable(|resolve, _| {
        call(resolve, Value::from("done"));
        Ok(Value::Undefined)
    });
    let promise = Promise::resolve(&h.jobs, candidate);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(promise.value(), Some(Value::from("done")));
}

#[test]
fn then_is_called_with_candidate_as_receiver() {
    let h = Harness::new();
    let seen = Arc::new(Mutex::new(None));
    let s = seen.clone();
    let then = Function::method(move |this, _| {
        *s.lock() = Some(this.clone());
        Ok(Value::Undefined)
    });
    let candidate = Value::record([("then", Value::Function(then))]);

    let _promise = Promise::resolve(&h.jobs, candidate.clone());
    assert_eq!(*seen.lock(), Some(candidate));
}

#[test]
fn synchronous_thenable_fulfills_without_a_turn() {
    let h = Harness::new();
    let promise = Promise::resolve(&h.jobs, resolving_thenable(Value::from(3)));
    assert_eq!(promise.value(), Some(Value::from(3)));
}

#[test]
fn thenable_rejection_reason_is_not_unwrapped() {
    let h = Harness::new();
    let reason = resolving_thenable(Value::from("inner"));
    let promise = Promise::resolve(&h.jobs, rejecting_thenable(reason.clone()));
    assert_eq!(promise.reason(), Some(reason));
}

#[test]
fn nested_synchronous_thenables_unwrap_fully() {
    let h = Harness::new();
    let candidate = resolving_thenable(resolving_thenable(resolving_thenable(Value::from(
        "deep",
    ))));
    let promise = Promise::resolve(&h.jobs, candidate);
    assert_eq!(promise.value(), Some(Value::from("deep")));
}

#[test]
fn nested_asynchronous_thenables_unwrap_fully() {
    let mut h = Harness::new();
    let outer = HeldThenable::new();
    let middle = HeldThenable::new();
    let inner = HeldThenable::new();

    let promise = Promise::resolve(&h.jobs, outer.value());
    outer.resolve(middle.value());
    middle.resolve(inner.value());
    h.run();
    assert!(promise.is_pending());

    inner.resolve(Value::from("deep"));
    h.run();
    assert_eq!(promise.value(), Some(Value::from("deep")));
}

#[test]
fn nested_promises_unwrap_fully() {
    let mut h = Harness::new();
    let innermost = Promise::deferred(&h.jobs);
    let middle = Promise::resolve(&h.jobs, 0).then(
        Some({
            let innermost = innermost.promise.clone();
            Function::unary(move |_| Ok(innermost.clone().into()))
        }),
        None,
    );
    let outer = Promise::resolve(&h.jobs, 0).then(
        Some({
            let middle = middle.clone();
            Function::unary(move |_| Ok(middle.clone().into()))
        }),
        None,
    );

    h.run();
    assert!(outer.is_pending());

    innermost.resolve.resolve("deep");
    h.run();
    assert_eq!(outer.value(), Some(Value::from("deep")));
}

#[test]
fn first_callback_wins_when_both_are_called() {
    let h = Harness::new();
    let promise = Promise::resolve(
        &h.jobs,
        thenable(|resolve, reject| {
            call(resolve, Value::from("first"));
            call(reject, Value::from("second"));
            call(resolve, Value::from("third"));
            Ok(Value::Undefined)
        }),
    );
    assert_eq!(promise.value(), Some(Value::from("first")));
}

#[test]
fn first_rejection_wins_over_later_resolution() {
    let h = Harness::new();
    let promise = Promise::resolve(
        &h.jobs,
        thenable(|resolve, reject| {
            call(reject, Value::from("first"));
            call(resolve, Value::from("second"));
            Ok(Value::Undefined)
        }),
    );
    assert_eq!(promise.reason(), Some(Value::from("first")));
}

#[test]
fn late_callbacks_from_asynchronous_thenable_are_ignored() {
    let mut h = Harness::new();
    let held = HeldThenable::new();
    let promise = Promise::resolve(&h.jobs, held.value());

    held.reject(Value::from("first"));
    held.resolve(Value::from("second"));
    held.reject(Value::from("third"));
    h.run();
    assert_eq!(promise.reason(), Some(Value::from("first")));
}

#[test]
fn raise_after_resolve_is_ignored() {
    let h = Harness::new();
    let promise = Promise::resolve(
        &h.jobs,
        thenable(|resolve, _| {
            call(resolve, Value::from("kept"));
            Err(Value::from("ignored"))
        }),
    );
    assert_eq!(promise.value(), Some(Value::from("kept")));
}

#[test]
fn raise_after_pending_resolve_is_ignored() {
    let mut h = Harness::new();
    let inner = HeldThenable::new();
    let inner_value = inner.value();
    let promise = Promise::resolve(
        &h.jobs,
        thenable(move |resolve, _| {
            call(resolve, inner_value.clone());
            Err(Value::from("ignored"))
        }),
    );
    h.run();
    assert!(promise.is_pending());

    inner.resolve(Value::from("kept"));
    h.run();
    assert_eq!(promise.value(), Some(Value::from("kept")));
}

#[test]
fn raise_before_callbacks_rejects() {
    let h = Harness::new();
    let error = Value::from(JsError::new("then failed"));
    let raised = error.clone();
    let promise = Promise::resolve(&h.jobs, thenable(move |_, _| Err(raised.clone())));
    assert_eq!(promise.reason(), Some(error));
}

#[test]
fn handler_resolves_derived_promise_through_thenable() {
    let mut h = Harness::new();
    let log = Log::new();
    let derived = Promise::resolve(&h.jobs, 1)
        .then(
            Some(Function::unary(|_| Ok(resolving_thenable(Value::from("unwrapped"))))),
            None,
        )
        .then(Some(log.pass("next")), None);

    h.run();
    assert_eq!(log.entries(), vec!["next:unwrapped"]);
    assert_eq!(derived.state(), PromiseState::Fulfilled);
}
