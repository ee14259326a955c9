//! Callable values.

use crate::{Completion, Value};
use std::fmt;
use std::sync::Arc;

type NativeFn = dyn Fn(&Value, &[Value]) -> Completion + Send + Sync;

/// A callable value.
///
/// Calling a function either produces a value or raises a reason; both come
/// back as a [`Completion`]. Clones share the same callable, and two
/// functions are equal only when they are the same callable.
///
/// # Examples
///
/// ```
/// use core_types::{Function, Value};
///
/// let double = Function::unary(|v| Ok(Value::from(v.as_number().unwrap_or(0.0) * 2.0)));
/// assert_eq!(double.call(&Value::Undefined, &[Value::from(21)]), Ok(Value::from(42)));
/// ```
#[derive(Clone)]
pub struct Function {
    callback: Arc<NativeFn>,
}

impl Function {
    /// Creates a function that ignores its receiver.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Completion + Send + Sync + 'static,
    {
        Self::method(move |_this, args| f(args))
    }

    /// Creates a function that receives `this` as its first parameter.
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Completion + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(f),
        }
    }

    /// Creates a function of one argument. A missing argument reads as
    /// `Undefined`.
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Value) -> Completion + Send + Sync + 'static,
    {
        Self::new(move |args| f(args.first().cloned().unwrap_or_default()))
    }

    /// Calls the function with the given receiver and arguments.
    pub fn call(&self, this: &Value, args: &[Value]) -> Completion {
        (self.callback)(this, args)
    }

    /// Returns whether both handles refer to the same callable.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function {{ ... }}")
    }
}
