//! Dynamic value representation carried by promises.
//!
//! This module provides the `Value` enum that every promise settles with, and
//! the `HostObject` trait through which foreign objects expose their members.

use crate::{Completion, Function, JsError};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An object owned by the host with its own property access.
///
/// Promises decide whether a value is a thenable by reading its `then` member
/// through this trait: a host object is a thenable exactly when `get("then")`
/// yields a [`Value::Function`]. A failing read is reported as `Err(reason)`.
///
/// # Examples
///
/// ```
/// use core_types::{Completion, HostObject, Value};
/// use std::any::Any;
///
/// #[derive(Debug)]
/// struct Point;
///
/// impl HostObject for Point {
///     fn get(&self, key: &str) -> Completion {
///         match key {
///             "x" => Ok(Value::from(1)),
///             _ => Ok(Value::Undefined),
///         }
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let point = Value::object(Point);
/// assert_eq!(point.get("x"), Ok(Value::from(1)));
/// assert_eq!(point.get("then"), Ok(Value::Undefined));
/// ```
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    /// Reads a named member. Absent members read as `Undefined`.
    fn get(&self, key: &str) -> Completion;

    /// Returns `self` for downcasting to the concrete host type.
    fn as_any(&self) -> &dyn Any;
}

/// Represents any value a promise can be settled with.
///
/// Primitive values are stored inline. `Record` is a plain data object
/// compared structurally, while `Object` refers to a host object and is
/// compared by identity.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::from(42);
///
/// assert_eq!(undefined.type_of(), "undefined");
/// assert_eq!(number.type_of(), "number");
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// The undefined value
    #[default]
    Undefined,
    /// The null value
    Null,
    /// A boolean
    Boolean(bool),
    /// IEEE 754 double-precision number
    Number(f64),
    /// A string
    String(String),
    /// An ordered sequence of values
    Array(Vec<Value>),
    /// A plain data object with named fields
    Record(BTreeMap<String, Value>),
    /// An error object
    Error(JsError),
    /// A callable value
    Function(Function),
    /// A host object, compared by identity
    Object(Arc<dyn HostObject>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Value::Function(_) => write!(f, "Function(...)"),
            Value::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Wraps a host object.
    pub fn object<T: HostObject>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Builds a `Record` from field pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let record = Value::record([("status", Value::from("fulfilled"))]);
    /// assert_eq!(record.get("status"), Ok(Value::from("fulfilled")));
    /// ```
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns whether members can be read from this value.
    ///
    /// Only object-like values can be thenables; everything else settles a
    /// promise directly.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Array(_)
                | Value::Record(_)
                | Value::Error(_)
                | Value::Function(_)
                | Value::Object(_)
        )
    }

    /// Reads a named member.
    ///
    /// Records look up their fields, host objects delegate to
    /// [`HostObject::get`] (which may fail), and every other value has no
    /// members.
    pub fn get(&self, key: &str) -> Completion {
        match self {
            Value::Record(fields) => Ok(fields.get(key).cloned().unwrap_or_default()),
            Value::Object(obj) => obj.get(key),
            _ => Ok(Value::Undefined),
        }
    }

    /// Returns the host object if this value is one.
    pub fn as_object(&self) -> Option<&Arc<dyn HostObject>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the elements if this value is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string slice if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this value is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the `typeof` name of this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Null
            | Value::Array(_)
            | Value::Record(_)
            | Value::Error(_)
            | Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued doubles display without decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Record(_) | Value::Object(_) => write!(f, "[object Object]"),
            Value::Error(e) => write!(f, "{}", e),
            Value::Function(_) => write!(f, "function () {{ [native code] }}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<JsError> for Value {
    fn from(e: JsError) -> Self {
        Value::Error(e)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}
