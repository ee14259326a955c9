//! Core value types and error handling for the promise runtime.
//!
//! This crate provides the dynamic values that promises are settled with,
//! the callable and host-object abstractions used to recognise thenables,
//! and the error object the runtime raises.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of settlement values
//! - [`Function`] - Shared callable returning a [`Completion`]
//! - [`HostObject`] - Member access for foreign objects
//! - [`JsError`] - Error object with an [`ErrorKind`]
//!
//! # Examples
//!
//! ```
//! use core_types::{Completion, Function, JsError, Value};
//!
//! let fail = Function::new(|_| Err(Value::from(JsError::type_error("bad input"))));
//! let outcome: Completion = fail.call(&Value::Undefined, &[]);
//! assert!(outcome.is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod function;
mod value;

pub use error::{Completion, ErrorKind, JsError};
pub use function::Function;
pub use value::{HostObject, Value};
