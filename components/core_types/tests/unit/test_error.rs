//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, Value};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_display_names() {
        assert_eq!(ErrorKind::Error.to_string(), "Error");
        assert_eq!(ErrorKind::TypeError.to_string(), "TypeError");
        assert_eq!(ErrorKind::RangeError.to_string(), "RangeError");
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_type_error_message() {
        let error = JsError::type_error("The promise and the return value are the same");
        assert_eq!(error.kind, ErrorKind::TypeError);
        assert_eq!(
            error.to_string(),
            "TypeError: The promise and the return value are the same"
        );
    }

    #[test]
    fn test_errors_compare_by_content() {
        assert_eq!(JsError::new("boom"), JsError::new("boom"));
        assert_ne!(JsError::new("boom"), JsError::type_error("boom"));
    }

    #[test]
    fn test_error_is_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(JsError::range_error("too deep"));
        assert_eq!(error.to_string(), "RangeError: too deep");
    }

    #[test]
    fn test_error_converts_to_value() {
        let value = Value::from(JsError::new("boom"));
        assert_eq!(value, Value::Error(JsError::new("boom")));
        assert!(value.is_object_like());
        assert_eq!(value.to_string(), "Error: boom");
    }
}
