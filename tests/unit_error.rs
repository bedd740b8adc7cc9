/// Unit tests for DiError and DiResult types

use ferrous_kernel::{DiError, DiResult};
use std::error::Error;

#[test]
fn test_error_display_not_found() {
    let error = DiError::NotFound("TestService");
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Service not found: TestService");
    assert!(display_str.contains("TestService"));
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("alloc::string::String");
    assert_eq!(error.to_string(), "Type mismatch for: alloc::string::String");
}

#[test]
fn test_error_display_depth_exceeded() {
    let error = DiError::DepthExceeded(64);
    assert_eq!(error.to_string(), "Max depth 64 exceeded");
}

#[test]
fn test_error_display_null_argument() {
    let error = DiError::NullArgument("name");
    assert_eq!(error.to_string(), "Argument cannot be null or empty: name");
}

#[test]
fn test_error_display_invalid_operation() {
    let error = DiError::InvalidOperation("more than one directive".to_string());
    assert_eq!(error.to_string(), "Invalid operation: more than one directive");
}

#[test]
fn test_error_display_activation_is_the_message() {
    let message = "Error activating Samurai: could not resolve property Z";
    let error = DiError::Activation(message.to_string());
    assert_eq!(error.to_string(), message);
    assert!(error.is_activation());
    assert!(!DiError::NotFound("x").is_activation());
}

#[test]
fn test_error_display_not_supported() {
    let error = DiError::NotSupported("modules must be named".to_string());
    assert_eq!(error.to_string(), "Not supported: modules must be named");
}

#[test]
fn test_error_is_std_error() {
    let error: Box<dyn Error> = Box::new(DiError::NotFound("Service"));
    assert!(error.source().is_none());
}

#[test]
fn test_error_clone_keeps_message() {
    let error = DiError::Activation("boom".to_string());
    let cloned = error.clone();
    assert_eq!(error.to_string(), cloned.to_string());
}

#[test]
fn test_di_result_propagates_with_question_mark() {
    fn inner() -> DiResult<u32> {
        Err(DiError::NullArgument("name"))
    }
    fn outer() -> DiResult<u32> {
        let value = inner()?;
        Ok(value + 1)
    }
    assert!(matches!(outer(), Err(DiError::NullArgument("name"))));
}
