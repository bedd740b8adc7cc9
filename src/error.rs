//! Error types for the activation kernel.

use thiserror::Error;

/// Kernel errors
///
/// Represents the failure conditions raised while planning a type, activating
/// an instance or tearing it down. Every error is fatal to the current
/// activation; the kernel never retries or suppresses a partial result.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::DiError;
///
/// let not_found = DiError::NotFound("MyService");
/// let null_arg = DiError::NullArgument("name");
/// let ambiguous = DiError::InvalidOperation("more than one directive".to_string());
/// let activation = DiError::Activation("could not resolve property".to_string());
///
/// assert_eq!(null_arg.to_string(), "Argument cannot be null or empty: name");
/// println!("Error: {}", not_found);
/// println!("Error: {}", ambiguous);
/// println!("Error: {}", activation);
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No binding and no implicit self-binding for the service
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A required argument was absent or empty (names the parameter)
    #[error("Argument cannot be null or empty: {0}")]
    NullArgument(&'static str),
    /// A single-valued query found more than one candidate
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// Activation failed (ambiguous overrides, unknown property, unresolvable target)
    #[error("{0}")]
    Activation(String),
    /// The operation is intentionally not implemented by this component
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl DiError {
    /// Returns true for errors raised while activating an instance.
    pub fn is_activation(&self) -> bool {
        matches!(self, DiError::Activation(_))
    }
}

/// Result type for kernel operations
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{DiResult, DiError};
///
/// fn lookup(found: bool) -> DiResult<u32> {
///     if found { Ok(7) } else { Err(DiError::NotFound("u32")) }
/// }
///
/// assert_eq!(lookup(true).unwrap(), 7);
/// assert!(lookup(false).is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;

/// Fails with [`DiError::NullArgument`] when `value` is empty.
pub(crate) fn ensure_not_empty(value: &str, parameter: &'static str) -> DiResult<()> {
    if value.is_empty() {
        Err(DiError::NullArgument(parameter))
    } else {
        Ok(())
    }
}
