//! Errors that escape the checker.
//!
//! User mistakes are diagnostics, never errors. These types cover decorator
//! implementations failing and compiler invariant violations.

/// Failure reported by a decorator implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecoratorError {
    #[error("{0}")]
    Message(String),

    #[error("expected {expected} argument(s) but got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument {index} is invalid: {reason}")]
    InvalidArgument { index: usize, reason: String },
}

/// A fatal checking failure. The first one stops decorator execution and is
/// returned from [`Checker::check_program`](crate::Checker::check_program).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckerError {
    #[error("decorator @{name} failed: {source}")]
    Decorator {
        name: String,
        #[source]
        source: DecoratorError,
    },

    #[error("internal compiler error: {0}")]
    Internal(String),
}
