//! Error types for payment operations.
//!
//! Declines are not errors. They travel as
//! [`OperationOutcome::Declined`](crate::normalize::OperationOutcome::Declined).

use std::time::Duration;

use crate::validate::FieldErrors;

/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single semantic validation failure.
///
/// The message is safe to show to callers; it never contains the rejected
/// value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Wire name of the failing field.
    pub field: &'static str,
    /// Caller-facing message.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Why a request was refused before reaching the processor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestRejection {
    /// One or more fields failed their schema rule.
    #[error("One or more validation errors occurred.")]
    Fields(FieldErrors),

    /// The first semantic rule that failed.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<FieldErrors> for RequestRejection {
    fn from(errors: FieldErrors) -> Self {
        Self::Fields(errors)
    }
}

/// Failures talking to the processor. Always reported as a transport failure,
/// never as a decline.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No answer within the configured timeout.
    #[error("processor did not respond within {0:?}")]
    Timeout(Duration),

    /// Network or protocol failure.
    #[error("HTTP error: {context}: {source}")]
    Transport {
        /// Human-readable context.
        context: &'static str,
        /// The underlying error.
        #[source]
        source: BoxError,
    },

    /// The processor answered with something we cannot interpret.
    #[error("unexpected processor response: {0}")]
    MalformedResponse(String),

    /// The client panicked or was torn down mid-call.
    #[error("processor call aborted: {0}")]
    Aborted(String),
}

impl GatewayError {
    /// Wraps any error as a transport failure.
    pub fn transport(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            context,
            source: source.into(),
        }
    }
}
