//! Error types for the Authorize.Net client.

use std::time::Duration;

use cardgate::GatewayError;
use reqwest::StatusCode;

/// Errors raised while building the client or talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum AnetError {
    /// A required credential is empty.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Unexpected HTTP status code.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },

    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<AnetError> for GatewayError {
    fn from(err: AnetError) -> Self {
        match err {
            AnetError::Timeout(limit) => Self::Timeout(limit),
            AnetError::JsonDeserialization { .. } => Self::MalformedResponse(err.to_string()),
            AnetError::MissingCredential(_)
            | AnetError::UrlParse { .. }
            | AnetError::Http { .. }
            | AnetError::HttpStatus { .. }
            | AnetError::ResponseBodyRead { .. } => Self::transport("Authorize.Net", err),
        }
    }
}
