//! HTTP mapping of operation results.
//!
//! | Result                      | Status | Body                              |
//! |-----------------------------|--------|-----------------------------------|
//! | field validation failure    | 400    | `{title, status, errors: {...}}`  |
//! | semantic validation failure | 400    | `{error}`                         |
//! | undecodable body            | 400    | `{error}`                         |
//! | decline                     | 400    | `{error}`                         |
//! | transport failure           | 500    | `{error, details}`                |

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cardgate::RequestRejection;
use cardgate::mask::redact_card_numbers;
use cardgate::proto::{ErrorBody, FieldErrorBody};

/// Every way a payment endpoint can fail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request failed validation.
    #[error(transparent)]
    Rejected(#[from] RequestRejection),

    /// The body was not JSON of the expected shape.
    #[error("invalid request body: {0}")]
    BadBody(#[from] JsonRejection),

    /// The processor declined the operation.
    #[error("{0}")]
    Declined(String),

    /// The processor could not be reached or answered unintelligibly.
    #[error("{0}")]
    Transport(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(RequestRejection::Fields(errors)) => {
                (StatusCode::BAD_REQUEST, Json(FieldErrorBody::new(errors))).into_response()
            }
            Self::Rejected(RequestRejection::Invalid(err)) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::message(err.message))).into_response()
            }
            // Decode errors can quote the offending value.
            Self::BadBody(rejection) => {
                let text = rejection.body_text();
                let message = redact_card_numbers(&text);
                tracing::warn!(error = %message, "Rejected request body");
                (StatusCode::BAD_REQUEST, Json(ErrorBody::message(message))).into_response()
            }
            Self::Declined(reason) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::message(reason))).into_response()
            }
            Self::Transport(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::internal(detail)),
            )
                .into_response(),
        }
    }
}
