//! Response bodies returned by the operation routes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::transaction::OperationKind;
use crate::validate::FieldErrors;

/// Outer message for every transport failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Title of a field-level validation body.
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// `{ "success": true, "<idField>": "<id>" }`, where the id field depends on
/// the operation (`transactionId`, `refundId` or `voidId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuccessBody(Map<String, Value>);

impl SuccessBody {
    /// Builds the body for a successful operation of `kind`.
    #[must_use]
    pub fn new(kind: OperationKind, transaction_id: impl Into<String>) -> Self {
        let mut map = Map::with_capacity(2);
        map.insert("success".to_owned(), Value::Bool(true));
        map.insert(
            kind.profile().id_field.to_owned(),
            Value::String(transaction_id.into()),
        );
        Self(map)
    }

    /// The processor-assigned id, whatever its field name.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() != "success")
            .and_then(|(_, v)| v.as_str())
    }
}

/// `{ "error": ..., "details": ... }`. `details` is only present for
/// transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Decline reason, rejection message or [`INTERNAL_ERROR_MESSAGE`].
    pub error: String,
    /// Transport failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// A 400-style body with a single message.
    #[must_use]
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// A 500-style body carrying the failure detail.
    #[must_use]
    pub fn internal(details: impl Into<String>) -> Self {
        Self {
            error: INTERNAL_ERROR_MESSAGE.to_owned(),
            details: Some(details.into()),
        }
    }
}

/// Field-level validation failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorBody {
    /// Always [`VALIDATION_TITLE`].
    pub title: String,
    /// Always 400.
    pub status: u16,
    /// Messages keyed by field name.
    pub errors: FieldErrors,
}

impl FieldErrorBody {
    /// Wraps `errors` with the fixed title and status.
    #[must_use]
    pub fn new(errors: FieldErrors) -> Self {
        Self {
            title: VALIDATION_TITLE.to_owned(),
            status: 400,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_body_id_field_per_kind() {
        assert_eq!(
            serde_json::to_value(SuccessBody::new(OperationKind::Authorize, "60123")).unwrap(),
            json!({"success": true, "transactionId": "60123"})
        );
        assert_eq!(
            serde_json::to_value(SuccessBody::new(OperationKind::Refund, "70001")).unwrap(),
            json!({"success": true, "refundId": "70001"})
        );
        assert_eq!(
            serde_json::to_value(SuccessBody::new(OperationKind::Void, "80001")).unwrap(),
            json!({"success": true, "voidId": "80001"})
        );
        assert_eq!(SuccessBody::new(OperationKind::Void, "80001").id(), Some("80001"));
    }

    #[test]
    fn test_error_body_shapes() {
        assert_eq!(
            serde_json::to_value(ErrorBody::message("Card declined")).unwrap(),
            json!({"error": "Card declined"})
        );
        assert_eq!(
            serde_json::to_value(ErrorBody::internal("timed out")).unwrap(),
            json!({"error": "Internal server error.", "details": "timed out"})
        );
    }
}
