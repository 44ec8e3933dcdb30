//! Raw processor result to outcome mapping.
//!
//! Precedence, applied in order:
//!
//! 1. Overall `Ok` and per-transaction approval code: success.
//! 2. First transaction-level error text: decline.
//! 3. First general message text: decline.
//! 4. The operation's fixed failure message: decline.
//!
//! A [`GatewayError`] is never a decline. It becomes a transport failure.

use serde::{Deserialize, Serialize};

use crate::client::RawResult;
use crate::error::GatewayError;
use crate::mask::redact_card_numbers;
use crate::transaction::OperationKind;

/// Uniform result of a payment operation. Never carries card data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The processor approved the operation.
    Success {
        /// Processor-assigned id.
        transaction_id: String,
    },
    /// The processor executed and rejected the operation.
    Declined {
        /// First processor error or message, or the operation's fallback.
        reason: String,
    },
    /// The processor could not be reached or answered unintelligibly.
    TransportFailure {
        /// Card-redacted failure description.
        detail: String,
    },
}

impl OperationOutcome {
    /// Whether the processor approved the operation.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Folds a processor result, or the failure to get one, into an outcome.
#[must_use]
pub fn normalize(kind: OperationKind, result: Result<RawResult, GatewayError>) -> OperationOutcome {
    match result {
        Ok(raw) => normalize_result(kind, raw),
        Err(err) => OperationOutcome::TransportFailure {
            detail: redact_card_numbers(&err.to_string()).into_owned(),
        },
    }
}

fn normalize_result(kind: OperationKind, raw: RawResult) -> OperationOutcome {
    if raw.is_approved() {
        return match raw.transaction_id.filter(|id| !id.trim().is_empty()) {
            Some(transaction_id) => OperationOutcome::Success { transaction_id },
            None => OperationOutcome::TransportFailure {
                detail: format!("processor approved the {kind} without a transaction id"),
            },
        };
    }

    let reason = raw
        .errors
        .into_iter()
        .map(|e| e.text)
        .next()
        .or_else(|| raw.messages.into_iter().map(|m| m.text).next())
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| kind.profile().failure_message.to_owned());

    OperationOutcome::Declined {
        reason: redact_card_numbers(&reason).into_owned(),
    }
}
