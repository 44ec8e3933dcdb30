//! Processor client contract.
//!
//! The core never speaks a processor's wire protocol. It hands a
//! [`VendorTransaction`] to a [`GatewayClient`] and receives a [`RawResult`]
//! or a [`GatewayError`]. Implementations live in separate crates (see
//! `cardgate-anet`).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::transaction::VendorTransaction;

/// Boxed, sendable future returned by object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-transaction response code meaning "approved".
pub const APPROVED_RESPONSE_CODE: &str = "1";

/// Per-transaction response code meaning "declined".
pub const DECLINED_RESPONSE_CODE: &str = "2";

/// Submits vendor-neutral transactions to a card processor.
///
/// Implementations hold their own credentials, fixed at construction. The
/// returned future is the only suspend point of an operation; dropping it
/// must abandon the call.
pub trait GatewayClient: Send + Sync {
    /// Submits one transaction.
    fn submit<'a>(
        &'a self,
        transaction: &'a VendorTransaction,
    ) -> BoxFuture<'a, Result<RawResult, GatewayError>>;
}

impl<T: GatewayClient + ?Sized> GatewayClient for Arc<T> {
    fn submit<'a>(
        &'a self,
        transaction: &'a VendorTransaction,
    ) -> BoxFuture<'a, Result<RawResult, GatewayError>> {
        (**self).submit(transaction)
    }
}

impl<T: GatewayClient + ?Sized> GatewayClient for Box<T> {
    fn submit<'a>(
        &'a self,
        transaction: &'a VendorTransaction,
    ) -> BoxFuture<'a, Result<RawResult, GatewayError>> {
        (**self).submit(transaction)
    }
}

/// Overall outcome of the processor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    /// The processor accepted the request.
    Ok,
    /// The processor refused the request or the transaction.
    Error,
}

/// A transaction-level error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Processor error code.
    pub code: String,
    /// Human-readable error text.
    pub text: String,
}

/// A general (request-level) message entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    /// Processor message code.
    pub code: String,
    /// Human-readable message text.
    pub text: String,
}

/// What the processor said, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    /// Overall result of the call.
    pub result_code: ResultCode,
    /// Per-transaction response code; [`APPROVED_RESPONSE_CODE`] on approval.
    pub response_code: Option<String>,
    /// Processor-assigned transaction id, when one was issued.
    pub transaction_id: Option<String>,
    /// Transaction-level errors, in processor order.
    pub errors: Vec<ErrorEntry>,
    /// General messages, in processor order.
    pub messages: Vec<MessageEntry>,
}

impl RawResult {
    /// An approved result carrying `transaction_id`.
    #[must_use]
    pub fn approved(transaction_id: impl Into<String>) -> Self {
        Self {
            result_code: ResultCode::Ok,
            response_code: Some(APPROVED_RESPONSE_CODE.to_owned()),
            transaction_id: Some(transaction_id.into()),
            errors: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// A declined result with one transaction-level error.
    #[must_use]
    pub fn declined(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            result_code: ResultCode::Error,
            response_code: Some(DECLINED_RESPONSE_CODE.to_owned()),
            transaction_id: None,
            errors: vec![ErrorEntry {
                code: code.into(),
                text: text.into(),
            }],
            messages: Vec::new(),
        }
    }

    /// Whether both the overall and the per-transaction code signal approval.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.result_code == ResultCode::Ok
            && self.response_code.as_deref() == Some(APPROVED_RESPONSE_CODE)
    }
}
