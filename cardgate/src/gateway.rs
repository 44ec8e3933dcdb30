//! The five operation entry points.
//!
//! Each operation runs the same pipeline:
//!
//! ```text
//! validate -> map -> GatewayClient::submit -> normalize
//! ```
//!
//! Validation failures come back as `Err(RequestRejection)`. Everything that
//! happens after validation, including client panics and timeouts, comes back
//! as `Ok(OperationOutcome)`, so nothing escapes to the transport layer as an
//! unhandled fault.
//!
//! # Example
//!
//! ```ignore
//! use cardgate::{Gateway, GatewaySettings};
//! use cardgate_anet::{AnetClient, AnetConfig};
//!
//! let gateway = Gateway::new(AnetClient::try_new(config)?, GatewaySettings::default());
//! let outcome = gateway.void(VoidRequest { transaction_id: Some("60123".into()) }).await?;
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future;

use crate::client::{GatewayClient, RawResult};
use crate::config::GatewaySettings;
use crate::error::{GatewayError, RequestRejection};
use crate::normalize::{OperationOutcome, normalize};
use crate::proto::{
    AuthorizeRequest, CaptureRequest, ChargeRequest, OperationRequest, RefundRequest, VoidRequest,
};
use crate::transaction::{VendorTransaction, map};
use crate::validate::validate;

/// Orchestrates payment operations against one processor client.
///
/// Holds no per-request state; a single instance can serve any number of
/// concurrent operations.
#[derive(Clone)]
pub struct Gateway {
    client: Arc<dyn GatewayClient>,
    settings: GatewaySettings,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Creates a gateway around `client`.
    pub fn new(client: impl GatewayClient + 'static, settings: GatewaySettings) -> Self {
        Self {
            client: Arc::new(client),
            settings,
        }
    }

    /// Creates a gateway around an already shared client.
    #[must_use]
    pub fn with_shared_client(client: Arc<dyn GatewayClient>, settings: GatewaySettings) -> Self {
        Self { client, settings }
    }

    /// The settings this gateway was built with.
    #[must_use]
    pub const fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Reserves funds without capturing them.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRejection`] if the request fails validation.
    pub async fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> Result<OperationOutcome, RequestRejection> {
        self.execute(OperationRequest::Authorize(request)).await
    }

    /// Authorizes and captures in one step. Only card and amount reach the
    /// processor.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRejection`] if the request fails validation.
    pub async fn charge(
        &self,
        request: ChargeRequest,
    ) -> Result<OperationOutcome, RequestRejection> {
        self.execute(OperationRequest::Charge(request)).await
    }

    /// Captures a prior authorization, in full when no amount is given.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRejection`] if the request fails validation.
    pub async fn capture(
        &self,
        request: CaptureRequest,
    ) -> Result<OperationOutcome, RequestRejection> {
        self.execute(OperationRequest::Capture(request)).await
    }

    /// Refunds a settled transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRejection`] if the request fails validation.
    pub async fn refund(
        &self,
        request: RefundRequest,
    ) -> Result<OperationOutcome, RequestRejection> {
        self.execute(OperationRequest::Refund(request)).await
    }

    /// Voids an unsettled transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRejection`] if the request fails validation.
    pub async fn void(&self, request: VoidRequest) -> Result<OperationOutcome, RequestRejection> {
        self.execute(OperationRequest::Void(request)).await
    }

    /// Runs the full pipeline for any operation.
    ///
    /// Dropping the returned future abandons the processor call.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRejection`] if the request fails validation.
    pub async fn execute(
        &self,
        request: OperationRequest,
    ) -> Result<OperationOutcome, RequestRejection> {
        let kind = request.kind();

        #[cfg(feature = "telemetry")]
        tracing::info!(operation = %kind, request = ?request, "Received payment request");

        let validated = match validate(&request, self.settings.amount_ceiling) {
            Ok(validated) => validated,
            Err(rejection) => {
                #[cfg(feature = "telemetry")]
                match &rejection {
                    RequestRejection::Fields(fields) => {
                        tracing::warn!(operation = %kind, ?fields, "Request failed field validation");
                    }
                    RequestRejection::Invalid(err) => {
                        tracing::warn!(operation = %kind, field = err.field, error = %err, "Validation error");
                    }
                }
                return Err(rejection);
            }
        };

        let transaction = map(&validated);
        let outcome = normalize(kind, self.submit(&transaction).await);

        #[cfg(feature = "telemetry")]
        match &outcome {
            OperationOutcome::Success { transaction_id } => {
                tracing::info!(operation = %kind, %transaction_id, "Operation approved");
            }
            OperationOutcome::Declined { reason } => {
                tracing::warn!(
                    operation = %kind,
                    reference_id = transaction.reference_id.as_deref(),
                    %reason,
                    "Operation declined"
                );
            }
            OperationOutcome::TransportFailure { detail } => {
                tracing::error!(operation = %kind, %detail, "Processor call failed");
            }
        }

        Ok(outcome)
    }

    /// One attempt, bounded by the configured timeout, with client panics
    /// turned into [`GatewayError::Aborted`].
    ///
    /// The client's future is built inside the first poll so a panic raised
    /// before it is returned unwinds into the same `catch_unwind`.
    async fn submit(&self, transaction: &VendorTransaction) -> Result<RawResult, GatewayError> {
        let call = future::lazy(|_| self.client.submit(transaction)).flatten();
        let call = AssertUnwindSafe(call).catch_unwind();
        let joined = match self.settings.submit_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout(limit))?,
            None => call.await,
        };
        joined.unwrap_or_else(|panic| Err(GatewayError::Aborted(panic_message(panic.as_ref()))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "client panicked".to_owned())
}
