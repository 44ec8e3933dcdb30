//! Axum route handlers for the payment operations.
//!
//! Each handler decodes its body, runs the matching [`Gateway`] operation and
//! turns the outcome into a response. Success bodies name the id after the
//! operation: `transactionId` for authorize, capture and charge, `refundId`
//! for refund, `voidId` for void.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use cardgate::proto::{
    AuthorizeRequest, CaptureRequest, ChargeRequest, RefundRequest, SuccessBody, VoidRequest,
};
use cardgate::{Gateway, OperationKind, OperationOutcome, RequestRejection};

use crate::error::ApiError;

/// Shared application state.
pub type GatewayState = Arc<Gateway>;

type ApiResult = Result<Json<SuccessBody>, ApiError>;

/// `POST /api/authorize`
///
/// # Errors
///
/// Returns 400 on validation failure or decline, 500 on transport failure.
pub async fn post_authorize(
    State(gateway): State<GatewayState>,
    body: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    respond(OperationKind::Authorize, gateway.authorize(request).await)
}

/// `POST /api/capture`
///
/// # Errors
///
/// Returns 400 on validation failure or decline, 500 on transport failure.
pub async fn post_capture(
    State(gateway): State<GatewayState>,
    body: Result<Json<CaptureRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    respond(OperationKind::Capture, gateway.capture(request).await)
}

/// `POST /api/charge`
///
/// # Errors
///
/// Returns 400 on validation failure or decline, 500 on transport failure.
pub async fn post_charge(
    State(gateway): State<GatewayState>,
    body: Result<Json<ChargeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    respond(OperationKind::Charge, gateway.charge(request).await)
}

/// `POST /api/refund`
///
/// # Errors
///
/// Returns 400 on validation failure or decline, 500 on transport failure.
pub async fn post_refund(
    State(gateway): State<GatewayState>,
    body: Result<Json<RefundRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    respond(OperationKind::Refund, gateway.refund(request).await)
}

/// `POST /api/void`
///
/// # Errors
///
/// Returns 400 on validation failure or decline, 500 on transport failure.
pub async fn post_void(
    State(gateway): State<GatewayState>,
    body: Result<Json<VoidRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    respond(OperationKind::Void, gateway.void(request).await)
}

fn respond(kind: OperationKind, result: Result<OperationOutcome, RequestRejection>) -> ApiResult {
    match result? {
        OperationOutcome::Success { transaction_id } => {
            Ok(Json(SuccessBody::new(kind, transaction_id)))
        }
        OperationOutcome::Declined { reason } => Err(ApiError::Declined(reason)),
        OperationOutcome::TransportFailure { detail } => Err(ApiError::Transport(detail)),
    }
}

/// Creates an Axum [`axum::Router`] with all payment endpoints.
///
/// Endpoints:
/// - `POST /api/authorize`
/// - `POST /api/capture`
/// - `POST /api/charge`
/// - `POST /api/refund`
/// - `POST /api/void`
pub fn gateway_router(state: GatewayState) -> axum::Router {
    axum::Router::new()
        .route("/api/authorize", axum::routing::post(post_authorize))
        .route("/api/capture", axum::routing::post(post_capture))
        .route("/api/charge", axum::routing::post(post_charge))
        .route("/api/refund", axum::routing::post(post_refund))
        .route("/api/void", axum::routing::post(post_void))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use cardgate::client::BoxFuture;
    use cardgate::{GatewayClient, GatewayError, GatewaySettings, RawResult, VendorTransaction};
    use http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    enum Reply {
        Approve,
        Decline,
        Timeout,
    }

    struct StubClient(Reply);

    impl GatewayClient for StubClient {
        fn submit<'a>(
            &'a self,
            _transaction: &'a VendorTransaction,
        ) -> BoxFuture<'a, Result<RawResult, GatewayError>> {
            Box::pin(async move {
                match self.0 {
                    Reply::Approve => Ok(RawResult::approved("60123")),
                    Reply::Decline => Ok(RawResult::declined("2", "This transaction has been declined.")),
                    Reply::Timeout => Err(GatewayError::Timeout(Duration::from_secs(30))),
                }
            })
        }
    }

    fn router(reply: Reply) -> axum::Router {
        gateway_router(Arc::new(Gateway::new(
            StubClient(reply),
            GatewaySettings::default(),
        )))
    }

    async fn post(router: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn authorize_body() -> String {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "address": "1 Analytical Way",
            "city": "London",
            "state": "LDN",
            "zip": "N1",
            "country": "UK",
            "cardNumber": "4111111111111111",
            "expiration": "07/2026",
            "cvv": "123",
            "amount": 19.99
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_authorize_success() {
        let (status, body) = post(router(Reply::Approve), "/api/authorize", &authorize_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "transactionId": "60123" }));
    }

    #[tokio::test]
    async fn test_decline_is_400_with_reason() {
        let (status, body) = post(router(Reply::Decline), "/api/charge", &authorize_body()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "This transaction has been declined." }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_500_with_details() {
        let (status, body) = post(router(Reply::Timeout), "/api/authorize", &authorize_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error.");
        assert!(body["details"].as_str().unwrap().contains("did not respond"));
    }

    #[tokio::test]
    async fn test_field_errors_are_keyed_by_field() {
        let (status, body) = post(
            router(Reply::Approve),
            "/api/authorize",
            r#"{"cardNumber":"4111","cvv":"1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        let errors = body["errors"].as_object().unwrap();
        assert!(errors.contains_key("cardNumber"));
        assert!(errors.contains_key("cvv"));
        assert!(errors.contains_key("firstName"));
        assert!(!body.to_string().contains("4111"));
    }

    #[tokio::test]
    async fn test_refund_and_void_id_fields() {
        let (status, body) = post(
            router(Reply::Approve),
            "/api/refund",
            r#"{"transactionId":"60123","cardNumberLast4":"1111","amount":5}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "refundId": "60123" }));

        let (status, body) =
            post(router(Reply::Approve), "/api/void", r#"{"transactionId":"60123"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "voidId": "60123" }));
    }

    #[tokio::test]
    async fn test_capture_without_amount() {
        let (status, body) =
            post(router(Reply::Approve), "/api/capture", r#"{"transactionId":"60123"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactionId"], "60123");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = post(router(Reply::Approve), "/api/void", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
