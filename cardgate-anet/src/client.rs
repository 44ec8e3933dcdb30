//! A [`GatewayClient`] that submits transactions to Authorize.Net.
//!
//! Every operation is one `POST` of a `createTransactionRequest` to the
//! configured endpoint. The response is decoded into a [`RawResult`] and left
//! for the core to interpret; this module never decides whether something
//! was approved.
//!
//! ## Error Handling
//!
//! - A non-2xx status, a connection failure or an unreadable body becomes a
//!   transport error
//! - A body that is not a `createTransactionResponse` becomes a malformed
//!   response error
//! - An elapsed request timeout becomes [`GatewayError::Timeout`]

use std::fmt;
use std::time::Duration;

use cardgate::client::BoxFuture;
use cardgate::{GatewayClient, GatewayError, RawResult, VendorTransaction};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

use crate::constants::{BYTE_ORDER_MARK, PRODUCTION_ENDPOINT, SANDBOX_ENDPOINT};
use crate::error::AnetError;
use crate::wire::{CreateTransactionEnvelope, CreateTransactionResponse};

const CONTEXT: &str = "POST createTransactionRequest";

/// Which Authorize.Net environment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// `apitest.authorize.net`.
    #[default]
    Sandbox,
    /// `api.authorize.net`.
    Production,
}

impl Environment {
    /// The JSON API endpoint for this environment.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_ENDPOINT,
            Self::Production => PRODUCTION_ENDPOINT,
        }
    }
}

/// Merchant credentials and connection settings.
#[serde_as]
#[derive(Clone, Deserialize)]
pub struct AnetConfig {
    /// API login id.
    pub api_login_id: String,
    /// Transaction key.
    pub transaction_key: SecretString,
    /// Selects the default endpoint.
    #[serde(default)]
    pub environment: Environment,
    /// Overrides the environment's endpoint.
    #[serde(default)]
    pub endpoint: Option<Url>,
    /// Per-request HTTP timeout.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(rename = "timeout_secs")]
    pub timeout: Option<Duration>,
}

impl fmt::Debug for AnetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnetConfig")
            .field("api_login_id", &self.api_login_id)
            .field("transaction_key", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnetConfig {
    /// Sandbox credentials with no timeout and the default endpoint.
    pub fn new(api_login_id: impl Into<String>, transaction_key: impl Into<String>) -> Self {
        Self {
            api_login_id: api_login_id.into(),
            transaction_key: SecretString::new(transaction_key.into()),
            environment: Environment::default(),
            endpoint: None,
            timeout: None,
        }
    }

    /// Selects the environment.
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sends requests to `endpoint` instead of the environment default.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets a timeout for every request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Authorize.Net JSON API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct AnetClient {
    client: Client,
    endpoint: Url,
    api_login_id: String,
    transaction_key: SecretString,
    timeout: Option<Duration>,
}

impl fmt::Debug for AnetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnetClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_login_id", &self.api_login_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AnetClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AnetError`] if a credential is empty, the endpoint does not
    /// parse or the HTTP client cannot be built.
    pub fn try_new(config: AnetConfig) -> Result<Self, AnetError> {
        if config.api_login_id.trim().is_empty() {
            return Err(AnetError::MissingCredential("api_login_id"));
        }
        if config.transaction_key.expose_secret().trim().is_empty() {
            return Err(AnetError::MissingCredential("transaction_key"));
        }
        let endpoint = match config.endpoint {
            Some(endpoint) => endpoint,
            None => Url::parse(config.environment.endpoint()).map_err(|e| {
                AnetError::UrlParse {
                    context: "Failed to parse environment endpoint",
                    source: e,
                }
            })?,
        };
        let client = Client::builder().build().map_err(|e| AnetError::Http {
            context: "Failed to build HTTP client",
            source: e,
        })?;
        Ok(Self {
            client,
            endpoint,
            api_login_id: config.api_login_id,
            transaction_key: config.transaction_key,
            timeout: config.timeout,
        })
    }

    /// The endpoint every transaction is posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Posts `transaction` and decodes the processor's answer.
    ///
    /// # Errors
    ///
    /// Returns [`AnetError`] on any transport or decoding failure. Declines
    /// are not errors.
    pub async fn create_transaction(
        &self,
        transaction: &VendorTransaction,
    ) -> Result<RawResult, AnetError> {
        let body = CreateTransactionEnvelope::new(
            &self.api_login_id,
            self.transaction_key.expose_secret(),
            transaction,
        );

        let mut req = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let result = self.send(req).await;
        record_result_on_span(&result);
        result
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<RawResult, AnetError> {
        let http_response = req.send().await.map_err(|e| self.http_error(e))?;

        let status = http_response.status();
        let text = http_response.text().await.map_err(|e| match self.timeout {
            Some(limit) if e.is_timeout() => AnetError::Timeout(limit),
            _ => AnetError::ResponseBodyRead {
                context: CONTEXT,
                source: e,
            },
        })?;

        if !status.is_success() {
            return Err(AnetError::HttpStatus {
                context: CONTEXT,
                status,
                body: text,
            });
        }

        let body = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&text);
        let response: CreateTransactionResponse =
            serde_json::from_str(body).map_err(|e| AnetError::JsonDeserialization {
                context: CONTEXT,
                source: e,
            })?;
        Ok(response.into())
    }

    fn http_error(&self, source: reqwest::Error) -> AnetError {
        match self.timeout {
            Some(limit) if source.is_timeout() => AnetError::Timeout(limit),
            _ => AnetError::Http {
                context: CONTEXT,
                source,
            },
        }
    }
}

impl GatewayClient for AnetClient {
    fn submit<'a>(
        &'a self,
        transaction: &'a VendorTransaction,
    ) -> BoxFuture<'a, Result<RawResult, GatewayError>> {
        let fut = async move {
            self.create_transaction(transaction)
                .await
                .map_err(GatewayError::from)
        };
        #[cfg(feature = "telemetry")]
        let fut = fut.instrument(tracing::info_span!(
            "cardgate.anet.submit",
            operation = %transaction.kind,
            endpoint = %self.endpoint,
            timeout = ?self.timeout,
            otel.status_code = tracing::field::Empty,
            error.message = tracing::field::Empty,
        ));
        Box::pin(fut)
    }
}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<E: fmt::Display>(result: &Result<RawResult, E>) {
    let span = Span::current();
    match result {
        Ok(raw) => {
            span.record("otel.status_code", "OK");
            tracing::debug!(
                result_code = ?raw.result_code,
                response_code = raw.response_code.as_deref(),
                "Processor answered"
            );
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to processor failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<E: fmt::Display>(_result: &Result<RawResult, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use cardgate::OperationKind;
    use cardgate::transaction::CardInstrument;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_PATH: &str = "/xml/v1/request.api";

    async fn client_for(server: &MockServer) -> AnetClient {
        let endpoint = format!("{}{API_PATH}", server.uri()).parse::<Url>().unwrap();
        AnetClient::try_new(
            AnetConfig::new("login", "key")
                .with_endpoint(endpoint)
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap()
    }

    fn void(id: &str) -> VendorTransaction {
        VendorTransaction {
            kind: OperationKind::Void,
            amount: None,
            instrument: None,
            reference_id: Some(id.into()),
            order: None,
        }
    }

    fn approved_body() -> serde_json::Value {
        json!({
            "transactionResponse": {
                "responseCode": "1",
                "authCode": "ABC123",
                "transId": "60123",
                "messages": [{ "code": "1", "description": "This transaction has been approved." }]
            },
            "messages": {
                "resultCode": "Ok",
                "message": [{ "code": "I00001", "text": "Successful." }]
            }
        })
    }

    #[tokio::test]
    async fn test_approved_transaction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(approved_body()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server).await.create_transaction(&void("60123")).await.unwrap();
        assert!(raw.is_approved());
        assert_eq!(raw.transaction_id.as_deref(), Some("60123"));
    }

    #[tokio::test]
    async fn test_decline_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transactionResponse": {
                    "responseCode": "2",
                    "transId": "0",
                    "errors": [{ "errorCode": "2", "errorText": "This transaction has been declined." }]
                },
                "messages": {
                    "resultCode": "Error",
                    "message": [{ "code": "E00027", "text": "The transaction was unsuccessful." }]
                }
            })))
            .mount(&server)
            .await;

        let raw = client_for(&server).await.create_transaction(&void("60123")).await.unwrap();
        assert!(!raw.is_approved());
        assert_eq!(raw.errors[0].text, "This transaction has been declined.");
    }

    #[tokio::test]
    async fn test_authentication_failure_has_no_transaction_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": {
                    "resultCode": "Error",
                    "message": [{
                        "code": "E00007",
                        "text": "User authentication failed due to invalid authentication values."
                    }]
                }
            })))
            .mount(&server)
            .await;

        let raw = client_for(&server).await.create_transaction(&void("60123")).await.unwrap();
        assert!(raw.errors.is_empty());
        assert_eq!(raw.messages[0].code, "E00007");
        assert_eq!(raw.response_code, None);
    }

    #[tokio::test]
    async fn test_byte_order_mark_is_stripped() {
        let server = MockServer::start().await;
        let body = format!("\u{feff}{}", approved_body());
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let raw = client_for(&server).await.create_transaction(&void("60123")).await.unwrap();
        assert!(raw.is_approved());
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.create_transaction(&void("60123")).await.unwrap_err();
        assert!(matches!(err, AnetError::HttpStatus { status, .. } if status.as_u16() == 503));

        let err = client.submit(&void("60123")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.submit(&void("60123")).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_processor_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(approved_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.submit(&void("60123")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(limit) if limit == Duration::from_millis(500)));
    }

    #[tokio::test]
    async fn test_refund_body_sends_placeholder_card() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "createTransactionRequest": {
                    "merchantAuthentication": { "name": "login", "transactionKey": "key" },
                    "transactionRequest": {
                        "transactionType": "refundTransaction",
                        "amount": "5.00",
                        "payment": {
                            "creditCard": {
                                "cardNumber": "XXXXXXXXXXXX1111",
                                "expirationDate": "XXXX"
                            }
                        },
                        "refTransId": "60123"
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(approved_body()))
            .expect(1)
            .mount(&server)
            .await;

        let refund = VendorTransaction {
            kind: OperationKind::Refund,
            amount: Some(Decimal::new(500, 2)),
            instrument: Some(CardInstrument {
                number: "XXXXXXXXXXXX1111".into(),
                expiration: "XXXX".into(),
                security_code: None,
            }),
            reference_id: Some("60123".into()),
            order: None,
        };
        let raw = client_for(&server).await.submit(&refund).await.unwrap();
        assert!(raw.is_approved());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let err = AnetClient::try_new(AnetConfig::new("login", "  ")).unwrap_err();
        assert!(matches!(err, AnetError::MissingCredential("transaction_key")));
        let err = AnetClient::try_new(AnetConfig::new("", "key")).unwrap_err();
        assert!(matches!(err, AnetError::MissingCredential("api_login_id")));
    }

    #[test]
    fn test_environment_endpoints() {
        let client = AnetClient::try_new(AnetConfig::new("login", "key")).unwrap();
        assert_eq!(client.endpoint().as_str(), SANDBOX_ENDPOINT);
        let client = AnetClient::try_new(
            AnetConfig::new("login", "key").with_environment(Environment::Production),
        )
        .unwrap();
        assert_eq!(client.endpoint().as_str(), PRODUCTION_ENDPOINT);
    }

    #[test]
    fn test_debug_hides_transaction_key() {
        let config = AnetConfig::new("login", "s3cr3t");
        assert!(!format!("{config:?}").contains("s3cr3t"));
        let client = AnetClient::try_new(config).unwrap();
        assert!(!format!("{client:?}").contains("s3cr3t"));
    }
}
