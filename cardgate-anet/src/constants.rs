//! Authorize.Net endpoints and protocol constants.

/// Sandbox endpoint for the JSON API.
pub const SANDBOX_ENDPOINT: &str = "https://apitest.authorize.net/xml/v1/request.api";

/// Production endpoint for the JSON API.
pub const PRODUCTION_ENDPOINT: &str = "https://api.authorize.net/xml/v1/request.api";

/// Overall result code for a request the API accepted.
pub const RESULT_CODE_OK: &str = "Ok";

/// Overall result code for a request the API refused.
pub const RESULT_CODE_ERROR: &str = "Error";

/// Per-transaction response codes.
pub mod response_code {
    /// The transaction was approved.
    pub const APPROVED: &str = cardgate::client::APPROVED_RESPONSE_CODE;
    /// The issuer declined the transaction.
    pub const DECLINED: &str = cardgate::client::DECLINED_RESPONSE_CODE;
    /// The transaction failed with a processing error.
    pub const ERROR: &str = "3";
    /// The transaction is held for fraud review.
    pub const HELD_FOR_REVIEW: &str = "4";
}

/// The only customer type this client sends.
pub const CUSTOMER_TYPE_INDIVIDUAL: &str = "individual";

/// Line-item name for the tax amount.
pub const TAX_NAME: &str = "Tax";

/// Line-item name for the duty amount.
pub const DUTY_NAME: &str = "Duty";

/// Authorize.Net prefixes some JSON bodies with a UTF-8 byte order mark.
pub const BYTE_ORDER_MARK: char = '\u{feff}';
