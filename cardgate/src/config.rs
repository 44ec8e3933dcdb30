//! Settings shared by every operation.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use cardgate::config::GatewaySettings;
//!
//! let settings = GatewaySettings::default().with_submit_timeout(Some(Duration::from_secs(10)));
//! assert_eq!(settings.amount_ceiling.to_string(), "1000000");
//! ```

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::amount::DEFAULT_AMOUNT_CEILING;

/// Default time allowed for a single processor submission.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Limits applied by the validator and the orchestrator.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Largest amount accepted for any operation.
    pub amount_ceiling: Decimal,

    /// Upper bound on one processor call. `None` waits indefinitely; the
    /// caller can still cancel by dropping the operation future.
    #[serde_as(as = "Option<DurationSeconds<u64>>", no_default)]
    #[serde(rename = "submit_timeout_secs")]
    pub submit_timeout: Option<Duration>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            amount_ceiling: DEFAULT_AMOUNT_CEILING,
            submit_timeout: Some(DEFAULT_SUBMIT_TIMEOUT),
        }
    }
}

impl GatewaySettings {
    /// Sets the amount ceiling.
    #[must_use]
    pub const fn with_amount_ceiling(mut self, ceiling: Decimal) -> Self {
        self.amount_ceiling = ceiling;
        self
    }

    /// Sets the submit timeout.
    #[must_use]
    pub const fn with_submit_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.submit_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: GatewaySettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, GatewaySettings::default());
    }

    #[test]
    fn test_timeout_in_seconds() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"submit_timeout_secs": 5, "amount_ceiling": "500"}"#)
                .unwrap();
        assert_eq!(settings.submit_timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.amount_ceiling, Decimal::new(500, 0));
    }
}
