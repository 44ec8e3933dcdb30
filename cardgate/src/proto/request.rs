//! Request bodies for the operation routes.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::mask::{mask_card, mask_expiration, mask_security_code};
use crate::transaction::OperationKind;

/// Body of `POST /api/authorize` and `POST /api/charge`.
///
/// `Debug` is implemented by hand and masks the card number, expiration
/// year and security code.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizeRequest {
    /// Merchant-side customer id.
    pub customer_id: Option<String>,
    /// Customer email.
    pub email: Option<String>,
    /// Billing phone.
    pub phone: Option<String>,
    /// Billing fax.
    pub fax: Option<String>,

    /// Billing given name.
    pub first_name: Option<String>,
    /// Billing family name.
    pub last_name: Option<String>,
    /// Billing company.
    pub company: Option<String>,
    /// Billing street address.
    pub address: Option<String>,
    /// Billing city.
    pub city: Option<String>,
    /// Billing state or region.
    pub state: Option<String>,
    /// Billing postal code.
    pub zip: Option<String>,
    /// Billing country.
    pub country: Option<String>,

    /// Shipping given name.
    pub shipping_first_name: Option<String>,
    /// Shipping family name.
    pub shipping_last_name: Option<String>,
    /// Shipping company.
    pub shipping_company: Option<String>,
    /// Shipping street address.
    pub shipping_address: Option<String>,
    /// Shipping city. Any shipping field makes the shipping address present.
    pub shipping_city: Option<String>,
    /// Shipping state or region.
    pub shipping_state: Option<String>,
    /// Shipping postal code.
    pub shipping_zip: Option<String>,
    /// Shipping country.
    pub shipping_country: Option<String>,

    /// Tax amount.
    pub tax: Option<Decimal>,
    /// Duty amount.
    pub duty: Option<Decimal>,
    /// Accepted but not forwarded to the processor.
    pub freight: Option<Decimal>,
    /// Defaults to `false` when order details are sent.
    pub tax_exempt: Option<bool>,
    /// Purchase order number.
    pub po_number: Option<String>,

    /// Card number, 13 to 19 digits.
    pub card_number: Option<String>,
    /// `MM/YYYY`.
    pub expiration: Option<String>,
    /// Card security code, 3 or 4 digits.
    pub cvv: Option<String>,
    /// Amount to authorize or charge.
    pub amount: Option<Decimal>,
}

/// Charge accepts exactly the authorize body.
pub type ChargeRequest = AuthorizeRequest;

impl fmt::Debug for AuthorizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeRequest")
            .field("customer_id", &self.customer_id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("amount", &self.amount)
            .field("city", &self.city)
            .field("state", &self.state)
            .field("shipping_city", &self.shipping_city)
            .field("shipping_state", &self.shipping_state)
            .field("po_number", &self.po_number)
            .field("tax", &self.tax)
            .field("duty", &self.duty)
            .field("freight", &self.freight)
            .field("tax_exempt", &self.tax_exempt)
            .field("card_number", &mask_card(self.card_number.as_deref()))
            .field("expiration", &mask_expiration(self.expiration.as_deref()))
            .field("cvv", &mask_security_code(&self.cvv))
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/capture`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureRequest {
    /// Transaction id returned by a prior authorization.
    pub transaction_id: Option<String>,
    /// Omit to capture the full authorized amount.
    pub amount: Option<Decimal>,
}

/// Body of `POST /api/refund`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefundRequest {
    /// The settled transaction being refunded.
    pub transaction_id: Option<String>,
    /// Last four digits of the card used originally.
    pub card_number_last4: Option<String>,
    /// Amount to return. Should not exceed the original amount, which is
    /// not looked up here; the processor enforces it.
    pub amount: Option<Decimal>,
}

/// Body of `POST /api/void`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoidRequest {
    /// The unsettled transaction being voided.
    pub transaction_id: Option<String>,
}

/// A request for any of the five operations, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    /// Reserve funds.
    Authorize(AuthorizeRequest),
    /// Reserve and capture in one step.
    Charge(ChargeRequest),
    /// Capture a prior authorization.
    Capture(CaptureRequest),
    /// Return funds from a settled transaction.
    Refund(RefundRequest),
    /// Cancel an unsettled transaction.
    Void(VoidRequest),
}

impl OperationRequest {
    /// The operation this request asks for.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Authorize(_) => OperationKind::Authorize,
            Self::Charge(_) => OperationKind::Charge,
            Self::Capture(_) => OperationKind::Capture,
            Self::Refund(_) => OperationKind::Refund,
            Self::Void(_) => OperationKind::Void,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_request_camel_case_fields() {
        let req: AuthorizeRequest = serde_json::from_value(serde_json::json!({
            "cardNumber": "4111111111111111",
            "expiration": "07/2026",
            "cvv": "123",
            "amount": 10.5,
            "firstName": "Ada",
            "shippingZip": "94107",
            "poNumber": "PO-1",
            "taxExempt": true
        }))
        .unwrap();
        assert_eq!(req.card_number.as_deref(), Some("4111111111111111"));
        assert_eq!(req.amount, Some(Decimal::new(105, 1)));
        assert_eq!(req.shipping_zip.as_deref(), Some("94107"));
        assert_eq!(req.po_number.as_deref(), Some("PO-1"));
        assert_eq!(req.tax_exempt, Some(true));
        assert!(req.last_name.is_none());
    }

    #[test]
    fn test_authorize_request_debug_is_masked() {
        let req = AuthorizeRequest {
            card_number: Some("4111111111111111".into()),
            expiration: Some("07/2026".into()),
            cvv: Some("987".into()),
            ..Default::default()
        };
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("4111111111111111"));
        assert!(!rendered.contains("2026"));
        assert!(!rendered.contains("987"));
        assert!(rendered.contains("XXXXXXXXXXXX1111"));
        assert!(rendered.contains("07/****"));
    }

    #[test]
    fn test_refund_request_last4_field_name() {
        let req: RefundRequest = serde_json::from_str(
            r#"{"transactionId":"60123","cardNumberLast4":"1111","amount":"5.00"}"#,
        )
        .unwrap();
        assert_eq!(req.card_number_last4.as_deref(), Some("1111"));
        assert_eq!(req.transaction_id.as_deref(), Some("60123"));
    }
}
