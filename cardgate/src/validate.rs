//! Request validation.
//!
//! Validation runs in two layers, mirroring how the HTTP surface reports
//! problems:
//!
//! 1. **Schema** ([`check_schema`]) walks every field and collects all
//!    violations into a [`FieldErrors`] map keyed by wire field name.
//! 2. **Semantic** ([`validate_semantics`]) re-checks the fields the
//!    operation depends on, stops at the first violation, and builds the typed
//!    [`ValidatedRequest`] the mapper consumes.
//!
//! [`validate`] runs both. Messages never echo the rejected value, so a
//! malformed card number cannot leak through an error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::{RequestRejection, ValidationError};
use crate::mask::{mask_card, mask_security_code};
use crate::proto::{AuthorizeRequest, CaptureRequest, OperationRequest, RefundRequest, VoidRequest};
use crate::transaction::OperationKind;

// ASCII digits only: `\d` would also admit non-Latin digits.
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{13,19}$").expect("static regex"));
static SECURITY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("static regex"));
static LAST4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("static regex"));
static EXPIRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{4})$").expect("static regex")
});
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9 ().\-]{7,25}(\s*(x|ext\.?)\s*[0-9]{1,6})?$").expect("static regex")
});
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("static regex"));

/// Card number is not 13 to 19 digits.
pub const CARD_NUMBER_MESSAGE: &str = "Card number must be 13 to 19 digits.";
/// Expiration is missing.
pub const EXPIRATION_REQUIRED_MESSAGE: &str = "Expiration is required.";
/// Expiration is not `MM/YYYY` with a valid month.
pub const EXPIRATION_FORMAT_MESSAGE: &str = "Expiration must be in MM/YYYY format.";
/// Security code is not 3 or 4 digits.
pub const SECURITY_CODE_MESSAGE: &str = "CVV must be 3 or 4 digits.";
/// Amount is missing.
pub const AMOUNT_REQUIRED_MESSAGE: &str = "Amount is required.";
/// Transaction id is missing or blank.
pub const TRANSACTION_ID_MESSAGE: &str = "Transaction ID is required.";
/// Refund card suffix is missing.
pub const LAST4_REQUIRED_MESSAGE: &str = "Last 4 digits of the card number are required.";
/// Refund card suffix is not four digits.
pub const LAST4_FORMAT_MESSAGE: &str = "Card number must be exactly 4 digits.";

/// Per-field violation messages, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message for `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Records the error side of `result` under `field` and passes the value
    /// through.
    pub fn record<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        result.map_err(|message| self.push(field, message)).ok()
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Fields in name order with their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Card expiration month and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expiration {
    /// 1 to 12.
    pub month: u8,
    /// Four-digit year.
    pub year: u16,
}

impl Expiration {
    /// `YYYY-MM`, the format processors expect.
    #[must_use]
    pub fn to_processor_format(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Parses an `MM/YYYY` expiration.
///
/// # Errors
///
/// Any deviation (single-digit month, two-digit year, month outside 01-12,
/// missing separator) yields the same generic message.
pub fn parse_expiration(value: &str) -> Result<Expiration, ValidationError> {
    let invalid = || ValidationError::new("expiration", EXPIRATION_FORMAT_MESSAGE);
    let caps = EXPIRATION.captures(value).ok_or_else(invalid)?;
    let month = caps[1].parse().map_err(|_| invalid())?;
    let year = caps[2].parse().map_err(|_| invalid())?;
    Ok(Expiration { month, year })
}

/// Card data for one request. Never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentCard {
    /// 13 to 19 digits.
    pub number: String,
    /// Parsed expiration.
    pub expiration: Expiration,
    /// 3 or 4 digits.
    pub security_code: String,
}

impl fmt::Debug for PaymentCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentCard")
            .field("number", &mask_card(Some(&self.number)))
            .field("expiration", &format_args!("{:02}/****", self.expiration.month))
            .field("security_code", &mask_security_code(&self.security_code))
            .finish()
    }
}

/// Billing party. Every address line is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Company name.
    pub company: Option<String>,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub region: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Fax number.
    pub fax: Option<String>,
}

/// Shipping party. Present only if at least one shipping field was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingParty {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Company name.
    pub company: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or region.
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country.
    pub country: Option<String>,
}

/// Customer identity. Present when an id or email was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Merchant-side customer id.
    pub id: Option<String>,
    /// Customer email.
    pub email: Option<String>,
}

/// Optional order-level amounts and references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderExtras {
    /// Tax amount.
    pub tax: Option<Decimal>,
    /// Duty amount.
    pub duty: Option<Decimal>,
    /// Accepted and logged, never forwarded.
    pub freight: Option<Decimal>,
    /// Tax exemption flag.
    pub tax_exempt: Option<bool>,
    /// Purchase order number.
    pub po_number: Option<String>,
}

/// A validated authorize or charge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    /// The card to charge.
    pub card: PaymentCard,
    /// Amount to reserve or charge.
    pub amount: Amount,
    /// Billing party.
    pub billing: Party,
    /// Shipping party, when any shipping field was sent.
    pub shipping: Option<ShippingParty>,
    /// Customer identity, when an id or email was sent.
    pub customer: Option<Customer>,
    /// Order-level amounts and references.
    pub extras: OrderExtras,
}

/// A validated capture request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCapture {
    /// Id of the authorization to capture.
    pub transaction_id: String,
    /// `None` captures the full authorized amount.
    pub amount: Option<Amount>,
}

/// A validated refund request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRefund {
    /// Id of the settled transaction.
    pub transaction_id: String,
    /// Last four digits of the original card.
    pub card_last4: String,
    /// Amount to return.
    pub amount: Amount,
}

/// A validated void request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVoid {
    /// Id of the unsettled transaction.
    pub transaction_id: String,
}

/// Output of the validator, one variant per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedRequest {
    /// Reserve funds.
    Authorize(ValidatedPayment),
    /// Reserve and capture in one step.
    Charge(ValidatedPayment),
    /// Capture a prior authorization.
    Capture(ValidatedCapture),
    /// Return funds from a settled transaction.
    Refund(ValidatedRefund),
    /// Cancel an unsettled transaction.
    Void(ValidatedVoid),
}

impl ValidatedRequest {
    /// The operation this request belongs to.
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

/// Runs the schema layer and then the semantic layer.
///
/// # Errors
///
/// [`RequestRejection::Fields`] when any field fails its schema rule,
/// otherwise [`RequestRejection::Invalid`] for the first semantic violation.
pub fn validate(
    request: &OperationRequest,
    ceiling: Decimal,
) -> Result<ValidatedRequest, RequestRejection> {
    check_schema(request, ceiling)?;
    Ok(validate_semantics(request, ceiling)?)
}

// ---------------------------------------------------------------------------
// Field rules, shared by both layers.
// ---------------------------------------------------------------------------

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn card_number_rule(value: Option<&str>) -> Result<&str, String> {
    present(value)
        .filter(|v| CARD_NUMBER.is_match(v))
        .ok_or_else(|| CARD_NUMBER_MESSAGE.to_owned())
}

fn expiration_rule(value: Option<&str>) -> Result<Expiration, String> {
    let value = present(value).ok_or_else(|| EXPIRATION_REQUIRED_MESSAGE.to_owned())?;
    parse_expiration(value).map_err(|e| e.message)
}

fn security_code_rule(value: Option<&str>) -> Result<&str, String> {
    present(value)
        .filter(|v| SECURITY_CODE.is_match(v))
        .ok_or_else(|| SECURITY_CODE_MESSAGE.to_owned())
}

fn amount_rule(value: Option<Decimal>, ceiling: Decimal) -> Result<Amount, String> {
    let value = value.ok_or_else(|| AMOUNT_REQUIRED_MESSAGE.to_owned())?;
    Amount::try_new(value, ceiling).map_err(|e| e.to_string())
}

fn optional_amount_rule(value: Option<Decimal>, ceiling: Decimal) -> Result<Option<Amount>, String> {
    value.map(|v| amount_rule(Some(v), ceiling)).transpose()
}

fn transaction_id_rule(value: Option<&str>) -> Result<&str, String> {
    present(value).ok_or_else(|| TRANSACTION_ID_MESSAGE.to_owned())
}

fn last4_rule(value: Option<&str>) -> Result<&str, String> {
    let value = present(value).ok_or_else(|| LAST4_REQUIRED_MESSAGE.to_owned())?;
    if LAST4.is_match(value) {
        Ok(value)
    } else {
        Err(LAST4_FORMAT_MESSAGE.to_owned())
    }
}

fn required_text<'a>(field: &str, value: Option<&'a str>, max: usize) -> Result<&'a str, String> {
    let value = present(value).ok_or_else(|| format!("The {field} field is required."))?;
    max_length(field, value, max)
}

fn optional_text<'a>(
    field: &str,
    value: Option<&'a str>,
    max: usize,
) -> Result<Option<&'a str>, String> {
    value.map(|v| max_length(field, v, max)).transpose()
}

fn max_length<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, String> {
    if value.chars().count() > max {
        Err(format!(
            "The field {field} must be a string with a maximum length of {max}."
        ))
    } else {
        Ok(value)
    }
}

fn phone_rule<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, String> {
    match present(value) {
        Some(v) if !PHONE.is_match(v) => {
            Err(format!("The {field} field is not a valid phone number."))
        }
        v => Ok(v),
    }
}

fn email_rule<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, String> {
    match present(value) {
        Some(v) if !EMAIL.is_match(v) => {
            Err(format!("The {field} field is not a valid e-mail address."))
        }
        v => Ok(v),
    }
}

// ---------------------------------------------------------------------------
// Schema layer
// ---------------------------------------------------------------------------

/// Checks every field of `request` and collects all violations.
///
/// # Errors
///
/// Returns the collected [`FieldErrors`] when any field is invalid.
pub fn check_schema(request: &OperationRequest, ceiling: Decimal) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    match request {
        OperationRequest::Authorize(r) | OperationRequest::Charge(r) => {
            check_payment_schema(&mut errors, r, ceiling);
        }
        OperationRequest::Capture(r) => {
            errors.record("transactionId", transaction_id_rule(r.transaction_id.as_deref()));
            errors.record("amount", optional_amount_rule(r.amount, ceiling));
        }
        OperationRequest::Refund(r) => {
            errors.record("transactionId", transaction_id_rule(r.transaction_id.as_deref()));
            errors.record("cardNumberLast4", last4_rule(r.card_number_last4.as_deref()));
            errors.record("amount", amount_rule(r.amount, ceiling));
        }
        OperationRequest::Void(r) => {
            errors.record("transactionId", transaction_id_rule(r.transaction_id.as_deref()));
        }
    }
    errors.into_result()
}

fn check_payment_schema(errors: &mut FieldErrors, r: &AuthorizeRequest, ceiling: Decimal) {
    errors.record("customerId", optional_text("customerId", r.customer_id.as_deref(), 50));

    for (field, value, max) in [
        ("firstName", &r.first_name, 50),
        ("lastName", &r.last_name, 50),
        ("address", &r.address, 100),
        ("city", &r.city, 50),
        ("state", &r.state, 20),
        ("zip", &r.zip, 10),
        ("country", &r.country, 60),
    ] {
        errors.record(field, required_text(field, value.as_deref(), max));
    }

    for (field, value, max) in [
        ("company", &r.company, 100),
        ("shippingFirstName", &r.shipping_first_name, 50),
        ("shippingLastName", &r.shipping_last_name, 50),
        ("shippingCompany", &r.shipping_company, 100),
        ("shippingAddress", &r.shipping_address, 100),
        ("shippingCity", &r.shipping_city, 50),
        ("shippingState", &r.shipping_state, 20),
        ("shippingZip", &r.shipping_zip, 10),
        ("shippingCountry", &r.shipping_country, 60),
        ("poNumber", &r.po_number, 25),
    ] {
        errors.record(field, optional_text(field, value.as_deref(), max));
    }

    errors.record("phone", phone_rule("phone", r.phone.as_deref()));
    errors.record("fax", phone_rule("fax", r.fax.as_deref()));
    errors.record("email", email_rule("email", r.email.as_deref()));

    errors.record("cardNumber", card_number_rule(r.card_number.as_deref()));
    errors.record("expiration", expiration_rule(r.expiration.as_deref()));
    errors.record("cvv", security_code_rule(r.cvv.as_deref()));
    errors.record("amount", amount_rule(r.amount, ceiling));
}

// ---------------------------------------------------------------------------
// Semantic layer
// ---------------------------------------------------------------------------

/// Validates the fields `request` depends on, first violation wins.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first failing field.
pub fn validate_semantics(
    request: &OperationRequest,
    ceiling: Decimal,
) -> Result<ValidatedRequest, ValidationError> {
    match request {
        OperationRequest::Authorize(r) => validate_payment(r, ceiling).map(ValidatedRequest::Authorize),
        OperationRequest::Charge(r) => validate_payment(r, ceiling).map(ValidatedRequest::Charge),
        OperationRequest::Capture(r) => validate_capture(r, ceiling).map(ValidatedRequest::Capture),
        OperationRequest::Refund(r) => validate_refund(r, ceiling).map(ValidatedRequest::Refund),
        OperationRequest::Void(r) => validate_void(r).map(ValidatedRequest::Void),
    }
}

fn at<T>(field: &'static str, result: Result<T, String>) -> Result<T, ValidationError> {
    result.map_err(|message| ValidationError::new(field, message))
}

fn owned(value: Option<&str>) -> Option<String> {
    present(value).map(str::to_owned)
}

/// Validates an authorize or charge body.
///
/// # Errors
///
/// Returns the first violation among card number, expiration, security
/// code, amount and the mandatory billing fields.
pub fn validate_payment(
    r: &AuthorizeRequest,
    ceiling: Decimal,
) -> Result<ValidatedPayment, ValidationError> {
    let number = at("cardNumber", card_number_rule(r.card_number.as_deref()))?;
    let expiration = at("expiration", expiration_rule(r.expiration.as_deref()))?;
    let security_code = at("cvv", security_code_rule(r.cvv.as_deref()))?;
    let amount = at("amount", amount_rule(r.amount, ceiling))?;

    let billing = Party {
        first_name: at("firstName", required_text("firstName", r.first_name.as_deref(), 50))?
            .to_owned(),
        last_name: at("lastName", required_text("lastName", r.last_name.as_deref(), 50))?
            .to_owned(),
        company: owned(r.company.as_deref()),
        address: at("address", required_text("address", r.address.as_deref(), 100))?.to_owned(),
        city: at("city", required_text("city", r.city.as_deref(), 50))?.to_owned(),
        region: at("state", required_text("state", r.state.as_deref(), 20))?.to_owned(),
        postal_code: at("zip", required_text("zip", r.zip.as_deref(), 10))?.to_owned(),
        country: at("country", required_text("country", r.country.as_deref(), 60))?.to_owned(),
        phone: owned(r.phone.as_deref()),
        fax: owned(r.fax.as_deref()),
    };

    let shipping = ShippingParty {
        first_name: owned(r.shipping_first_name.as_deref()),
        last_name: owned(r.shipping_last_name.as_deref()),
        company: owned(r.shipping_company.as_deref()),
        address: owned(r.shipping_address.as_deref()),
        city: owned(r.shipping_city.as_deref()),
        region: owned(r.shipping_state.as_deref()),
        postal_code: owned(r.shipping_zip.as_deref()),
        country: owned(r.shipping_country.as_deref()),
    };
    let shipping = (shipping != ShippingParty::default()).then_some(shipping);

    let customer = Customer {
        id: owned(r.customer_id.as_deref()),
        email: owned(r.email.as_deref()),
    };
    let customer = (customer.id.is_some() || customer.email.is_some()).then_some(customer);

    Ok(ValidatedPayment {
        card: PaymentCard {
            number: number.to_owned(),
            expiration,
            security_code: security_code.to_owned(),
        },
        amount,
        billing,
        shipping,
        customer,
        extras: OrderExtras {
            tax: r.tax,
            duty: r.duty,
            freight: r.freight,
            tax_exempt: r.tax_exempt,
            po_number: owned(r.po_number.as_deref()),
        },
    })
}

/// # Errors
///
/// Missing transaction id, or an amount that is present but out of range.
pub fn validate_capture(
    r: &CaptureRequest,
    ceiling: Decimal,
) -> Result<ValidatedCapture, ValidationError> {
    Ok(ValidatedCapture {
        transaction_id: at("transactionId", transaction_id_rule(r.transaction_id.as_deref()))?
            .to_owned(),
        amount: at("amount", optional_amount_rule(r.amount, ceiling))?,
    })
}

/// # Errors
///
/// Missing transaction id, malformed last-4, or a missing or out-of-range
/// amount.
pub fn validate_refund(
    r: &RefundRequest,
    ceiling: Decimal,
) -> Result<ValidatedRefund, ValidationError> {
    Ok(ValidatedRefund {
        transaction_id: at("transactionId", transaction_id_rule(r.transaction_id.as_deref()))?
            .to_owned(),
        card_last4: at("cardNumberLast4", last4_rule(r.card_number_last4.as_deref()))?.to_owned(),
        amount: at("amount", amount_rule(r.amount, ceiling))?,
    })
}

/// # Errors
///
/// Missing transaction id.
pub fn validate_void(r: &VoidRequest) -> Result<ValidatedVoid, ValidationError> {
    Ok(ValidatedVoid {
        transaction_id: at("transactionId", transaction_id_rule(r.transaction_id.as_deref()))?
            .to_owned(),
    })
}
