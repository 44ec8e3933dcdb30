//! JSON shapes for `createTransactionRequest` and its response.
//!
//! Authorize.Net validates the JSON API against its XML schema, so element
//! order matters: struct fields below are declared in schema order and serde
//! keeps that order when serializing.

use std::fmt;

use cardgate::client::{ErrorEntry, MessageEntry, RawResult, ResultCode};
use cardgate::transaction::{CardInstrument, OrderDetails, ProcessorType};
use cardgate::validate::{Customer, Party, ShippingParty};
use cardgate::VendorTransaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as, skip_serializing_none};

use crate::constants::{CUSTOMER_TYPE_INDIVIDUAL, DUTY_NAME, TAX_NAME};

/// Wire name of a processor transaction type.
#[must_use]
pub const fn transaction_type(processor_type: ProcessorType) -> &'static str {
    match processor_type {
        ProcessorType::AuthOnly => "authOnlyTransaction",
        ProcessorType::AuthCapture => "authCaptureTransaction",
        ProcessorType::PriorAuthCapture => "priorAuthCaptureTransaction",
        ProcessorType::Refund => "refundTransaction",
        ProcessorType::Void => "voidTransaction",
    }
}

/// Top-level request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionEnvelope<'a> {
    /// The wrapped request.
    pub create_transaction_request: CreateTransactionRequest<'a>,
}

impl<'a> CreateTransactionEnvelope<'a> {
    /// Builds the request body for `transaction`.
    #[must_use]
    pub fn new(
        name: &'a str,
        transaction_key: &'a str,
        transaction: &'a VendorTransaction,
    ) -> Self {
        Self {
            create_transaction_request: CreateTransactionRequest {
                merchant_authentication: MerchantAuthentication {
                    name,
                    transaction_key,
                },
                transaction_request: TransactionRequest::from_transaction(transaction),
            },
        }
    }
}

/// `createTransactionRequest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest<'a> {
    /// API login credentials.
    pub merchant_authentication: MerchantAuthentication<'a>,
    /// The transaction to run.
    pub transaction_request: TransactionRequest<'a>,
}

/// API login credentials. `Debug` redacts the key.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAuthentication<'a> {
    /// API login id.
    pub name: &'a str,
    /// Transaction key.
    pub transaction_key: &'a str,
}

impl fmt::Debug for MerchantAuthentication<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantAuthentication")
            .field("name", &self.name)
            .field("transaction_key", &"[REDACTED]")
            .finish()
    }
}

/// `transactionRequestType`, restricted to the elements this client sends.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest<'a> {
    /// See [`transaction_type`].
    pub transaction_type: &'static str,
    /// Amount to authorize, capture or refund.
    pub amount: Option<Decimal>,
    /// Card details.
    pub payment: Option<Payment<'a>>,
    /// Id of the transaction this one refers to.
    pub ref_trans_id: Option<&'a str>,
    /// Tax line.
    pub tax: Option<ExtendedAmount>,
    /// Duty line.
    pub duty: Option<ExtendedAmount>,
    /// Always sent with order details.
    pub tax_exempt: Option<bool>,
    /// Purchase order number.
    pub po_number: Option<&'a str>,
    /// Customer identity.
    pub customer: Option<CustomerData<'a>>,
    /// Billing address.
    pub bill_to: Option<CustomerAddress<'a>>,
    /// Shipping address.
    pub ship_to: Option<NameAndAddress<'a>>,
}

impl<'a> TransactionRequest<'a> {
    /// Maps a vendor-neutral transaction onto the wire shape.
    #[must_use]
    pub fn from_transaction(transaction: &'a VendorTransaction) -> Self {
        let mut request = Self {
            transaction_type: transaction_type(transaction.processor_type()),
            amount: transaction.amount,
            payment: transaction.instrument.as_ref().map(Payment::from),
            ref_trans_id: transaction.reference_id.as_deref(),
            tax: None,
            duty: None,
            tax_exempt: None,
            po_number: None,
            customer: None,
            bill_to: None,
            ship_to: None,
        };
        if let Some(order) = transaction.order.as_deref() {
            request.apply_order(order);
        }
        request
    }

    fn apply_order(&mut self, order: &'a OrderDetails) {
        self.tax = order.tax.map(|amount| ExtendedAmount::new(amount, TAX_NAME));
        self.duty = order.duty.map(|amount| ExtendedAmount::new(amount, DUTY_NAME));
        self.tax_exempt = Some(order.tax_exempt.unwrap_or(false));
        self.po_number = order.po_number.as_deref();
        self.customer = order.customer.as_ref().map(CustomerData::from);
        self.bill_to = Some(CustomerAddress::from(&order.billing));
        self.ship_to = order.shipping.as_ref().map(NameAndAddress::from);
    }
}

/// `paymentType`, card only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment<'a> {
    /// The card.
    pub credit_card: CreditCard<'a>,
}

impl<'a> From<&'a CardInstrument> for Payment<'a> {
    fn from(instrument: &'a CardInstrument) -> Self {
        Self {
            credit_card: CreditCard {
                card_number: &instrument.number,
                expiration_date: &instrument.expiration,
                card_code: instrument.security_code.as_deref(),
            },
        }
    }
}

/// `creditCardType`. `Debug` masks every field.
#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard<'a> {
    /// Primary account number.
    pub card_number: &'a str,
    /// `YYYY-MM`.
    pub expiration_date: &'a str,
    /// CVV.
    pub card_code: Option<&'a str>,
}

impl fmt::Debug for CreditCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCard")
            .field("card_number", &cardgate::mask::mask_card(Some(self.card_number)))
            .field("expiration_date", &"****")
            .field(
                "card_code",
                &self.card_code.map(cardgate::mask::mask_security_code),
            )
            .finish()
    }
}

/// `extendedAmountType`, used for tax and duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtendedAmount {
    /// Line amount.
    pub amount: Decimal,
    /// Line label.
    pub name: &'static str,
}

impl ExtendedAmount {
    const fn new(amount: Decimal, name: &'static str) -> Self {
        Self { amount, name }
    }
}

/// `customerDataType`.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct CustomerData<'a> {
    /// Always [`CUSTOMER_TYPE_INDIVIDUAL`].
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Merchant-side customer id.
    pub id: Option<&'a str>,
    /// Customer email.
    pub email: Option<&'a str>,
}

impl<'a> From<&'a Customer> for CustomerData<'a> {
    fn from(customer: &'a Customer) -> Self {
        Self {
            kind: CUSTOMER_TYPE_INDIVIDUAL,
            id: customer.id.as_deref(),
            email: customer.email.as_deref(),
        }
    }
}

/// `customerAddressType`, the billing address.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddress<'a> {
    /// Given name.
    pub first_name: Option<&'a str>,
    /// Family name.
    pub last_name: Option<&'a str>,
    /// Company name.
    pub company: Option<&'a str>,
    /// Street address.
    pub address: Option<&'a str>,
    /// City.
    pub city: Option<&'a str>,
    /// State or region.
    pub state: Option<&'a str>,
    /// Postal code.
    pub zip: Option<&'a str>,
    /// Country.
    pub country: Option<&'a str>,
    /// Phone number.
    pub phone_number: Option<&'a str>,
    /// Fax number.
    pub fax_number: Option<&'a str>,
}

impl<'a> From<&'a Party> for CustomerAddress<'a> {
    fn from(party: &'a Party) -> Self {
        Self {
            first_name: Some(&party.first_name),
            last_name: Some(&party.last_name),
            company: party.company.as_deref(),
            address: Some(&party.address),
            city: Some(&party.city),
            state: Some(&party.region),
            zip: Some(&party.postal_code),
            country: Some(&party.country),
            phone_number: party.phone.as_deref(),
            fax_number: party.fax.as_deref(),
        }
    }
}

/// `nameAndAddressType`, the shipping address.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAndAddress<'a> {
    /// Given name.
    pub first_name: Option<&'a str>,
    /// Family name.
    pub last_name: Option<&'a str>,
    /// Company name.
    pub company: Option<&'a str>,
    /// Street address.
    pub address: Option<&'a str>,
    /// City.
    pub city: Option<&'a str>,
    /// State or region.
    pub state: Option<&'a str>,
    /// Postal code.
    pub zip: Option<&'a str>,
    /// Country.
    pub country: Option<&'a str>,
}

impl<'a> From<&'a ShippingParty> for NameAndAddress<'a> {
    fn from(party: &'a ShippingParty) -> Self {
        Self {
            first_name: party.first_name.as_deref(),
            last_name: party.last_name.as_deref(),
            company: party.company.as_deref(),
            address: party.address.as_deref(),
            city: party.city.as_deref(),
            state: party.region.as_deref(),
            zip: party.postal_code.as_deref(),
            country: party.country.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// `createTransactionResponse`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionResponse {
    /// Transaction-level outcome; absent when the request was refused outright.
    #[serde(default)]
    pub transaction_response: Option<TransactionResponse>,
    /// Echo of the request's `refId`.
    #[serde(default)]
    pub ref_id: Option<String>,
    /// Request-level outcome.
    pub messages: Messages,
}

/// `messagesType`.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messages {
    /// Overall result.
    pub result_code: WireResultCode,
    /// General messages; `null` reads as empty.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub message: Vec<Message>,
}

/// `messageTypeEnum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WireResultCode {
    /// [`RESULT_CODE_OK`](crate::constants::RESULT_CODE_OK).
    Ok,
    /// [`RESULT_CODE_ERROR`](crate::constants::RESULT_CODE_ERROR).
    Error,
}

/// One general message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message code, e.g. `E00027`.
    pub code: String,
    /// Message text.
    pub text: String,
}

/// `transactionResponse`.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// One of [`response_code`](crate::constants::response_code).
    #[serde(default)]
    pub response_code: Option<String>,
    /// Issuer authorization code.
    #[serde(default)]
    pub auth_code: Option<String>,
    /// Processor transaction id.
    #[serde(default)]
    pub trans_id: Option<String>,
    /// Transaction messages; `null` reads as empty.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub messages: Vec<TransactionMessage>,
    /// Transaction errors; `null` reads as empty.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub errors: Vec<TransactionError>,
}

/// One transaction message.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionMessage {
    /// Message code.
    pub code: String,
    /// Message text.
    pub description: String,
}

/// One transaction error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionError {
    /// Error code.
    pub error_code: String,
    /// Error text.
    pub error_text: String,
}

impl From<CreateTransactionResponse> for RawResult {
    fn from(response: CreateTransactionResponse) -> Self {
        let result_code = match response.messages.result_code {
            WireResultCode::Ok => ResultCode::Ok,
            WireResultCode::Error => ResultCode::Error,
        };
        let messages = response
            .messages
            .message
            .into_iter()
            .map(|m| MessageEntry {
                code: m.code,
                text: m.text,
            })
            .collect();
        let (response_code, transaction_id, errors) = match response.transaction_response {
            Some(tx) => (
                tx.response_code,
                tx.trans_id,
                tx.errors
                    .into_iter()
                    .map(|e| ErrorEntry {
                        code: e.error_code,
                        text: e.error_text,
                    })
                    .collect(),
            ),
            None => (None, None, Vec::new()),
        };
        Self {
            result_code,
            response_code,
            transaction_id,
            errors,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::response_code;
    use cardgate::OperationKind;
    use serde_json::json;

    fn authorize_transaction() -> VendorTransaction {
        VendorTransaction {
            kind: OperationKind::Authorize,
            amount: Some(Decimal::new(1999, 2)),
            instrument: Some(CardInstrument {
                number: "4111111111111111".into(),
                expiration: "2026-07".into(),
                security_code: Some("123".into()),
            }),
            reference_id: None,
            order: Some(Box::new(OrderDetails {
                billing: Party {
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    company: None,
                    address: "1 Analytical Way".into(),
                    city: "London".into(),
                    region: "LDN".into(),
                    postal_code: "N1".into(),
                    country: "UK".into(),
                    phone: Some("555-123-4567".into()),
                    fax: None,
                },
                shipping: None,
                customer: Some(Customer {
                    id: Some("c-42".into()),
                    email: None,
                }),
                tax: Some(Decimal::new(150, 2)),
                duty: None,
                tax_exempt: None,
                po_number: Some("PO-7".into()),
            })),
        }
    }

    #[test]
    fn test_authorize_body() {
        let transaction = authorize_transaction();
        let envelope = CreateTransactionEnvelope::new("login", "key", &transaction);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "createTransactionRequest": {
                    "merchantAuthentication": { "name": "login", "transactionKey": "key" },
                    "transactionRequest": {
                        "transactionType": "authOnlyTransaction",
                        "amount": "19.99",
                        "payment": {
                            "creditCard": {
                                "cardNumber": "4111111111111111",
                                "expirationDate": "2026-07",
                                "cardCode": "123"
                            }
                        },
                        "tax": { "amount": "1.50", "name": "Tax" },
                        "taxExempt": false,
                        "poNumber": "PO-7",
                        "customer": { "type": "individual", "id": "c-42" },
                        "billTo": {
                            "firstName": "Ada",
                            "lastName": "Lovelace",
                            "address": "1 Analytical Way",
                            "city": "London",
                            "state": "LDN",
                            "zip": "N1",
                            "country": "UK",
                            "phoneNumber": "555-123-4567"
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_elements_serialized_in_schema_order() {
        let transaction = authorize_transaction();
        let body =
            serde_json::to_string(&CreateTransactionEnvelope::new("login", "key", &transaction))
                .unwrap();
        let positions: Vec<usize> = [
            "\"merchantAuthentication\"",
            "\"transactionType\"",
            "\"amount\"",
            "\"payment\"",
            "\"tax\"",
            "\"taxExempt\"",
            "\"poNumber\"",
            "\"customer\"",
            "\"billTo\"",
        ]
        .iter()
        .map(|key| body.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{body}");
    }

    #[test]
    fn test_void_body_carries_only_reference() {
        let transaction = VendorTransaction {
            kind: OperationKind::Void,
            amount: None,
            instrument: None,
            reference_id: Some("60123".into()),
            order: None,
        };
        let request = TransactionRequest::from_transaction(&transaction);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "transactionType": "voidTransaction", "refTransId": "60123" })
        );
    }

    #[test]
    fn test_debug_redacts_credentials_and_card() {
        let transaction = authorize_transaction();
        let envelope = CreateTransactionEnvelope::new("login", "s3cr3t-key", &transaction);
        let debug = format!("{envelope:?}");
        assert!(!debug.contains("s3cr3t-key"));
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("\"123\""));
    }

    #[test]
    fn test_decline_response_to_raw_result() {
        let response: CreateTransactionResponse = serde_json::from_value(json!({
            "transactionResponse": {
                "responseCode": "2",
                "authCode": "",
                "transId": "0",
                "errors": [{ "errorCode": "2", "errorText": "This transaction has been declined." }]
            },
            "messages": {
                "resultCode": "Error",
                "message": [{ "code": "E00027", "text": "The transaction was unsuccessful." }]
            }
        }))
        .unwrap();
        let raw = RawResult::from(response);
        assert_eq!(raw.result_code, ResultCode::Error);
        assert_eq!(raw.response_code.as_deref(), Some(response_code::DECLINED));
        assert_eq!(raw.errors[0].text, "This transaction has been declined.");
        assert_eq!(raw.messages[0].code, "E00027");
    }

    #[test]
    fn test_null_collections_tolerated() {
        let response: CreateTransactionResponse = serde_json::from_value(json!({
            "transactionResponse": {
                "responseCode": "1",
                "transId": "60123",
                "messages": null,
                "errors": null
            },
            "refId": null,
            "messages": { "resultCode": "Ok", "message": null }
        }))
        .unwrap();
        let raw = RawResult::from(response);
        assert!(raw.is_approved());
        assert!(raw.errors.is_empty());
        assert!(raw.messages.is_empty());
    }
}
