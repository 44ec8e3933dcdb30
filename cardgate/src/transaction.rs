//! Operation kinds and the vendor-neutral transaction mapper.
//!
//! [`map`] is a pure function from a [`ValidatedRequest`] to the
//! [`VendorTransaction`] handed to the processor client. Everything that
//! differs between kinds is read from the [`KindProfile`] table so the five
//! mappings share one shape.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::mask::{mask_card, mask_security_code};
use crate::validate::{
    Customer, Party, ShippingParty, ValidatedCapture, ValidatedPayment, ValidatedRefund,
    ValidatedRequest, ValidatedVoid,
};

/// Length of the synthesized refund card number.
pub const REFUND_CARD_LENGTH: usize = 16;

/// Filler used to left-pad the refund card number.
pub const REFUND_CARD_FILLER: char = 'X';

/// Expiration sent with the refund placeholder card.
pub const REFUND_EXPIRATION_PLACEHOLDER: &str = "XXXX";

/// The five payment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Reserve funds without capturing them.
    Authorize,
    /// Collect funds against a prior authorization.
    Capture,
    /// Authorize and capture in one step.
    Charge,
    /// Return funds for a settled transaction.
    Refund,
    /// Cancel an unsettled authorization or charge.
    Void,
}

/// Per-kind mapping and reporting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// Lowercase operation name used in logs.
    pub name: &'static str,
    /// Processor transaction type.
    pub processor_type: ProcessorType,
    /// Decline message used when the processor gives no reason.
    pub failure_message: &'static str,
    /// Key of the id in the success body.
    pub id_field: &'static str,
    /// Whether billing, shipping, customer and tax details are sent.
    pub forwards_order_details: bool,
}

/// Processor-side transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorType {
    /// Authorize without capturing.
    AuthOnly,
    /// Authorize and capture together.
    AuthCapture,
    /// Capture an earlier authorization.
    PriorAuthCapture,
    /// Credit a settled transaction.
    Refund,
    /// Cancel an unsettled transaction.
    Void,
}

const PROFILES: [KindProfile; 5] = [
    KindProfile {
        name: "authorize",
        processor_type: ProcessorType::AuthOnly,
        failure_message: "Authorization failed.",
        id_field: "transactionId",
        forwards_order_details: true,
    },
    KindProfile {
        name: "capture",
        processor_type: ProcessorType::PriorAuthCapture,
        failure_message: "Capture failed.",
        id_field: "transactionId",
        forwards_order_details: false,
    },
    // Charge validates billing and shipping but never sends them.
    KindProfile {
        name: "charge",
        processor_type: ProcessorType::AuthCapture,
        failure_message: "Charge failed.",
        id_field: "transactionId",
        forwards_order_details: false,
    },
    KindProfile {
        name: "refund",
        processor_type: ProcessorType::Refund,
        failure_message: "Refund failed.",
        id_field: "refundId",
        forwards_order_details: false,
    },
    KindProfile {
        name: "void",
        processor_type: ProcessorType::Void,
        failure_message: "Void failed.",
        id_field: "voidId",
        forwards_order_details: false,
    },
];

impl OperationKind {
    /// All kinds, in table order.
    pub const ALL: [Self; 5] = [
        Self::Authorize,
        Self::Capture,
        Self::Charge,
        Self::Refund,
        Self::Void,
    ];

    /// The rules for this kind.
    #[must_use]
    pub const fn profile(self) -> &'static KindProfile {
        &PROFILES[self as usize]
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

/// Card details as sent to the processor.
///
/// `Debug` masks the number and security code.
#[derive(Clone, PartialEq, Eq)]
pub struct CardInstrument {
    /// Full number, or the last four digits for refunds.
    pub number: String,
    /// `YYYY-MM`, or [`REFUND_EXPIRATION_PLACEHOLDER`] for refunds.
    pub expiration: String,
    /// Sent for authorize and charge only.
    pub security_code: Option<String>,
}

impl fmt::Debug for CardInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInstrument")
            .field("number", &mask_card(Some(&self.number)))
            .field("expiration", &"****")
            .field(
                "security_code",
                &self.security_code.as_ref().map(mask_security_code),
            )
            .finish()
    }
}

/// Billing, shipping, customer and tax details. Only Authorize carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    /// Billing party.
    pub billing: Party,
    /// Shipping party, when any shipping field was sent.
    pub shipping: Option<ShippingParty>,
    /// Customer identity, when an id or email was sent.
    pub customer: Option<Customer>,
    /// Tax amount.
    pub tax: Option<Decimal>,
    /// Duty amount.
    pub duty: Option<Decimal>,
    /// Tax exemption flag.
    pub tax_exempt: Option<bool>,
    /// Purchase order number.
    pub po_number: Option<String>,
}

/// The processor-independent descriptor of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorTransaction {
    /// The requested operation.
    pub kind: OperationKind,
    /// `None` for void, and for capture of the full authorized amount.
    pub amount: Option<Decimal>,
    /// Card details; `None` for capture and void.
    pub instrument: Option<CardInstrument>,
    /// The prior transaction this one acts on.
    pub reference_id: Option<String>,
    /// Present only when the kind forwards order details.
    pub order: Option<Box<OrderDetails>>,
}

impl VendorTransaction {
    /// The processor transaction type for this descriptor.
    #[must_use]
    pub const fn processor_type(&self) -> ProcessorType {
        self.kind.profile().processor_type
    }
}

/// Builds the vendor-neutral descriptor for a validated request.
#[must_use]
pub fn map(request: &ValidatedRequest) -> VendorTransaction {
    let kind = request.kind();
    match request {
        ValidatedRequest::Authorize(payment) | ValidatedRequest::Charge(payment) => {
            map_payment(kind, payment)
        }
        ValidatedRequest::Capture(capture) => map_capture(capture),
        ValidatedRequest::Refund(refund) => map_refund(refund),
        ValidatedRequest::Void(void) => map_void(void),
    }
}

fn map_payment(kind: OperationKind, payment: &ValidatedPayment) -> VendorTransaction {
    let order = kind.profile().forwards_order_details.then(|| {
        Box::new(OrderDetails {
            billing: payment.billing.clone(),
            shipping: payment.shipping.clone(),
            customer: payment.customer.clone(),
            tax: payment.extras.tax,
            duty: payment.extras.duty,
            tax_exempt: payment.extras.tax_exempt,
            po_number: payment.extras.po_number.clone(),
        })
    });

    VendorTransaction {
        kind,
        amount: Some(payment.amount.value()),
        instrument: Some(CardInstrument {
            number: payment.card.number.clone(),
            expiration: payment.card.expiration.to_processor_format(),
            security_code: Some(payment.card.security_code.clone()),
        }),
        reference_id: None,
        order,
    }
}

fn map_capture(capture: &ValidatedCapture) -> VendorTransaction {
    VendorTransaction {
        kind: OperationKind::Capture,
        amount: capture.amount.map(crate::amount::Amount::value),
        instrument: None,
        reference_id: Some(capture.transaction_id.clone()),
        order: None,
    }
}

fn map_refund(refund: &ValidatedRefund) -> VendorTransaction {
    VendorTransaction {
        kind: OperationKind::Refund,
        amount: Some(refund.amount.value()),
        instrument: Some(CardInstrument {
            number: refund_placeholder_card(&refund.card_last4),
            expiration: REFUND_EXPIRATION_PLACEHOLDER.to_owned(),
            security_code: None,
        }),
        reference_id: Some(refund.transaction_id.clone()),
        order: None,
    }
}

fn map_void(void: &ValidatedVoid) -> VendorTransaction {
    VendorTransaction {
        kind: OperationKind::Void,
        amount: None,
        instrument: None,
        reference_id: Some(void.transaction_id.clone()),
        order: None,
    }
}

/// Left-pads the last four digits to [`REFUND_CARD_LENGTH`].
fn refund_placeholder_card(last4: &str) -> String {
    let pad = REFUND_CARD_LENGTH.saturating_sub(last4.chars().count());
    let mut number: String = std::iter::repeat_n(REFUND_CARD_FILLER, pad).collect();
    number.push_str(last4);
    number
}
