#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core orchestration for card payment operations.
//!
//! This crate turns authorize, capture, charge, refund and void requests into
//! vendor-neutral transactions, hands them to a [`client::GatewayClient`],
//! and folds whatever comes back into a uniform [`normalize::OperationOutcome`].
//! Card data never leaves the crate unmasked except through the client call.
//!
//! # Modules
//!
//! - [`amount`] - Positive, ceiling-bounded monetary amounts
//! - [`client`] - Processor client contract and its raw result type
//! - [`config`] - Settings shared by every operation
//! - [`error`] - Rejection and transport error types
//! - [`gateway`] - The five operation entry points
//! - [`mask`] - Redaction of card numbers, expirations and security codes
//! - [`normalize`] - Raw processor result to outcome mapping
//! - [`proto`] - Request and response wire types
//! - [`transaction`] - Operation kinds and the vendor-neutral transaction mapper
//! - [`validate`] - Schema and semantic validation
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits `tracing` events for every operation (masked)

pub mod amount;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mask;
pub mod normalize;
pub mod proto;
pub mod transaction;
pub mod validate;

pub use client::{GatewayClient, RawResult};
pub use config::GatewaySettings;
pub use error::{GatewayError, RequestRejection, ValidationError};
pub use gateway::Gateway;
pub use normalize::OperationOutcome;
pub use transaction::{OperationKind, VendorTransaction};
