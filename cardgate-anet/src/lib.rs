#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Authorize.Net client for cardgate.
//!
//! Implements [`cardgate::GatewayClient`] over the Authorize.Net JSON API
//! (`createTransactionRequest`). Credentials are fixed when the client is
//! built and never appear in `Debug` output or logs.
//!
//! # Modules
//!
//! - [`constants`] - Endpoints, transaction type names and response codes
//! - [`error`] - Client construction and transport errors
//! - [`wire`] - JSON request and response shapes
//! - [`client`] - The [`AnetClient`] itself
//!
//! # Feature Flags
//!
//! - `telemetry` - Wraps each submission in a `tracing` span

pub mod client;
pub mod constants;
pub mod error;
pub mod wire;

pub use client::{AnetClient, AnetConfig, Environment};
pub use error::AnetError;
