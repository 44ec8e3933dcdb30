//! HTTP surface for cardgate.
//!
//! Binds the five payment operations to `POST /api/{operation}` and maps
//! their outcomes onto status codes and JSON bodies.
//!
//! # Modules
//!
//! - [`handlers`] - Axum route handlers and router builder
//! - [`error`] - Outcome and rejection to HTTP response mapping
//! - [`config`] - Server configuration with environment variable expansion

pub mod config;
pub mod error;
pub mod handlers;

pub use handlers::{GatewayState, gateway_router};
