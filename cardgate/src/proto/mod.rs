//! Wire format types.
//!
//! Request bodies accepted by the five operation routes and the JSON shapes
//! written back. Every request field is optional on the wire; presence and
//! format are enforced by [`crate::validate`] so a missing field yields a
//! per-field message instead of a decode failure.

mod request;
mod response;

pub use request::*;
pub use response::*;
