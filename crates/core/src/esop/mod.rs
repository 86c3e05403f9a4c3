//! ESOP valuation and allocation rules.
//!
//! This module covers:
//! - Allocation types and how a yearly amount splits into grant periods
//! - Share derivation from an allocation amount and a price per share
//! - Reserved vs. allocated pool value and the over-allocation guard

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::EsopError;
pub use service::EsopService;
pub use types::{AllocationType, EsopSummary, EsopTerms};
