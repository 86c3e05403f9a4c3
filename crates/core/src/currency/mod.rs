//! Display currency resolution for a startup.

mod resolution;

pub use resolution::{currency_for_country, resolve_currency};
