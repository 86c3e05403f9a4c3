//! Expense and revenue records with the aggregations behind the financials view.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::FinancialError;
pub use service::FinancialService;
pub use types::{
    EntityTotal, FinancialOverview, FinancialRecord, FundingBasis, FundingSummary, MonthlyBucket,
    RecordDetails, RecordType, VerticalTotal, YearFilter, YearTotal,
};
