//! Financial record and aggregation types.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use runway_shared::types::{FinancialRecordId, StartupId};

use super::error::FinancialError;

/// Expense or revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Money going out.
    Expense,
    /// Money coming in.
    Revenue,
}

impl RecordType {
    /// Database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Revenue => "revenue",
        }
    }
}

impl FromStr for RecordType {
    type Err = FinancialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "revenue" => Ok(Self::Revenue),
            _ => Err(FinancialError::UnknownRecordType(s.to_string())),
        }
    }
}

/// Fields that only one record type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum RecordDetails {
    /// Expense-only fields.
    Expense {
        /// Where the money came from (equity, debt, grant, revenue...).
        funding_source: Option<String>,
        /// Storage key of the invoice.
        attachment_key: Option<String>,
    },
    /// Revenue-only fields.
    Revenue {
        /// Cost of goods sold against this revenue.
        cogs: Decimal,
    },
}

/// One expense or revenue line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Record ID.
    pub id: FinancialRecordId,
    /// Owning startup.
    pub startup_id: StartupId,
    /// Date booked.
    pub record_date: NaiveDate,
    /// Legal entity.
    pub entity: Option<String>,
    /// Business vertical.
    pub vertical: String,
    /// Gross amount.
    pub amount: Decimal,
    /// Free-form note.
    pub description: Option<String>,
    /// Type-specific fields.
    #[serde(flatten)]
    pub details: RecordDetails,
}

impl FinancialRecord {
    /// Expense or revenue.
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        match self.details {
            RecordDetails::Expense { .. } => RecordType::Expense,
            RecordDetails::Revenue { .. } => RecordType::Revenue,
        }
    }

    /// COGS for revenue, zero for expenses.
    #[must_use]
    pub fn cogs(&self) -> Decimal {
        match self.details {
            RecordDetails::Revenue { cogs } => cogs,
            RecordDetails::Expense { .. } => Decimal::ZERO,
        }
    }

    /// `amount - cogs` for revenue; `None` for expenses.
    #[must_use]
    pub fn gross_profit(&self) -> Option<Decimal> {
        match self.details {
            RecordDetails::Revenue { cogs } => Some(self.amount - cogs),
            RecordDetails::Expense { .. } => None,
        }
    }

    /// Calendar year of the record date.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.record_date.year()
    }

    /// Checks amounts and required fields.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), FinancialError> {
        if self.amount <= Decimal::ZERO {
            return Err(FinancialError::NonPositiveAmount(self.amount));
        }
        if self.vertical.trim().is_empty() {
            return Err(FinancialError::MissingVertical);
        }
        if let RecordDetails::Revenue { cogs } = self.details
            && cogs < Decimal::ZERO
        {
            return Err(FinancialError::NegativeCogs(cogs));
        }
        Ok(())
    }
}

/// Year selector of the financials view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearFilter {
    /// No explicit year; charts fall back to the current year.
    #[default]
    All,
    /// A specific calendar year.
    Year(i32),
}

impl YearFilter {
    /// Year the charts aggregate over: `All` means the current year.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> i32 {
        match self {
            Self::All => today.year(),
            Self::Year(year) => year,
        }
    }
}

impl FromStr for YearFilter {
    type Err = FinancialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<i32>()
            .map(Self::Year)
            .map_err(|_| FinancialError::InvalidYearFilter(s.to_string()))
    }
}

impl std::fmt::Display for YearFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Revenue and expense of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// Month label, `Jan`..`Dec`.
    pub month: String,
    /// Revenue booked in the month.
    pub revenue: Decimal,
    /// Expense booked in the month.
    pub expense: Decimal,
}

/// Total of one vertical for one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalTotal {
    /// Vertical name.
    pub vertical: String,
    /// Sum of amounts.
    pub amount: Decimal,
}

/// Revenue and expense of one legal entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTotal {
    /// Entity name.
    pub entity: String,
    /// Revenue total.
    pub revenue: Decimal,
    /// Expense total.
    pub expense: Decimal,
}

/// Totals of one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTotal {
    /// Calendar year.
    pub year: i32,
    /// Revenue total.
    pub revenue: Decimal,
    /// Expense total.
    pub expense: Decimal,
    /// Revenue minus COGS.
    pub gross_profit: Decimal,
    /// Revenue minus expense.
    pub net: Decimal,
}

/// Where the total funding figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingBasis {
    /// Sum of investment records.
    Investments,
    /// Total stored on the startup profile.
    StoredTotal,
    /// Nothing recorded.
    Unrecorded,
}

/// Funding reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSummary {
    /// Total money raised.
    pub total_funding: Decimal,
    /// Source of `total_funding`.
    pub basis: FundingBasis,
    /// Expenses dated on or before today.
    pub total_expenses_to_date: Decimal,
    /// `total_funding - total_expenses_to_date`.
    pub total_available_fund: Decimal,
}

/// Everything the financials view shows for one year selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialOverview {
    /// Year the charts cover.
    pub year: i32,
    /// Years offered by the selector, newest first.
    pub available_years: Vec<i32>,
    /// Twelve monthly buckets.
    pub monthly: Vec<MonthlyBucket>,
    /// Expense by vertical, largest first.
    pub expense_verticals: Vec<VerticalTotal>,
    /// Revenue by vertical, largest first.
    pub revenue_verticals: Vec<VerticalTotal>,
    /// Totals per entity for the year.
    pub entities: Vec<EntityTotal>,
    /// Totals of every year with records.
    pub yearly: Vec<YearTotal>,
    /// Funding reconciliation, independent of the year.
    pub funding: FundingSummary,
}
