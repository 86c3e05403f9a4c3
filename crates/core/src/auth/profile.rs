//! Profile-completeness gate run after every sign-in.

use serde::{Deserialize, Serialize};

/// Profile fields required before the dashboard opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    /// Founder's identity document reference.
    IdentityDocument,
    /// Registered company name.
    CompanyName,
    /// Country of incorporation.
    Country,
}

/// Where the client goes after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum NextStep {
    /// Profile is incomplete.
    CompleteRegistration {
        /// Fields still blank, in a fixed order.
        missing: Vec<MissingField>,
    },
    /// Profile is complete.
    Dashboard,
}

/// Inputs of the gate. Blank strings count as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileStatus<'a> {
    /// Identity document reference on the user.
    pub identity_document: Option<&'a str>,
    /// Company name on the startup.
    pub company_name: Option<&'a str>,
    /// Country on the startup.
    pub country: Option<&'a str>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl ProfileStatus<'_> {
    /// Missing fields, identity document first.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<MissingField> {
        [
            (self.identity_document, MissingField::IdentityDocument),
            (self.company_name, MissingField::CompanyName),
            (self.country, MissingField::Country),
        ]
        .into_iter()
        .filter(|(value, _)| is_blank(*value))
        .map(|(_, field)| field)
        .collect()
    }

    /// Decides the next step.
    #[must_use]
    pub fn next_step(&self) -> NextStep {
        let missing = self.missing_fields();
        if missing.is_empty() {
            NextStep::Dashboard
        } else {
            NextStep::CompleteRegistration { missing }
        }
    }
}
