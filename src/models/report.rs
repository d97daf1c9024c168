//! Return report model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of event a report records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Returned,
    Missing,
    Sold,
}

impl ReportType {
    /// Report types shown in the returns history
    pub const HISTORY: [ReportType; 3] = [ReportType::Returned, ReportType::Missing, ReportType::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Returned => "returned",
            ReportType::Missing => "missing",
            ReportType::Sold => "sold",
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of an item when it came back.
///
/// Values written by other tools that are not one of the three known
/// conditions are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReturnCondition {
    Good,
    Damaged,
    Missing,
    Other(String),
}

impl ReturnCondition {
    pub fn as_str(&self) -> &str {
        match self {
            ReturnCondition::Good => "good",
            ReturnCondition::Damaged => "damaged",
            ReturnCondition::Missing => "missing",
            ReturnCondition::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for ReturnCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReturnCondition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ReturnCondition::from(s.to_string()))
    }
}

impl From<String> for ReturnCondition {
    fn from(s: String) -> Self {
        match s.as_str() {
            "good" => ReturnCondition::Good,
            "damaged" => ReturnCondition::Damaged,
            "missing" => ReturnCondition::Missing,
            _ => ReturnCondition::Other(s),
        }
    }
}

impl From<ReturnCondition> for String {
    fn from(c: ReturnCondition) -> Self {
        match c {
            ReturnCondition::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Rental columns joined onto a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentalInfo {
    pub renter_name: Option<String>,
    pub rent_date: Option<String>,
    pub return_date: Option<String>,
}

/// A row of the `reports` table joined with its rental
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[serde(default)]
    pub return_condition: Option<ReturnCondition>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub damage_notes: Option<String>,
    #[serde(default, rename = "rentals")]
    pub rental: Option<RentalInfo>,
}

impl ReturnRecord {
    /// Renter of the joined rental; an empty name counts as missing
    pub fn renter_name(&self) -> Option<&str> {
        self.rental
            .as_ref()
            .and_then(|r| r.renter_name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Item name; an empty name counts as missing
    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Calendar date (UTC) of the report, used for date range filtering
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Condition label used for display; reports without one count as good
    pub fn condition_label(&self) -> &str {
        self.return_condition
            .as_ref()
            .map(ReturnCondition::as_str)
            .unwrap_or("good")
    }

    pub fn is_condition(&self, condition: &ReturnCondition) -> bool {
        self.return_condition.as_ref() == Some(condition)
    }
}
