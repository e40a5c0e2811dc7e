//! Dated financial events derived from patterns.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AccountPosting, ExpenseCategory};

/// Whether an occurrence brings money in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    Revenue,
    Expense,
}

impl OccurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceKind::Revenue => "revenue",
            OccurrenceKind::Expense => "expense",
        }
    }
}

/// One dated financial event expanded from a pattern.
///
/// Transient: owned by a single simulation run and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// `<pattern_id>-<date>`, unique within a run.
    pub id: String,
    pub pattern_id: String,
    pub pattern_name: String,
    pub date: NaiveDate,
    pub kind: OccurrenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    pub gross_amount: Decimal,
    /// VAT rate as a fraction (20% -> 0.20).
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub net_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_deductible: Option<bool>,
    pub postings: Vec<AccountPosting>,
}

impl Occurrence {
    /// Compose the occurrence identifier from a pattern id and a date.
    pub fn compose_id(pattern_id: &str, date: NaiveDate) -> String {
        format!("{}-{}", pattern_id, date.format("%Y-%m-%d"))
    }

    /// Zero-based calendar month index of this occurrence.
    pub fn month_index(&self) -> usize {
        self.date.month() as usize - 1
    }
}
