//! Recurring revenue and expense patterns.
//!
//! Revenue and expense patterns share every scheduling field; the
//! `kind` tag carries what differs (VAT rate selection vs. category and
//! deductibility). Daily-only fields are ignored for other frequencies.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Recurrence frequency of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Quarterly,
    Yearly,
}

/// French VAT rates applicable to revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatRate {
    /// 0% (exempt).
    Zero,
    /// 5.5% reduced rate.
    Reduced,
    /// 10% intermediate rate.
    Intermediate,
    /// 20% standard rate.
    Standard,
}

impl VatRate {
    /// Rate as a percentage.
    pub fn as_percent(&self) -> Decimal {
        match self {
            VatRate::Zero => Decimal::ZERO,
            VatRate::Reduced => dec!(5.5),
            VatRate::Intermediate => dec!(10),
            VatRate::Standard => dec!(20),
        }
    }

    /// Rate as a fraction (20% -> 0.20).
    pub fn as_fraction(&self) -> Decimal {
        match self {
            VatRate::Zero => Decimal::ZERO,
            VatRate::Reduced => dec!(0.055),
            VatRate::Intermediate => dec!(0.10),
            VatRate::Standard => dec!(0.20),
        }
    }

    /// Parse a percentage. Anything outside {0, 5.5, 10, 20} is a user error.
    pub fn from_percent(percent: Decimal) -> EngineResult<Self> {
        let rate = if percent == Decimal::ZERO {
            VatRate::Zero
        } else if percent == dec!(5.5) {
            VatRate::Reduced
        } else if percent == dec!(10) {
            VatRate::Intermediate
        } else if percent == dec!(20) {
            VatRate::Standard
        } else {
            return Err(EngineError::validation(format!(
                "unsupported VAT rate: {percent}%"
            )));
        };
        Ok(rate)
    }
}

/// Expense VAT is not configured per pattern; deductible expenses split
/// their VAT out at the standard rate.
pub const DEFAULT_EXPENSE_VAT_RATE: VatRate = VatRate::Standard;

/// Default VAT rate for revenue patterns created without an explicit rate.
pub const DEFAULT_REVENUE_VAT_RATE: VatRate = VatRate::Standard;

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    General,
    Rent,
    Utilities,
    Subscription,
    Insurance,
    Marketing,
    Travel,
    Equipment,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::General => "general",
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Subscription => "subscription",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::Equipment => "equipment",
        }
    }
}

/// Per-date override for daily patterns. Wins over every other rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOffOverride {
    pub date: NaiveDate,
    /// `true` forces an occurrence, `false` suppresses it.
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Discriminated revenue/expense payload of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PatternKind {
    Revenue {
        vat_rate: VatRate,
    },
    Expense {
        category: ExpenseCategory,
        vat_deductible: bool,
    },
}

/// Days-of-week mask with every day set (bit 0 = Sunday .. bit 6 = Saturday).
pub const DAYS_MASK_ALL: u8 = 0b0111_1111;

/// Highest valid days-of-week mask value.
pub const DAYS_MASK_MAX: u8 = DAYS_MASK_ALL;

/// Monday-to-Friday days-of-week mask.
pub const DAYS_MASK_WEEKDAYS: u8 = 0b0011_1110;

/// A recurring revenue or expense rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    /// Gross amount per occurrence, VAT included. Must be positive.
    pub amount: Decimal,
    pub frequency: Frequency,
    /// First calendar month the pattern applies to (`1..=12`).
    pub start_month: u32,
    /// Daily only: bitmask of active weekdays, bit 0 = Sunday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_mask: Option<u8>,
    /// Daily only: deactivate Saturdays and Sundays.
    #[serde(default)]
    pub exclude_weekends: bool,
    /// Daily only: deactivate regional holidays.
    #[serde(default)]
    pub exclude_holidays: bool,
    /// Daily only: expansion starts at this date instead of January 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Daily only: per-date overrides; on duplicate dates the last wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub day_off_overrides: Vec<DayOffOverride>,
    #[serde(flatten)]
    pub kind: PatternKind,
}

impl Pattern {
    /// Create a revenue pattern.
    pub fn revenue(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        frequency: Frequency,
        start_month: u32,
        vat_rate: VatRate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            frequency,
            start_month,
            days_mask: None,
            exclude_weekends: false,
            exclude_holidays: false,
            start_date: None,
            day_off_overrides: Vec::new(),
            kind: PatternKind::Revenue { vat_rate },
        }
    }

    /// Create an expense pattern.
    pub fn expense(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        frequency: Frequency,
        start_month: u32,
        category: ExpenseCategory,
        vat_deductible: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            frequency,
            start_month,
            days_mask: None,
            exclude_weekends: false,
            exclude_holidays: false,
            start_date: None,
            day_off_overrides: Vec::new(),
            kind: PatternKind::Expense {
                category,
                vat_deductible,
            },
        }
    }

    pub fn with_days_mask(mut self, mask: u8) -> Self {
        self.days_mask = Some(mask);
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn excluding_weekends(mut self) -> Self {
        self.exclude_weekends = true;
        self
    }

    pub fn excluding_holidays(mut self) -> Self {
        self.exclude_holidays = true;
        self
    }

    pub fn with_override(
        mut self,
        date: NaiveDate,
        active: bool,
        reason: Option<&str>,
    ) -> Self {
        self.day_off_overrides.push(DayOffOverride {
            date,
            active,
            reason: reason.map(String::from),
        });
        self
    }

    pub fn is_revenue(&self) -> bool {
        matches!(self.kind, PatternKind::Revenue { .. })
    }

    /// VAT rate applied when splitting this pattern's gross amount.
    ///
    /// A non-deductible expense cannot reclaim its VAT, so the whole gross
    /// is the cost and nothing is split out.
    pub fn vat_rate(&self) -> VatRate {
        match self.kind {
            PatternKind::Revenue { vat_rate } => vat_rate,
            PatternKind::Expense {
                vat_deductible: true,
                ..
            } => DEFAULT_EXPENSE_VAT_RATE,
            PatternKind::Expense {
                vat_deductible: false,
                ..
            } => VatRate::Zero,
        }
    }
}
