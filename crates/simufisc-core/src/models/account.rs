//! Accounts and signed postings.
//!
//! The engine tracks exactly four accounts. Their declaration order is
//! fixed and used for deterministic iteration in reports and maps.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the four simulated accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    /// Day-to-day business account receiving net revenue and paying expenses.
    Operating,
    /// Savings account.
    Savings,
    /// Personal drawings account.
    Personal,
    /// VAT account: collected VAT in, deductible VAT out.
    Vat,
}

impl Account {
    /// All accounts, in the fixed reporting order.
    pub const ALL: [Account; 4] = [
        Account::Operating,
        Account::Savings,
        Account::Personal,
        Account::Vat,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Account::Operating => "operating",
            Account::Savings => "savings",
            Account::Personal => "personal",
            Account::Vat => "vat",
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signed entry against one account, part of an occurrence's
/// double-entry. Positive is a debit (inflow), negative a credit (outflow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosting {
    pub account: Account,
    pub amount: Decimal,
    pub description: String,
}

impl AccountPosting {
    pub fn new(account: Account, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account,
            amount,
            description: description.into(),
        }
    }

    /// Check if this posting is an inflow to its account.
    pub fn is_debit(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// A posting as recorded in a monthly ledger bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Identifier of the occurrence that produced this posting.
    pub occurrence_id: String,
    pub date: NaiveDate,
    /// Signed amount: positive debit, negative credit.
    pub amount: Decimal,
    pub description: String,
}
