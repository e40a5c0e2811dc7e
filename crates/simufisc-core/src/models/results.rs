//! Monthly balances, summaries, and the final results value.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Account, TransactionRecord};

/// Debit/credit activity of one account bucket over one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Sum of positive posting amounts.
    pub total_debits: Decimal,
    /// Sum of absolute negative posting amounts.
    pub total_credits: Decimal,
    /// Signed sum of all postings (`total_debits - total_credits`).
    pub net_change: Decimal,
}

impl ActivitySummary {
    /// Record one signed posting amount.
    pub fn record(&mut self, amount: Decimal) {
        if amount >= Decimal::ZERO {
            self.total_debits += amount;
        } else {
            self.total_credits += amount.abs();
        }
        self.net_change += amount;
    }
}

/// One account's balance and activity for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAccountBalance {
    pub account: Account,
    /// Calendar month (`1..=12`).
    pub month: u32,
    pub opening_balance: Decimal,
    /// Postings applied to this bucket, in application order.
    pub transactions: Vec<TransactionRecord>,
    pub closing_balance: Decimal,
    pub summary: ActivitySummary,
}

impl MonthlyAccountBalance {
    /// Empty bucket with the given opening balance.
    pub fn seeded(account: Account, month: u32, opening_balance: Decimal) -> Self {
        Self {
            account,
            month,
            opening_balance,
            transactions: Vec::new(),
            closing_balance: Decimal::ZERO,
            summary: ActivitySummary::default(),
        }
    }
}

/// Revenue aggregates for one month or for the whole year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub gross: Decimal,
    pub net: Decimal,
    pub vat: Decimal,
}

/// Expense aggregates for one month or for the whole year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub gross: Decimal,
    pub net: Decimal,
    /// VAT computed on all expenses, deductible or not.
    pub vat: Decimal,
    /// VAT that actually posted to the VAT account.
    pub deductible_vat: Decimal,
}

/// Financial summary of one fiscal month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Calendar month (`1..=12`).
    pub month: u32,
    /// Display label, e.g. `"April (FY Month 1)"`.
    pub label: String,
    pub revenue: RevenueTotals,
    pub expenses: ExpenseTotals,
    /// `revenue.net - expenses.net`.
    pub net_profit: Decimal,
    /// `revenue.vat - expenses.deductible_vat`.
    pub net_vat_position: Decimal,
    /// Closing balance of every account at the end of this month.
    pub account_balances: BTreeMap<Account, Decimal>,
}

/// Totals across the twelve fiscal months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_revenue: RevenueTotals,
    pub total_expenses: ExpenseTotals,
    pub net_profit: Decimal,
    pub total_vat_collected: Decimal,
    pub total_vat_deductible: Decimal,
    /// `total_vat_collected - total_vat_deductible`.
    pub net_vat_owed: Decimal,
    /// Closing balances of the last fiscal month.
    pub final_account_balances: BTreeMap<Account, Decimal>,
}

/// Run metadata attached to the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub total_occurrences: usize,
    pub processing_time_ms: u64,
    pub engine_version: String,
}

/// Immutable outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub year: i32,
    pub fiscal_start_month: u32,
    /// Sorted in fiscal month order, then by account order.
    pub monthly_balances: Vec<MonthlyAccountBalance>,
    /// One summary per fiscal month, in fiscal order.
    pub monthly_totals: Vec<MonthlySummary>,
    pub overall_totals: OverallSummary,
    pub metadata: RunMetadata,
}

impl SimulationResults {
    /// Balances of one account across the year, in fiscal order.
    pub fn balances_for(&self, account: Account) -> Vec<&MonthlyAccountBalance> {
        self.monthly_balances
            .iter()
            .filter(|b| b.account == account)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn activity_summary_records_signed_amounts() {
        let mut summary = ActivitySummary::default();
        summary.record(dec!(100));
        summary.record(dec!(-30));
        summary.record(dec!(20));
        assert_eq!(summary.total_debits, dec!(120));
        assert_eq!(summary.total_credits, dec!(30));
        assert_eq!(summary.net_change, dec!(90));
    }

    #[test]
    fn seeded_bucket_is_empty() {
        let bucket = MonthlyAccountBalance::seeded(Account::Savings, 7, dec!(5000));
        assert_eq!(bucket.opening_balance, dec!(5000));
        assert!(bucket.transactions.is_empty());
        assert_eq!(bucket.summary.net_change, Decimal::ZERO);
    }
}
