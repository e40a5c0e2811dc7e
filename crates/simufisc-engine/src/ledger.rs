//! Ledger aggregation: seed, apply, roll-forward, summarize.
//!
//! The aggregator owns a per-account array of twelve monthly buckets keyed
//! by calendar month. Postings are applied first; opening balances for
//! non-seed months are determined once, in fiscal order, after every
//! posting has landed. Iterating months `1..=12` and fixing balances up
//! later breaks the chain for non-calendar fiscal years.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use simufisc_core::calendar::{fiscal_month_order, month_display};
use simufisc_core::models::{
    Account, ExpenseTotals, FiscalConfig, MonthlyAccountBalance, MonthlySummary, Occurrence,
    OccurrenceKind, OverallSummary, RevenueTotals, TransactionRecord,
};

/// Per-calendar-month revenue and expense aggregates.
#[derive(Debug, Clone, Default)]
struct MonthTotals {
    revenue: RevenueTotals,
    expenses: ExpenseTotals,
}

/// Applies occurrences into monthly buckets and produces the summaries.
///
/// Owned by one simulation run; the final vectors are extracted and the
/// aggregator is dropped.
pub struct LedgerAggregator {
    fiscal_start_month: u32,
    starting: BTreeMap<Account, Decimal>,
    /// Twelve buckets per account, index = calendar month - 1.
    buckets: BTreeMap<Account, Vec<MonthlyAccountBalance>>,
    totals: Vec<MonthTotals>,
    occurrences_applied: usize,
    rolled_forward: bool,
}

impl LedgerAggregator {
    /// Seed the ledger: the fiscal start month opens at the configured
    /// starting balance, every other month at zero.
    pub fn new(config: &FiscalConfig) -> Self {
        let mut buckets = BTreeMap::new();
        let mut starting = BTreeMap::new();
        for account in Account::ALL {
            let opening = config.starting_balance(account);
            starting.insert(account, opening);
            let months = (1..=12)
                .map(|month| {
                    let seed = if month == config.fiscal_start_month {
                        opening
                    } else {
                        Decimal::ZERO
                    };
                    MonthlyAccountBalance::seeded(account, month, seed)
                })
                .collect();
            buckets.insert(account, months);
        }

        Self {
            fiscal_start_month: config.fiscal_start_month,
            starting,
            buckets,
            totals: vec![MonthTotals::default(); 12],
            occurrences_applied: 0,
            rolled_forward: false,
        }
    }

    /// Apply one occurrence's postings to its calendar-month bucket.
    ///
    /// Closing balances are not touched here; they are computed by
    /// [`LedgerAggregator::roll_forward`].
    pub fn apply(&mut self, occurrence: &Occurrence) {
        let index = occurrence.month_index();

        for posting in &occurrence.postings {
            let bucket = &mut self
                .buckets
                .get_mut(&posting.account)
                .expect("all accounts are seeded")[index];
            bucket.transactions.push(TransactionRecord {
                occurrence_id: occurrence.id.clone(),
                date: occurrence.date,
                amount: posting.amount,
                description: posting.description.clone(),
            });
            bucket.summary.record(posting.amount);
        }

        let totals = &mut self.totals[index];
        match occurrence.kind {
            OccurrenceKind::Revenue => {
                totals.revenue.gross += occurrence.gross_amount;
                totals.revenue.net += occurrence.net_amount;
                totals.revenue.vat += occurrence.vat_amount;
            }
            OccurrenceKind::Expense => {
                totals.expenses.gross += occurrence.gross_amount;
                totals.expenses.net += occurrence.net_amount;
                totals.expenses.vat += occurrence.vat_amount;
                if occurrence.vat_deductible == Some(true)
                    && occurrence.vat_amount > Decimal::ZERO
                {
                    totals.expenses.deductible_vat += occurrence.vat_amount;
                }
            }
        }
        self.occurrences_applied += 1;
    }

    /// Provisional closing balances for one month: its opening plus its own
    /// net change. Authoritative closings come from the roll-forward.
    pub fn partial_closing(&self, month: u32) -> BTreeMap<Account, Decimal> {
        let index = month as usize - 1;
        self.buckets
            .iter()
            .map(|(account, months)| {
                let bucket = &months[index];
                (*account, bucket.opening_balance + bucket.summary.net_change)
            })
            .collect()
    }

    /// Net revenue applied to one calendar month so far.
    pub fn month_revenue_net(&self, month: u32) -> Decimal {
        self.totals[month as usize - 1].revenue.net
    }

    /// Net expenses applied to one calendar month so far (positive magnitude).
    pub fn month_expense_net(&self, month: u32) -> Decimal {
        self.totals[month as usize - 1].expenses.net
    }

    /// Chain balances in fiscal order: each month opens at the prior fiscal
    /// month's closing, then closes at `opening + net_change`.
    ///
    /// Must run after every posting has been applied, so out-of-order
    /// occurrence arrival cannot break the chain.
    pub fn roll_forward(&mut self) {
        let order = fiscal_month_order(self.fiscal_start_month);
        for months in self.buckets.values_mut() {
            let mut prior_closing: Option<Decimal> = None;
            for month in order {
                let bucket = &mut months[month as usize - 1];
                if let Some(closing) = prior_closing {
                    bucket.opening_balance = closing;
                }
                bucket.closing_balance = bucket.opening_balance + bucket.summary.net_change;
                prior_closing = Some(bucket.closing_balance);
            }
        }
        self.rolled_forward = true;
    }

    /// One summary per fiscal month, in fiscal order.
    pub fn monthly_summaries(&self) -> Vec<MonthlySummary> {
        debug_assert!(self.rolled_forward, "summaries require roll-forward");
        fiscal_month_order(self.fiscal_start_month)
            .into_iter()
            .map(|month| {
                let totals = &self.totals[month as usize - 1];
                let account_balances = self.closing_balances(month);
                MonthlySummary {
                    month,
                    label: month_display(month, self.fiscal_start_month),
                    revenue: totals.revenue.clone(),
                    expenses: totals.expenses.clone(),
                    net_profit: totals.revenue.net - totals.expenses.net,
                    net_vat_position: totals.revenue.vat - totals.expenses.deductible_vat,
                    account_balances,
                }
            })
            .collect()
    }

    /// Totals across the fiscal year. Final balances come from the last
    /// fiscal month, not from December.
    pub fn overall_summary(&self, monthly: &[MonthlySummary]) -> OverallSummary {
        let mut total_revenue = RevenueTotals::default();
        let mut total_expenses = ExpenseTotals::default();
        for summary in monthly {
            total_revenue.gross += summary.revenue.gross;
            total_revenue.net += summary.revenue.net;
            total_revenue.vat += summary.revenue.vat;
            total_expenses.gross += summary.expenses.gross;
            total_expenses.net += summary.expenses.net;
            total_expenses.vat += summary.expenses.vat;
            total_expenses.deductible_vat += summary.expenses.deductible_vat;
        }

        let final_account_balances = monthly
            .last()
            .map(|summary| summary.account_balances.clone())
            .unwrap_or_default();

        OverallSummary {
            net_profit: total_revenue.net - total_expenses.net,
            total_vat_collected: total_revenue.vat,
            total_vat_deductible: total_expenses.deductible_vat,
            net_vat_owed: total_revenue.vat - total_expenses.deductible_vat,
            total_revenue,
            total_expenses,
            final_account_balances,
        }
    }

    /// All monthly buckets, fiscal-month-major then account order.
    pub fn monthly_balances(&self) -> Vec<MonthlyAccountBalance> {
        let mut balances = Vec::with_capacity(12 * Account::ALL.len());
        for month in fiscal_month_order(self.fiscal_start_month) {
            for account in Account::ALL {
                balances.push(self.buckets[&account][month as usize - 1].clone());
            }
        }
        balances
    }

    /// Closing balance of every account at one month.
    fn closing_balances(&self, month: u32) -> BTreeMap<Account, Decimal> {
        self.buckets
            .iter()
            .map(|(account, months)| (*account, months[month as usize - 1].closing_balance))
            .collect()
    }

    pub fn occurrences_applied(&self) -> usize {
        self.occurrences_applied
    }

    pub fn starting_balance(&self, account: Account) -> Decimal {
        self.starting.get(&account).copied().unwrap_or_default()
    }
}
