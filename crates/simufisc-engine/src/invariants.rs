//! Post-aggregation invariant checks.
//!
//! Run after the overall summary is computed. A violation means the
//! aggregation itself is wrong, so it surfaces as a terminal engine error,
//! never as a user error. All comparisons tolerate one cent per account
//! per check.

use rust_decimal::Decimal;

use simufisc_core::error::{EngineError, EngineResult};
use simufisc_core::models::{approx_eq, Account, FiscalConfig, SimulationResults};

/// Verify every balance invariant of a finished aggregation.
pub fn check(config: &FiscalConfig, results: &SimulationResults) -> EngineResult<()> {
    check_opening_seed(config, results)?;
    check_roll_forward(results)?;
    check_conservation(config, results)?;
    check_vat_consistency(results)?;
    Ok(())
}

/// Each account's fiscal-start month opens at its configured balance.
fn check_opening_seed(config: &FiscalConfig, results: &SimulationResults) -> EngineResult<()> {
    for account in Account::ALL {
        let balances = results.balances_for(account);
        let first = balances
            .first()
            .ok_or_else(|| EngineError::internal("ledger produced no monthly balances"))?;
        let expected = config.starting_balance(account);
        if !approx_eq(first.opening_balance, expected) {
            return Err(EngineError::invariant(
                "opening-seed",
                account,
                first.opening_balance,
                expected,
            ));
        }
    }
    Ok(())
}

/// Every fiscal-adjacent month pair chains: the next month opens at the
/// prior closing, and each closing equals opening plus net change.
fn check_roll_forward(results: &SimulationResults) -> EngineResult<()> {
    for account in Account::ALL {
        let balances = results.balances_for(account);
        for bucket in &balances {
            let recomputed = bucket.opening_balance + bucket.summary.net_change;
            if !approx_eq(bucket.closing_balance, recomputed) {
                return Err(EngineError::invariant(
                    "roll-forward",
                    account,
                    bucket.closing_balance,
                    recomputed,
                ));
            }
        }
        for pair in balances.windows(2) {
            if !approx_eq(pair[1].opening_balance, pair[0].closing_balance) {
                return Err(EngineError::invariant(
                    "roll-forward",
                    account,
                    pair[1].opening_balance,
                    pair[0].closing_balance,
                ));
            }
        }
    }
    Ok(())
}

/// The last fiscal month's closing equals the starting balance plus the
/// sum of all monthly net changes.
fn check_conservation(config: &FiscalConfig, results: &SimulationResults) -> EngineResult<()> {
    for account in Account::ALL {
        let balances = results.balances_for(account);
        let last = balances
            .last()
            .ok_or_else(|| EngineError::internal("ledger produced no monthly balances"))?;
        let accumulated: Decimal = balances.iter().map(|b| b.summary.net_change).sum();
        let expected = config.starting_balance(account) + accumulated;
        if !approx_eq(last.closing_balance, expected) {
            return Err(EngineError::invariant(
                "conservation",
                account,
                last.closing_balance,
                expected,
            ));
        }
    }
    Ok(())
}

/// Monthly VAT aggregates reconcile with the overall totals.
fn check_vat_consistency(results: &SimulationResults) -> EngineResult<()> {
    let collected: Decimal = results.monthly_totals.iter().map(|m| m.revenue.vat).sum();
    let deductible: Decimal = results
        .monthly_totals
        .iter()
        .map(|m| m.expenses.deductible_vat)
        .sum();
    let overall = &results.overall_totals;

    if !approx_eq(collected, overall.total_vat_collected) {
        return Err(EngineError::invariant(
            "vat-consistency",
            Account::Vat,
            collected,
            overall.total_vat_collected,
        ));
    }
    if !approx_eq(deductible, overall.total_vat_deductible) {
        return Err(EngineError::invariant(
            "vat-consistency",
            Account::Vat,
            deductible,
            overall.total_vat_deductible,
        ));
    }
    let owed = overall.total_vat_collected - overall.total_vat_deductible;
    if !approx_eq(overall.net_vat_owed, owed) {
        return Err(EngineError::invariant(
            "vat-consistency",
            Account::Vat,
            overall.net_vat_owed,
            owed,
        ));
    }
    Ok(())
}
