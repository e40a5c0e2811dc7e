//! Double-entry postings derived from an occurrence's amounts.
//!
//! Revenue posts its net to the operating account and its VAT to the VAT
//! account. An expense posts its net out of the operating account; its VAT
//! leaves the VAT account only when the expense is deductible.

use rust_decimal::Decimal;

use simufisc_core::models::{Account, AccountPosting, OccurrenceKind};

/// Build the ordered postings for one occurrence.
///
/// Descriptions are informational human strings derived from the pattern
/// name, not semantic identifiers.
pub fn build_postings(
    kind: OccurrenceKind,
    pattern_name: &str,
    net: Decimal,
    vat: Decimal,
    vat_deductible: bool,
) -> Vec<AccountPosting> {
    match kind {
        OccurrenceKind::Revenue => vec![
            AccountPosting::new(Account::Operating, net, format!("{pattern_name} (net)")),
            AccountPosting::new(Account::Vat, vat, format!("{pattern_name} (TVA collectée)")),
        ],
        OccurrenceKind::Expense => {
            let mut postings = vec![AccountPosting::new(
                Account::Operating,
                -net,
                format!("{pattern_name} (net)"),
            )];
            if vat_deductible && vat > Decimal::ZERO {
                postings.push(AccountPosting::new(
                    Account::Vat,
                    -vat,
                    format!("{pattern_name} (TVA déductible)"),
                ));
            }
            postings
        }
    }
}
