//! Pre-built companies, fiscal configurations, and patterns.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use simufisc_core::calendar::HolidayRegion;
use simufisc_core::models::{
    Account, Company, ExpenseCategory, FiscalConfig, FiscalYearKind, Frequency, Pattern, VatRate,
};

/// Company passing runner validation, national holiday region.
pub fn test_company() -> Company {
    Company::new("c-test", "u-test", "Boulangerie Martin")
        .with_profile("SARL", "commerce", "10000", "Crédit Agricole")
        .with_fiscal_year(FiscalYearKind::Calendar)
}

/// Company located in an Alsace-Moselle department.
pub fn alsace_company() -> Company {
    test_company().with_holiday_region(HolidayRegion::BasRhin)
}

/// Calendar-year fiscal configuration with no starting balances.
pub fn calendar_config(year: i32) -> FiscalConfig {
    FiscalConfig::new(year, 1)
}

/// Fiscal configuration with all four starting balances.
pub fn config_with_balances(
    year: i32,
    fiscal_start_month: u32,
    operating: Decimal,
    savings: Decimal,
    personal: Decimal,
    vat: Decimal,
) -> FiscalConfig {
    FiscalConfig::new(year, fiscal_start_month)
        .with_balance(Account::Operating, operating)
        .with_balance(Account::Savings, savings)
        .with_balance(Account::Personal, personal)
        .with_balance(Account::Vat, vat)
}

/// Monthly revenue at the standard VAT rate.
pub fn monthly_revenue(id: &str, gross: Decimal, start_month: u32) -> Pattern {
    Pattern::revenue(
        id,
        format!("Ventes {id}"),
        gross,
        Frequency::Monthly,
        start_month,
        VatRate::Standard,
    )
}

/// Quarterly revenue at the standard VAT rate.
pub fn quarterly_revenue(id: &str, gross: Decimal, start_month: u32) -> Pattern {
    Pattern::revenue(
        id,
        format!("Prestations {id}"),
        gross,
        Frequency::Quarterly,
        start_month,
        VatRate::Standard,
    )
}

/// Monthly expense at the standard VAT rate.
pub fn monthly_expense(
    id: &str,
    gross: Decimal,
    category: ExpenseCategory,
    vat_deductible: bool,
) -> Pattern {
    Pattern::expense(
        id,
        format!("Charge {id}"),
        gross,
        Frequency::Monthly,
        1,
        category,
        vat_deductible,
    )
}

/// Quarterly expense.
pub fn quarterly_expense(
    id: &str,
    gross: Decimal,
    category: ExpenseCategory,
    vat_deductible: bool,
) -> Pattern {
    Pattern::expense(
        id,
        format!("Charge {id}"),
        gross,
        Frequency::Quarterly,
        1,
        category,
        vat_deductible,
    )
}

/// Daily weekday revenue with weekend and holiday exclusion.
pub fn weekday_revenue(id: &str, gross: Decimal) -> Pattern {
    Pattern::revenue(
        id,
        format!("Ventes comptoir {id}"),
        gross,
        Frequency::Daily,
        1,
        VatRate::Standard,
    )
    .with_days_mask(simufisc_core::models::DAYS_MASK_WEEKDAYS)
    .excluding_weekends()
    .excluding_holidays()
}

/// Gross amount whose standard-rate VAT split is exact at the cent.
pub fn exact_gross(multiple: u32) -> Decimal {
    dec!(6) * Decimal::from(multiple)
}
