//! Company and fiscal configuration inputs.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::HolidayRegion;
use crate::models::Account;

/// Kind of fiscal year a company declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearKind {
    /// Fiscal year coincides with the calendar year.
    Calendar,
    /// Fiscal year starts at a configured month other than January.
    Fiscal,
}

impl FiscalYearKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalYearKind::Calendar => "calendar",
            FiscalYearKind::Fiscal => "fiscal",
        }
    }
}

/// Immutable company record. The engine reads `id` and `holiday_region`;
/// the remaining fields are opaque context validated for presence only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub legal_form: String,
    pub activity_sector: String,
    pub capital: String,
    pub bank_partner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<FiscalYearKind>,
    #[serde(default)]
    pub holiday_region: HolidayRegion,
}

impl Company {
    /// Create a company with the national holiday region.
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            legal_form: String::new(),
            activity_sector: String::new(),
            capital: String::new(),
            bank_partner: String::new(),
            fiscal_year: None,
            holiday_region: HolidayRegion::France,
        }
    }

    pub fn with_profile(
        mut self,
        legal_form: impl Into<String>,
        activity_sector: impl Into<String>,
        capital: impl Into<String>,
        bank_partner: impl Into<String>,
    ) -> Self {
        self.legal_form = legal_form.into();
        self.activity_sector = activity_sector.into();
        self.capital = capital.into();
        self.bank_partner = bank_partner.into();
        self
    }

    pub fn with_fiscal_year(mut self, kind: FiscalYearKind) -> Self {
        self.fiscal_year = Some(kind);
        self
    }

    pub fn with_holiday_region(mut self, region: HolidayRegion) -> Self {
        self.holiday_region = region;
        self
    }
}

/// Fiscal configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalConfig {
    /// Target year, bounded to `2020..=2030` by the runner.
    pub year: i32,
    /// Calendar month the fiscal year starts at (`1..=12`).
    pub fiscal_start_month: u32,
    /// Per-account opening balances; absent accounts start at zero.
    #[serde(default)]
    pub starting_balances: BTreeMap<Account, Decimal>,
}

impl FiscalConfig {
    pub fn new(year: i32, fiscal_start_month: u32) -> Self {
        Self {
            year,
            fiscal_start_month,
            starting_balances: BTreeMap::new(),
        }
    }

    pub fn with_balance(mut self, account: Account, amount: Decimal) -> Self {
        self.starting_balances.insert(account, amount);
        self
    }

    /// Starting balance for an account, defaulting to zero.
    pub fn starting_balance(&self, account: Account) -> Decimal {
        self.starting_balances
            .get(&account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn starting_balance_defaults_to_zero() {
        let config = FiscalConfig::new(2024, 1).with_balance(Account::Operating, dec!(1000));
        assert_eq!(config.starting_balance(Account::Operating), dec!(1000));
        assert_eq!(config.starting_balance(Account::Savings), Decimal::ZERO);
    }

    #[test]
    fn company_builder_sets_profile() {
        let company = Company::new("c-1", "u-1", "Boulangerie Martin")
            .with_profile("SARL", "commerce", "10000", "Crédit Agricole")
            .with_fiscal_year(FiscalYearKind::Fiscal)
            .with_holiday_region(HolidayRegion::Moselle);
        assert_eq!(company.legal_form, "SARL");
        assert_eq!(company.fiscal_year, Some(FiscalYearKind::Fiscal));
        assert_eq!(company.holiday_region, HolidayRegion::Moselle);
    }

    #[test]
    fn company_region_defaults_on_deserialize() {
        let json = r#"{
            "id": "c-1", "user_id": "u-1", "name": "Atelier",
            "legal_form": "EI", "activity_sector": "artisanat",
            "capital": "5000", "bank_partner": "BNP"
        }"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.holiday_region, HolidayRegion::France);
        assert_eq!(company.fiscal_year, None);
    }
}
