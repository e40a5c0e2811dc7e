//! End-to-end simulation scenarios with literal expectations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use simufisc_core::calendar::HolidayRegion;
use simufisc_core::models::{Account, ExpenseCategory, Frequency, Pattern, VatRate};
use simufisc_core::traits::{InMemoryPatternStore, PatternStore};
use simufisc_engine::{run_simulation, RunnerOptions, SimulationRunner};
use simufisc_test_utils::{
    assert_final_balance, assert_money_eq, calendar_config, config_with_balances,
    init_test_logging, monthly_expense, monthly_revenue, quarterly_expense, quarterly_revenue,
    test_company, weekday_revenue,
};

#[test]
fn pure_revenue_year() {
    init_test_logging();
    let config = config_with_balances(2024, 1, dec!(1000), dec!(5000), dec!(0), dec!(0));
    let revenue = [
        monthly_revenue("ventes", dec!(12000), 1),
        quarterly_revenue("conseil", dec!(15000), 3),
    ];

    let results =
        run_simulation(&config, &test_company(), &revenue, &[], RunnerOptions::default()).unwrap();

    // 12 x 10 000 net monthly plus 4 x 12 500 net quarterly.
    assert_money_eq!(results.overall_totals.total_revenue.net, dec!(170000));
    assert_final_balance!(results, Account::Operating, dec!(171000));
    assert_final_balance!(results, Account::Savings, dec!(5000));
    assert!(results.overall_totals.total_vat_collected > Decimal::ZERO);
    assert_money_eq!(results.overall_totals.total_vat_collected, dec!(34000));
    assert_final_balance!(results, Account::Vat, dec!(34000));
    assert_money_eq!(results.overall_totals.net_profit, dec!(170000));
}

#[test]
fn pure_expense_year() {
    let config = calendar_config(2024).with_balance(Account::Operating, dec!(50000));
    let expenses = [
        monthly_expense("loyer", dec!(2400), ExpenseCategory::Rent, true),
        monthly_expense("abonnements", dec!(600), ExpenseCategory::Subscription, true),
        quarterly_expense("assurance", dec!(1200), ExpenseCategory::Insurance, false),
    ];

    let results =
        run_simulation(&config, &test_company(), &[], &expenses, RunnerOptions::default())
            .unwrap();

    // Deductible nets: 2 000 and 500 monthly. The non-deductible insurance
    // cannot reclaim VAT, so its whole 1 200 gross is the cost.
    assert_money_eq!(results.overall_totals.total_expenses.net, dec!(34800));
    assert!(results.overall_totals.net_profit < Decimal::ZERO);
    assert!(results.overall_totals.total_vat_deductible > Decimal::ZERO);
    assert_money_eq!(results.overall_totals.total_vat_deductible, dec!(6000));
    assert_final_balance!(results, Account::Operating, dec!(50000) - dec!(34800));
    assert_final_balance!(results, Account::Vat, dec!(-6000));
}

#[test]
fn mixed_vat_with_april_fiscal_year() {
    let config = simufisc_core::models::FiscalConfig::new(2024, 4);
    let revenue = [monthly_revenue("ventes", dec!(6000), 1)];
    let expenses = [
        monthly_expense("equipement", dec!(1200), ExpenseCategory::Equipment, true),
        monthly_expense("repas", dec!(600), ExpenseCategory::Travel, false),
        quarterly_expense("assurance", dec!(800), ExpenseCategory::Insurance, false),
    ];

    let results =
        run_simulation(&config, &test_company(), &revenue, &expenses, RunnerOptions::default())
            .unwrap();

    let first = &results.monthly_totals[0];
    assert_eq!(first.month, 4);
    assert!(first.label.contains("(FY Month 1)"));
    assert_eq!(first.label, "April (FY Month 1)");

    // Collected: 12 x 1 000. Deductible: 12 x 200 on the equipment only.
    assert_money_eq!(results.overall_totals.total_vat_collected, dec!(12000));
    assert_money_eq!(results.overall_totals.total_vat_deductible, dec!(2400));
    assert_money_eq!(results.overall_totals.net_vat_owed, dec!(9600));
}

#[test]
fn july_fiscal_year_with_negative_vat_seed() {
    let config = config_with_balances(2024, 7, dec!(10000), dec!(0), dec!(0), dec!(-2000));
    let revenue = [monthly_revenue("ventes", dec!(3600), 1)];
    let expenses = [monthly_expense("fournitures", dec!(1800), ExpenseCategory::General, true)];

    let results =
        run_simulation(&config, &test_company(), &revenue, &expenses, RunnerOptions::default())
            .unwrap();

    assert_eq!(results.monthly_totals[0].month, 7);
    assert_eq!(results.monthly_totals[11].month, 6);

    // The run only returns after the invariant checks pass; spot-check the
    // VAT chain: -2 000 seed + 12 x 600 collected - 12 x 300 deducted.
    assert_final_balance!(results, Account::Vat, dec!(1600));
    let june_vat = results
        .monthly_balances
        .iter()
        .find(|b| b.account == Account::Vat && b.month == 6)
        .unwrap();
    assert_money_eq!(june_vat.closing_balance, dec!(1600));
}

#[test]
fn daily_override_wins_over_holiday() {
    let labour_day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let config = calendar_config(2024);

    let with_override =
        [weekday_revenue("comptoir", dec!(120)).with_override(labour_day, true, Some("open"))];
    let results = run_simulation(
        &config,
        &test_company(),
        &with_override,
        &[],
        RunnerOptions::default(),
    )
    .unwrap();
    let may_operating = results
        .monthly_balances
        .iter()
        .find(|b| b.account == Account::Operating && b.month == 5)
        .unwrap();
    assert!(may_operating.transactions.iter().any(|t| t.date == labour_day));

    let without_override = [weekday_revenue("comptoir", dec!(120))];
    let results = run_simulation(
        &config,
        &test_company(),
        &without_override,
        &[],
        RunnerOptions::default(),
    )
    .unwrap();
    let may_operating = results
        .monthly_balances
        .iter()
        .find(|b| b.account == Account::Operating && b.month == 5)
        .unwrap();
    assert!(!may_operating.transactions.iter().any(|t| t.date == labour_day));
}

#[test]
fn store_driven_run_and_missing_company() {
    let mut store = InMemoryPatternStore::new();
    store.insert_company(test_company());
    store.insert_pattern("c-test", monthly_revenue("ventes", dec!(1200), 1));
    store.insert_pattern(
        "c-test",
        monthly_expense("loyer", dec!(600), ExpenseCategory::Rent, true),
    );

    let runner = SimulationRunner::new();
    let results = runner
        .run_for_company(
            &store,
            "c-test",
            &calendar_config(2024),
            RunnerOptions::default(),
        )
        .unwrap();
    assert_eq!(results.metadata.total_occurrences, 24);
    assert_money_eq!(results.overall_totals.net_profit, dec!(6000));

    let missing = runner.run_for_company(
        &store,
        "c-ghost",
        &calendar_config(2024),
        RunnerOptions::default(),
    );
    assert!(missing.is_err());
    assert!(store.get_company("c-ghost").is_err());
}

#[test]
fn alsace_region_excludes_good_friday() {
    // Good Friday 2024 is March 29, a regional holiday only.
    let good_friday = NaiveDate::from_ymd_opt(2024, 3, 29).unwrap();
    let config = calendar_config(2024);
    let patterns = [weekday_revenue("comptoir", dec!(120))];

    let national = run_simulation(
        &config,
        &test_company(),
        &patterns,
        &[],
        RunnerOptions::default(),
    )
    .unwrap();
    let march = national
        .monthly_balances
        .iter()
        .find(|b| b.account == Account::Operating && b.month == 3)
        .unwrap();
    assert!(march.transactions.iter().any(|t| t.date == good_friday));

    let regional = run_simulation(
        &config,
        &test_company().with_holiday_region(HolidayRegion::BasRhin),
        &patterns,
        &[],
        RunnerOptions::default(),
    )
    .unwrap();
    let march = regional
        .monthly_balances
        .iter()
        .find(|b| b.account == Account::Operating && b.month == 3)
        .unwrap();
    assert!(!march.transactions.iter().any(|t| t.date == good_friday));
}

#[test]
fn unused_daily_fields_are_ignored_for_monthly_patterns() {
    let config = calendar_config(2024);
    let mut pattern = monthly_revenue("ventes", dec!(1200), 1);
    pattern.days_mask = Some(0);
    pattern.exclude_weekends = true;
    pattern.exclude_holidays = true;

    let results =
        run_simulation(&config, &test_company(), &[pattern], &[], RunnerOptions::default())
            .unwrap();
    assert_eq!(results.metadata.total_occurrences, 12);
}

#[test]
fn unknown_vat_percent_is_rejected() {
    assert!(VatRate::from_percent(dec!(8.5)).is_err());
    assert!(VatRate::from_percent(dec!(20)).is_ok());
}

#[test]
fn frequencies_expand_to_expected_counts() {
    let config = calendar_config(2024);
    let yearly = Pattern::revenue(
        "prime",
        "Prime annuelle",
        dec!(1200),
        Frequency::Yearly,
        9,
        VatRate::Intermediate,
    );
    let results =
        run_simulation(&config, &test_company(), &[yearly], &[], RunnerOptions::default())
            .unwrap();
    assert_eq!(results.metadata.total_occurrences, 1);
    let september = &results.monthly_totals[8];
    assert_eq!(september.month, 9);
    assert!(september.revenue.gross == dec!(1200));
}
