//! Full-run latency benchmarks against the 200 ms soft target.

use criterion::{criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use simufisc_core::models::{Account, ExpenseCategory, FiscalConfig};
use simufisc_engine::{run_simulation, RunnerOptions};
use simufisc_test_utils::{
    monthly_expense, monthly_revenue, quarterly_revenue, test_company, weekday_revenue,
};

fn default_run(c: &mut Criterion) {
    let config = FiscalConfig::new(2024, 4)
        .with_balance(Account::Operating, dec!(10000))
        .with_balance(Account::Savings, dec!(5000));
    let company = test_company();
    let revenue = [
        monthly_revenue("ventes", dec!(12000), 1),
        quarterly_revenue("conseil", dec!(15000), 1),
    ];
    let expenses = [
        monthly_expense("loyer", dec!(2400), ExpenseCategory::Rent, true),
        monthly_expense("abonnements", dec!(600), ExpenseCategory::Subscription, true),
    ];

    c.bench_function("run_monthly_patterns", |b| {
        b.iter(|| {
            run_simulation(&config, &company, &revenue, &expenses, RunnerOptions::default())
                .unwrap()
        })
    });
}

fn daily_pattern_run(c: &mut Criterion) {
    let config = FiscalConfig::new(2024, 1);
    let company = test_company();
    let revenue = [weekday_revenue("comptoir", dec!(350))];

    c.bench_function("run_daily_pattern", |b| {
        b.iter(|| {
            run_simulation(&config, &company, &revenue, &[], RunnerOptions::default()).unwrap()
        })
    });
}

criterion_group!(benches, default_run, daily_pattern_run);
criterion_main!(benches);
