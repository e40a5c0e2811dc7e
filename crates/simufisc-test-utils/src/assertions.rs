//! Assertion macros for balance comparisons at the cent tolerance.

/// Assert two money amounts are equal within one cent.
#[macro_export]
macro_rules! assert_money_eq {
    ($left:expr, $right:expr) => {{
        let left = $left;
        let right = $right;
        assert!(
            simufisc_core::models::approx_eq(left, right),
            "amounts differ beyond tolerance: {} vs {} (delta {})",
            left,
            right,
            left - right
        );
    }};
    ($left:expr, $right:expr, $($context:tt)+) => {{
        let left = $left;
        let right = $right;
        assert!(
            simufisc_core::models::approx_eq(left, right),
            "{}: {} vs {} (delta {})",
            format_args!($($context)+),
            left,
            right,
            left - right
        );
    }};
}

/// Assert an account's final balance in a results value.
#[macro_export]
macro_rules! assert_final_balance {
    ($results:expr, $account:expr, $expected:expr) => {{
        let account = $account;
        let actual = $results
            .overall_totals
            .final_account_balances
            .get(&account)
            .copied()
            .unwrap_or_default();
        $crate::assert_money_eq!(actual, $expected, "final balance of {}", account);
    }};
}
