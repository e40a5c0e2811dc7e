//! Money helpers on top of `rust_decimal`.
//!
//! Addition, subtraction, and multiplication by an integer are exact.
//! Division rounds half-away-from-zero at the cent. Two amounts are
//! considered equal for invariant purposes when they differ by at most
//! one cent.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Tolerance for balance comparisons.
pub const CENT_TOLERANCE: Decimal = dec!(0.01);

/// Round an amount to the cent, half-away-from-zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compare two amounts within the cent tolerance.
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= CENT_TOLERANCE
}

/// Split a gross amount into `(net, vat)` for a VAT rate given as a
/// fraction (20% -> 0.20).
///
/// `vat = gross * r / (1 + r)` rounded at the cent; `net = gross - vat`,
/// so the parts always sum back to the gross amount.
pub fn split_gross(gross: Decimal, rate_fraction: Decimal) -> (Decimal, Decimal) {
    if rate_fraction.is_zero() {
        return (gross, Decimal::ZERO);
    }
    let vat = round_cents(gross * rate_fraction / (Decimal::ONE + rate_fraction));
    (gross - vat, vat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_standard_rate() {
        let (net, vat) = split_gross(dec!(12000), dec!(0.20));
        assert_eq!(net, dec!(10000));
        assert_eq!(vat, dec!(2000));
    }

    #[test]
    fn split_reduced_rate() {
        let (net, vat) = split_gross(dec!(1055), dec!(0.055));
        assert_eq!(vat, dec!(55));
        assert_eq!(net, dec!(1000));
    }

    #[test]
    fn split_zero_rate() {
        let (net, vat) = split_gross(dec!(600), Decimal::ZERO);
        assert_eq!(net, dec!(600));
        assert_eq!(vat, Decimal::ZERO);
    }

    #[test]
    fn split_parts_sum_to_gross() {
        for gross in [dec!(0.01), dec!(0.07), dec!(99.99), dec!(1234.56)] {
            let (net, vat) = split_gross(gross, dec!(0.20));
            assert_eq!(net + vat, gross);
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_cents(dec!(1.005)), dec!(1.01));
        assert_eq!(round_cents(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_cents(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn approx_eq_tolerates_one_cent() {
        assert!(approx_eq(dec!(100.00), dec!(100.01)));
        assert!(!approx_eq(dec!(100.00), dec!(100.02)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn split_never_loses_cents(
                cents in 1i64..=10_000_000,
                rate in prop_oneof![
                    Just(Decimal::ZERO),
                    Just(dec!(0.055)),
                    Just(dec!(0.10)),
                    Just(dec!(0.20)),
                ],
            ) {
                let gross = Decimal::new(cents, 2);
                let (net, vat) = split_gross(gross, rate);
                prop_assert_eq!(net + vat, gross);
                prop_assert!(vat >= Decimal::ZERO);
                prop_assert!(net >= Decimal::ZERO);
                prop_assert_eq!(vat.scale().max(2), 2);
            }
        }
    }
}
