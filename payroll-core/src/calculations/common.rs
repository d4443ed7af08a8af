//! Money helpers shared by the calculator and the presentation layer.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary value to cents, half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1449.995)), dec!(1450.00));
/// assert_eq!(round_half_up(dec!(1449.994)), dec!(1449.99));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `percent` % of `base`, unrounded.
///
/// `None` when the product does not fit in a [`Decimal`].
pub fn percent_of(
    base: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    base.checked_mul(percent)?.checked_div(Decimal::ONE_HUNDRED)
}

/// Formats a money amount with exactly two decimals, e.g. `35000.00`.
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn contribution_cents_round_half_away_from_zero() {
        assert_eq!(round_half_up(dec!(99.999)), dec!(100.00));
        assert_eq!(round_half_up(dec!(1218.0045)), dec!(1218.00));
        assert_eq!(round_half_up(dec!(1218.005)), dec!(1218.01));
        assert_eq!(round_half_up(dec!(-1218.005)), dec!(-1218.01));
    }

    #[test]
    fn percent_of_keeps_full_precision() {
        assert_eq!(percent_of(dec!(333.33), dec!(2.9)), Some(dec!(9.66657)));
    }

    #[test]
    fn percent_of_zero_rate_is_zero() {
        assert_eq!(percent_of(dec!(50000.00), dec!(0)), Some(Decimal::ZERO));
    }

    #[test]
    fn percent_of_huge_salary_is_none() {
        assert_eq!(percent_of(Decimal::MAX, dec!(30)), None);
        assert_eq!(percent_of(Decimal::MAX, dec!(1)), Some(Decimal::MAX / dec!(100)));
    }

    #[test]
    fn format_money_pads_to_two_decimals() {
        assert_eq!(format_money(dec!(35000)), "35000.00");
        assert_eq!(format_money(dec!(9.66657)), "9.67");
        assert_eq!(format_money(dec!(0.1)), "0.10");
    }
}
