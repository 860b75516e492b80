//! Decimal money helpers.
//!
//! Catalog prices are stored as `NUMERIC` and carried as [`Decimal`] end to
//! end; floats never touch a price.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount for display, e.g. `$12.50`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

/// Percentage saved when a product is on sale, rounded to the nearest whole
/// percent.
///
/// Returns `None` when there is no real discount: a zero or negative list
/// price, or a discount price that is not below the list price.
#[must_use]
pub fn savings_percent(price: Decimal, discount_price: Decimal) -> Option<u32> {
    if price <= Decimal::ZERO || discount_price >= price || discount_price < Decimal::ZERO {
        return None;
    }
    ((price - discount_price) / price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_price_pads_cents() {
        assert_eq!(format_price(dec("12.5")), "$12.50");
        assert_eq!(format_price(dec("0")), "$0.00");
        assert_eq!(format_price(dec("19.999")), "$20.00");
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(savings_percent(dec("100"), dec("75")), Some(25));
        assert_eq!(savings_percent(dec("30"), dec("20")), Some(33));
        assert_eq!(savings_percent(dec("80"), dec("79.5")), Some(1));
    }

    #[test]
    fn test_savings_percent_without_real_discount() {
        assert_eq!(savings_percent(dec("0"), dec("0")), None);
        assert_eq!(savings_percent(dec("10"), dec("10")), None);
        assert_eq!(savings_percent(dec("10"), dec("12")), None);
    }
}
