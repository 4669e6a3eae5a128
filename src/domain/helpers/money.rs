use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to whole cents, halves away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_tenths(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(round_cents(Decimal::new(2345, 3)), Decimal::new(235, 2));
        assert_eq!(round_cents(Decimal::new(2344, 3)), Decimal::new(234, 2));
        assert_eq!(round_cents(Decimal::new(-2345, 3)), Decimal::new(-235, 2));
        assert_eq!(round_tenths(Decimal::new(425, 2)), Decimal::new(43, 1));
    }
}
