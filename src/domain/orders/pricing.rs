//! Shipping and tax by billing country.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::round_cents;

/// Orders at or above this subtotal ship free.
fn free_shipping_threshold() -> Decimal {
    Decimal::from(100)
}

pub fn shipping_for(subtotal: Decimal, country: &str) -> Decimal {
    if subtotal >= free_shipping_threshold() {
        return Decimal::ZERO;
    }
    let rate = match country {
        "US" => 10,
        "CA" => 15,
        "UK" => 12,
        "AU" => 18,
        "DE" | "FR" => 14,
        _ => 20,
    };
    Decimal::from(rate)
}

/// Tax rate as a fraction of the subtotal.
pub fn tax_rate(country: &str) -> Decimal {
    let percent = match country {
        "US" => 8,
        "CA" => 13,
        "UK" | "FR" => 20,
        "AU" => 10,
        "DE" => 19,
        _ => 5,
    };
    Decimal::new(percent, 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Quote {
    /// Each amount is rounded to cents on its own; the total is summed before rounding.
    pub fn new(subtotal: Decimal, country: &str) -> Self {
        let shipping = shipping_for(subtotal, country);
        let tax = subtotal * tax_rate(country);
        Quote {
            subtotal: round_cents(subtotal),
            shipping: round_cents(shipping),
            tax: round_cents(tax),
            total: round_cents(subtotal + shipping + tax),
        }
    }
}
