//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization. The tax is rounded exactly once, on the
//! order subtotal, never per line.

use rust_decimal::prelude::*;

use crate::db::models::CartItem;

/// Sales tax rate: 8.25%
pub const TAX_RATE: Decimal = Decimal::from_parts(825, 0, 0, false, 4);

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Computed order totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total: unit price × quantity, rounded to cents.
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(round_money(to_decimal(unit_price) * Decimal::from(quantity)))
}

/// Compute subtotal, tax and total for a cart.
///
/// subtotal = Σ(price × qty); tax = round(subtotal × 8.25%); total is their
/// exact sum, so `subtotal + tax == total` holds in Decimal space.
pub fn compute_totals(items: &[CartItem]) -> OrderTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| to_decimal(item.product.price) * Decimal::from(item.quantity))
        .sum();
    let subtotal = round_money(subtotal);
    let tax = round_money(subtotal * TAX_RATE);
    let total = subtotal + tax;
    OrderTotals {
        subtotal: to_f64(subtotal),
        tax: to_f64(tax),
        total: to_f64(total),
    }
}

/// Convert a decimal amount to minor currency units (cents).
///
/// Payment processor APIs take integers; fractional cents must never reach
/// them. Returns None for non-finite or out-of-range input.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    (to_decimal(amount) * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ProductSnapshot;

    fn cart_item(price: f64, quantity: i32) -> CartItem {
        CartItem {
            product: ProductSnapshot {
                id: 1,
                name: "Brisket Plate".into(),
                price,
            },
            quantity,
            special_instructions: None,
        }
    }

    #[test]
    fn worked_example_from_two_lines() {
        // qty 1 @ $10.00, qty 2 @ $5.00
        let totals = compute_totals(&[cart_item(10.00, 1), cart_item(5.00, 2)]);
        assert_eq!(totals.subtotal, 20.00);
        assert_eq!(totals.tax, 1.65);
        assert_eq!(totals.total, 21.65);
    }

    #[test]
    fn subtotal_plus_tax_equals_total_exactly() {
        let carts: Vec<Vec<CartItem>> = vec![
            vec![cart_item(19.99, 1)],
            vec![cart_item(0.99, 3), cart_item(12.49, 2)],
            vec![cart_item(7.77, 7)],
        ];
        for cart in carts {
            let t = compute_totals(&cart);
            assert_eq!(to_decimal(t.subtotal) + to_decimal(t.tax), to_decimal(t.total));
        }
    }

    #[test]
    fn tax_is_rounded_once_on_subtotal() {
        // 3 × $0.10: per-line tax would round each 0.00825 down to 0.01/0.00
        // differently than taxing the 0.30 subtotal (0.02475 → 0.02).
        let t = compute_totals(&[cart_item(0.10, 3)]);
        assert_eq!(t.subtotal, 0.30);
        assert_eq!(t.tax, 0.02);
        assert_eq!(t.total, 0.32);
    }

    #[test]
    fn minor_units_conversion() {
        assert_eq!(to_minor_units(21.65), Some(2165));
        assert_eq!(to_minor_units(10.00), Some(1000));
        assert_eq!(to_minor_units(0.0), Some(0));
        assert_eq!(to_minor_units(f64::NAN), None);
        assert_eq!(to_minor_units(-1.0), None);
    }

    #[test]
    fn line_total_rounds_to_cents() {
        assert_eq!(line_total(5.00, 2), 10.00);
        assert_eq!(line_total(0.99, 3), 2.97);
    }
}
