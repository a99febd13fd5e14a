// Core price calculator: back-solves the selling price from a target margin
// expressed over the final price.
use shared::models::{PriceBreakdown, PriceInput};

use crate::error::PricingError;

/// Sum of the price-proportional percentages (margin + tax + card fee).
pub fn price_share_percent(input: &PriceInput) -> f64 {
    input.target_margin_percent + input.tax_percent + input.card_fee_percent
}

pub fn total_cost(input: &PriceInput) -> f64 {
    let shipping = if input.include_shipping { input.shipping } else { 0.0 };
    input.cost + input.other_costs + shipping
}

pub fn validate(input: &PriceInput) -> Result<(), PricingError> {
    let amounts = [("cost", input.cost), ("shipping", input.shipping), ("other costs", input.other_costs)];
    for (field, value) in amounts {
        if !value.is_finite() || value < 0.0 {
            return Err(PricingError::InvalidInput(format!("{} must be a non-negative number, got {}", field, value)));
        }
    }

    let percents = [
        ("target margin", input.target_margin_percent),
        ("tax", input.tax_percent),
        ("card fee", input.card_fee_percent),
    ];
    for (field, value) in percents {
        if !value.is_finite() {
            return Err(PricingError::InvalidInput(format!("{} percent must be a finite number, got {}", field, value)));
        }
    }
    Ok(())
}

/// Selling price at which margin, tax and card fee, all taken over the price,
/// leave exactly the total cost.
pub fn calculate(input: &PriceInput) -> Result<PriceBreakdown, PricingError> {
    validate(input)?;

    let share = price_share_percent(input);
    let denominator = 1.0 - share / 100.0;
    if share >= 100.0 || denominator <= 0.0 {
        return Err(PricingError::InfeasiblePricing {
            margin_percent: input.target_margin_percent,
            tax_percent: input.tax_percent,
            card_fee_percent: input.card_fee_percent,
        });
    }

    let selling_price = total_cost(input) / denominator;
    Ok(breakdown_at_price(input, selling_price))
}

/// Breakdown for a selling price fixed from outside, e.g. a price already
/// published while costs move.
pub fn breakdown_at_price(input: &PriceInput, selling_price: f64) -> PriceBreakdown {
    let shipping_value = if input.include_shipping { input.shipping } else { 0.0 };
    let total_cost = total_cost(input);

    let margin_amount = selling_price * input.target_margin_percent / 100.0;
    let tax_amount = selling_price * input.tax_percent / 100.0;
    let card_fee_amount = selling_price * input.card_fee_percent / 100.0;
    let profit = selling_price - total_cost - tax_amount - card_fee_amount;
    let real_margin_percent = if selling_price != 0.0 { profit / selling_price * 100.0 } else { 0.0 };

    PriceBreakdown {
        cost_value: input.cost,
        other_costs_value: input.other_costs,
        shipping_value,
        margin_amount,
        tax_amount,
        card_fee_amount,
        total_cost,
        selling_price,
        profit,
        real_margin_percent,
    }
}

// Presentation rounding to cents.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: f64, b: f64, tolerance: f64) {
        assert!((a - b).abs() < tolerance, "{} != {} (tolerance {})", a, b, tolerance);
    }

    fn input(cost: f64, margin: f64, tax: f64, card_fee: f64) -> PriceInput {
        PriceInput {
            cost,
            target_margin_percent: margin,
            tax_percent: tax,
            card_fee_percent: card_fee,
            shipping: 0.0,
            other_costs: 0.0,
            include_shipping: true,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let breakdown = calculate(&input(100.0, 20.0, 10.0, 5.0)).unwrap();
        // 100 / (1 - 0.20 - 0.10 - 0.05) = 100 / 0.65
        assert_close(breakdown.selling_price, 100.0 / 0.65, EPSILON);
        assert_eq!(round_currency(breakdown.selling_price), 153.85);
        assert_eq!(round_currency(breakdown.tax_amount), 15.38);
        assert_eq!(round_currency(breakdown.card_fee_amount), 7.69);
        assert_eq!(round_currency(breakdown.profit), 30.77);
        assert_close(breakdown.real_margin_percent, 20.0, 1e-6);
        assert_close(breakdown.margin_amount, breakdown.profit, 1e-6);
        assert_eq!(breakdown.total_cost, 100.0);
    }

    #[test]
    fn test_calculate_is_deterministic() {
        let base = PriceInput { shipping: 12.5, other_costs: 3.2, ..input(87.3, 17.5, 8.25, 4.99) };
        let first = calculate(&base).unwrap();
        let second = calculate(&base).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.selling_price.to_bits(), second.selling_price.to_bits());
    }

    #[test]
    fn test_breakdown_parts_sum_to_price() {
        for cost in [0.5, 10.0, 99.99, 1234.56] {
            for margin in [-10.0, 0.0, 15.0, 40.0] {
                for tax in [0.0, 6.0, 18.0] {
                    for fee in [0.0, 3.5, 12.0] {
                        let p = PriceInput { shipping: 20.0, other_costs: 4.0, ..input(cost, margin, tax, fee) };
                        let b = calculate(&p).unwrap();
                        assert_close(b.profit + b.total_cost + b.tax_amount + b.card_fee_amount, b.selling_price, 1e-9 * b.selling_price.max(1.0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_profit_never_rises_with_cost() {
        // At a fixed selling price.
        let mut previous = f64::INFINITY;
        for step in 0..50 {
            let b = breakdown_at_price(&input(10.0 + step as f64 * 7.5, 25.0, 12.0, 4.0), 200.0);
            assert!(b.profit <= previous);
            previous = b.profit;
        }
    }

    #[test]
    fn test_profit_never_falls_with_margin() {
        let mut previous = f64::NEG_INFINITY;
        for margin in 0..80 {
            let b = calculate(&input(50.0, margin as f64, 10.0, 5.0)).unwrap();
            assert!(b.profit >= previous, "profit dropped at margin {}", margin);
            previous = b.profit;
        }
    }

    #[test]
    fn test_infeasible_boundary() {
        assert!(matches!(calculate(&input(100.0, 50.0, 30.0, 20.0)), Err(PricingError::InfeasiblePricing { .. })));
        assert!(matches!(calculate(&input(100.0, 80.0, 30.0, 20.0)), Err(PricingError::InfeasiblePricing { .. })));
        assert!(calculate(&input(100.0, 49.99, 30.0, 20.0)).is_ok());
    }

    #[test]
    fn test_shipping_only_counts_when_included() {
        let with = PriceInput { shipping: 30.0, ..input(100.0, 20.0, 0.0, 0.0) };
        let without = PriceInput { include_shipping: false, ..with };
        let a = calculate(&with).unwrap();
        let b = calculate(&without).unwrap();
        assert_eq!(a.shipping_value, 30.0);
        assert_eq!(b.shipping_value, 0.0);
        assert_close(a.total_cost, 130.0, EPSILON);
        assert_close(b.total_cost, 100.0, EPSILON);
        assert!(a.selling_price > b.selling_price);
    }

    #[test]
    fn test_zero_cost_yields_zero_price() {
        let b = calculate(&input(0.0, 20.0, 10.0, 5.0)).unwrap();
        assert_eq!(b.selling_price, 0.0);
        assert_eq!(b.profit, 0.0);
        assert_eq!(b.real_margin_percent, 0.0);
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        assert!(matches!(calculate(&input(-1.0, 20.0, 0.0, 0.0)), Err(PricingError::InvalidInput(_))));
        assert!(matches!(calculate(&input(f64::NAN, 20.0, 0.0, 0.0)), Err(PricingError::InvalidInput(_))));
        assert!(matches!(calculate(&input(10.0, f64::INFINITY, 0.0, 0.0)), Err(PricingError::InvalidInput(_))));
        let negative_shipping = PriceInput { shipping: -5.0, ..input(10.0, 20.0, 0.0, 0.0) };
        assert!(matches!(calculate(&negative_shipping), Err(PricingError::InvalidInput(_))));
    }
}
