// Break-even search along one variable's perturbation axis.
use shared::models::{BreakEvenPoint, SensitivityVariable};

use super::ProfitModel;
use crate::config::SensitivityConfig;

// Profits within a fraction of a cent of zero count as break-even.
const ZERO_PROFIT_EPSILON: f64 = 1e-9;
const MAX_BISECTION_STEPS: usize = 200;

/// Percent change, in the direction that erodes profit, at which monthly
/// profit reaches zero. Relies on profit being monotonic in each variable:
/// cost, shipping, marketing and fees push it down as they rise; margin and
/// volume push it down as they fall.
pub(crate) fn find(model: &ProfitModel<'_>, variable: SensitivityVariable, config: &SensitivityConfig) -> BreakEvenPoint {
    let decreasing = variable.raises_profit();
    let bound = if decreasing { 100.0 } else { config.max_break_even_search_percent };

    let crossing = search(model, variable, decreasing, bound, config.break_even_tolerance);
    if crossing.is_none() {
        tracing::debug!(?variable, bound, "Profit stays positive across the search range");
    }

    let (max_increase, max_decrease) = if decreasing { (None, crossing) } else { (crossing, None) };
    BreakEvenPoint { variable, max_increase, max_decrease }
}

fn search(
    model: &ProfitModel<'_>,
    variable: SensitivityVariable,
    decreasing: bool,
    bound: f64,
    tolerance: f64,
) -> Option<f64> {
    if model.base_profit() <= ZERO_PROFIT_EPSILON {
        return Some(0.0);
    }

    let is_broken = |magnitude: f64| {
        let change = if decreasing { -magnitude } else { magnitude };
        model
            .evaluate(variable, change)
            .map(|e| e.profit <= ZERO_PROFIT_EPSILON)
    };

    if is_broken(bound) != Some(true) {
        return None;
    }

    // Invariant: profit is positive at `lo` and non-positive at `hi`.
    let (mut lo, mut hi) = (0.0_f64, bound);
    for _ in 0..MAX_BISECTION_STEPS {
        if hi - lo <= tolerance {
            break;
        }
        let mid = (lo + hi) / 2.0;
        match is_broken(mid) {
            Some(true) => hi = mid,
            Some(false) => lo = mid,
            None => return None,
        }
    }
    Some((lo + hi) / 2.0)
}
