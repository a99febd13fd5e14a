// Scenario simulator: prices each user-defined variant independently and
// summarises how they compare.
use shared::brazilian_format::{format_currency, format_percent};
use shared::models::{ScenarioComparison, ScenarioInput, ScenarioResult, ValueRange};

use crate::calculator;
use crate::error::PricingError;

/// Real margins below this percentage get a warning insight.
pub const LOW_MARGIN_WARNING_PERCENT: f64 = 10.0;

fn simulate_one(scenario: &ScenarioInput) -> Result<ScenarioResult, PricingError> {
    if let Some(volume) = scenario.monthly_volume {
        if !volume.is_finite() || volume < 0.0 {
            return Err(PricingError::InvalidInput(format!("monthly volume must be a non-negative number, got {}", volume)));
        }
    }

    let breakdown = calculator::calculate(&scenario.input)?;
    Ok(ScenarioResult {
        scenario_id: scenario.id.clone(),
        name: scenario.name.clone(),
        color: scenario.color.clone(),
        monthly_volume: scenario.monthly_volume,
        monthly_revenue: scenario.monthly_volume.map(|v| breakdown.selling_price * v),
        monthly_profit: scenario.monthly_volume.map(|v| breakdown.profit * v),
        breakdown,
    })
}

fn value_range(values: impl Iterator<Item = f64>) -> ValueRange {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return ValueRange::default();
    }
    ValueRange { min, max, range: max - min }
}

fn build_insights(results: &[ScenarioResult], best: &ScenarioResult, worst: &ScenarioResult) -> Vec<String> {
    let mut insights = Vec::new();

    if results.len() > 1 && best.scenario_id != worst.scenario_id {
        insights.push(format!(
            "'{}' lucra {} a mais por unidade que '{}'",
            best.name,
            format_currency(best.breakdown.profit - worst.breakdown.profit),
            worst.name
        ));
    }

    let top_monthly = results
        .iter()
        .filter_map(|r| r.monthly_profit.map(|p| (r, p)))
        .fold(None::<(&ScenarioResult, f64)>, |acc, (r, p)| match acc {
            Some((_, best_p)) if best_p >= p => acc,
            _ => Some((r, p)),
        });
    if let Some((r, monthly)) = top_monthly {
        insights.push(format!("Maior lucro mensal: '{}' com {}", r.name, format_currency(monthly)));
    }

    for r in results {
        // A free item has no margin to warn about.
        if r.breakdown.selling_price != 0.0 && r.breakdown.real_margin_percent < LOW_MARGIN_WARNING_PERCENT {
            insights.push(format!(
                "'{}' tem margem real de {}, abaixo de {}",
                r.name,
                format_percent(r.breakdown.real_margin_percent, 2),
                format_percent(LOW_MARGIN_WARNING_PERCENT, 0)
            ));
        }
    }

    insights
}

pub fn simulate(scenarios: &[ScenarioInput]) -> Result<ScenarioComparison, PricingError> {
    if scenarios.is_empty() {
        tracing::debug!("No scenarios to simulate");
        return Ok(ScenarioComparison::default());
    }

    let results = scenarios
        .iter()
        .map(|s| {
            simulate_one(s).map_err(|e| PricingError::Scenario { name: s.name.clone(), source: Box::new(e) })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Strict comparisons keep the earliest scenario on ties.
    let mut best = &results[0];
    let mut worst = &results[0];
    for r in &results[1..] {
        if r.breakdown.profit > best.breakdown.profit {
            best = r;
        }
        if r.breakdown.profit < worst.breakdown.profit {
            worst = r;
        }
    }

    let insights = build_insights(&results, best, worst);
    let comparison = ScenarioComparison {
        best_scenario: Some(best.scenario_id.clone()),
        worst_scenario: Some(worst.scenario_id.clone()),
        price_difference: value_range(results.iter().map(|r| r.breakdown.selling_price)),
        profit_difference: value_range(results.iter().map(|r| r.breakdown.profit)),
        insights,
        results,
    };

    tracing::debug!(
        scenarios = comparison.results.len(),
        price_range = comparison.price_difference.range,
        profit_range = comparison.profit_difference.range,
        "Scenario simulation complete"
    );
    Ok(comparison)
}
