// Sensitivity analysis: sweeps one variable at a time and measures how much
// monthly profit moves.
//
// The selling price is back-solved once from the base input. Cost, shipping,
// marketing and fee perturbations keep that price, since a cost shock does not
// reprice a listing by itself. Margin perturbations re-solve the price.
pub mod break_even;

use shared::models::{
    PriceInput, RiskLevel, ScenarioPoint, SensitivityAnalysisInput, SensitivityAnalysisResult,
    SensitivityVariable, SensitivityVariableImpact,
};

use crate::calculator;
use crate::config::SensitivityConfig;
use crate::error::PricingError;

/// Outcome of one perturbed evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Evaluation {
    pub value: f64,
    pub profit: f64,
    pub price_impact: Option<f64>,
}

/// Base figures shared by every sweep of one analysis.
pub(crate) struct ProfitModel<'a> {
    input: &'a SensitivityAnalysisInput,
    base_price: f64,
    base_unit_profit: f64,
}

impl<'a> ProfitModel<'a> {
    pub(crate) fn new(input: &'a SensitivityAnalysisInput) -> Result<Self, PricingError> {
        for (field, value) in [("monthly volume", input.volume()), ("marketing cost", input.marketing())] {
            if !value.is_finite() || value < 0.0 {
                return Err(PricingError::InvalidInput(format!("{} must be a non-negative number, got {}", field, value)));
            }
        }
        let base = calculator::calculate(&input.base)?;
        Ok(ProfitModel {
            input,
            base_price: base.selling_price,
            base_unit_profit: base.profit,
        })
    }

    pub(crate) fn base_profit(&self) -> f64 {
        self.base_unit_profit * self.input.volume() - self.input.marketing()
    }

    pub(crate) fn base_value(&self, variable: SensitivityVariable) -> f64 {
        let base = &self.input.base;
        match variable {
            SensitivityVariable::Cost => base.cost,
            SensitivityVariable::Margin => base.target_margin_percent,
            SensitivityVariable::Volume => self.input.volume(),
            SensitivityVariable::Shipping => base.shipping,
            SensitivityVariable::Marketing => self.input.marketing(),
            SensitivityVariable::Fees => base.tax_percent + base.card_fee_percent,
        }
    }

    // Price holds; only the cost side of the breakdown moves.
    fn at_fixed_price(&self, value: f64, perturbed: PriceInput) -> Evaluation {
        let unit_profit = calculator::breakdown_at_price(&perturbed, self.base_price).profit;
        Evaluation {
            value,
            profit: unit_profit * self.input.volume() - self.input.marketing(),
            price_impact: calculator::calculate(&perturbed).ok().map(|b| b.selling_price - self.base_price),
        }
    }

    /// Profit after changing `variable` by `change_percent`. `None` when the
    /// perturbed margin cannot be priced at all.
    pub(crate) fn evaluate(&self, variable: SensitivityVariable, change_percent: f64) -> Option<Evaluation> {
        let factor = 1.0 + change_percent / 100.0;
        let base = self.input.base;
        let volume = self.input.volume();
        let marketing = self.input.marketing();

        match variable {
            SensitivityVariable::Cost => {
                let perturbed = PriceInput { cost: base.cost * factor, ..base };
                Some(self.at_fixed_price(perturbed.cost, perturbed))
            }
            SensitivityVariable::Shipping => {
                let perturbed = PriceInput { shipping: base.shipping * factor, ..base };
                Some(self.at_fixed_price(perturbed.shipping, perturbed))
            }
            SensitivityVariable::Fees => {
                let perturbed = PriceInput {
                    tax_percent: base.tax_percent * factor,
                    card_fee_percent: base.card_fee_percent * factor,
                    ..base
                };
                Some(self.at_fixed_price(perturbed.tax_percent + perturbed.card_fee_percent, perturbed))
            }
            SensitivityVariable::Margin => {
                let perturbed = PriceInput { target_margin_percent: base.target_margin_percent * factor, ..base };
                let breakdown = calculator::calculate(&perturbed).ok()?;
                Some(Evaluation {
                    value: perturbed.target_margin_percent,
                    profit: breakdown.profit * volume - marketing,
                    price_impact: Some(breakdown.selling_price - self.base_price),
                })
            }
            SensitivityVariable::Volume => Some(Evaluation {
                value: volume * factor,
                profit: self.base_unit_profit * volume * factor - marketing,
                price_impact: Some(0.0),
            }),
            SensitivityVariable::Marketing => Some(Evaluation {
                value: marketing * factor,
                profit: self.base_unit_profit * volume - marketing * factor,
                price_impact: Some(0.0),
            }),
        }
    }
}

pub fn classify_risk(elasticity: f64, config: &SensitivityConfig) -> RiskLevel {
    if elasticity > config.high_risk_elasticity {
        RiskLevel::High
    } else if elasticity > config.medium_risk_elasticity {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Mean of |profit change % / variable change %| over the non-zero changes.
pub fn elasticity(points: &[ScenarioPoint]) -> f64 {
    let ratios: Vec<f64> = points
        .iter()
        .filter(|p| p.change_percent != 0.0)
        .map(|p| (p.profit_change_percent / p.change_percent).abs())
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

fn profit_change_percent(profit: f64, base_profit: f64) -> f64 {
    if base_profit == 0.0 {
        return 0.0;
    }
    (profit - base_profit) / base_profit.abs() * 100.0
}

fn sweep(model: &ProfitModel<'_>, variable: SensitivityVariable, config: &SensitivityConfig) -> SensitivityVariableImpact {
    let base_profit = model.base_profit();
    let points: Vec<ScenarioPoint> = config
        .perturbations
        .iter()
        .filter_map(|&change| {
            let evaluation = model.evaluate(variable, change);
            if evaluation.is_none() {
                tracing::debug!(?variable, change_percent = change, "Perturbed input cannot be priced, skipping point");
            }
            evaluation.map(|e| ScenarioPoint {
                change_percent: change,
                value: e.value,
                profit: e.profit,
                profit_change_percent: profit_change_percent(e.profit, base_profit),
                price_impact: e.price_impact,
            })
        })
        .collect();

    let elasticity = elasticity(&points);
    SensitivityVariableImpact {
        variable,
        base_value: model.base_value(variable),
        points,
        elasticity,
        risk: classify_risk(elasticity, config),
    }
}

pub fn analyze(
    input: &SensitivityAnalysisInput,
    config: &SensitivityConfig,
) -> Result<SensitivityAnalysisResult, PricingError> {
    config.validate()?;
    let model = ProfitModel::new(input)?;

    let impacts: Vec<SensitivityVariableImpact> =
        SensitivityVariable::ALL.iter().map(|&v| sweep(&model, v, config)).collect();
    let break_even_points = SensitivityVariable::ALL
        .iter()
        .map(|&v| break_even::find(&model, v, config))
        .collect();

    // First in enumeration order wins ties.
    let mut most = &impacts[0];
    let mut least = &impacts[0];
    for impact in &impacts[1..] {
        if impact.elasticity > most.elasticity {
            most = impact;
        }
        if impact.elasticity < least.elasticity {
            least = impact;
        }
    }

    tracing::debug!(
        base_price = model.base_price,
        base_profit = model.base_profit(),
        most_sensitive = ?most.variable,
        least_sensitive = ?least.variable,
        "Sensitivity analysis complete"
    );

    Ok(SensitivityAnalysisResult {
        base_price: model.base_price,
        base_profit: model.base_profit(),
        most_sensitive: most.variable,
        least_sensitive: least.variable,
        impacts,
        break_even_points,
    })
}
