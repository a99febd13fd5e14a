use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::brazilian_format::parse_input_value;

/// Raw pricing parameters for a single product. Percentages are expressed
/// over the final selling price, not over cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInput {
    pub cost: f64,
    pub target_margin_percent: f64,
    pub tax_percent: f64,
    pub card_fee_percent: f64,
    pub shipping: f64,
    pub other_costs: f64,
    pub include_shipping: bool,
}

impl Default for PriceInput {
    fn default() -> Self {
        PriceInput {
            cost: 0.0,
            target_margin_percent: 0.0,
            tax_percent: 0.0,
            card_fee_percent: 0.0,
            shipping: 0.0,
            other_costs: 0.0,
            include_shipping: true,
        }
    }
}

/// Form fields as typed by the user, before locale parsing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceForm {
    pub cost: String,
    pub target_margin_percent: String,
    pub tax_percent: String,
    pub card_fee_percent: String,
    pub shipping: String,
    pub other_costs: String,
    pub include_shipping: bool,
}

impl PriceForm {
    pub fn to_input(&self) -> PriceInput {
        PriceInput {
            cost: parse_input_value(&self.cost),
            target_margin_percent: parse_input_value(&self.target_margin_percent),
            tax_percent: parse_input_value(&self.tax_percent),
            card_fee_percent: parse_input_value(&self.card_fee_percent),
            shipping: parse_input_value(&self.shipping),
            other_costs: parse_input_value(&self.other_costs),
            include_shipping: self.include_shipping,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub cost_value: f64,
    pub other_costs_value: f64,
    pub shipping_value: f64,
    pub margin_amount: f64,
    pub tax_amount: f64,
    pub card_fee_amount: f64,
    pub total_cost: f64,
    pub selling_price: f64,
    pub profit: f64,
    pub real_margin_percent: f64,
}

// Sales channels with a known fee policy. Profiles are looked up through
// `marketplace::profile` in the engine crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketplaceId {
    Amazon,
    Americanas,
    Magalu,
    MercadoLivreClassico,
    MercadoLivrePremium,
    Shopee,
    LojaPropria,
}

impl MarketplaceId {
    pub const ALL: [MarketplaceId; 7] = [
        MarketplaceId::Amazon,
        MarketplaceId::Americanas,
        MarketplaceId::Magalu,
        MarketplaceId::MercadoLivreClassico,
        MarketplaceId::MercadoLivrePremium,
        MarketplaceId::Shopee,
        MarketplaceId::LojaPropria,
    ];

    /// Stable slug, also used as the ranking tie-breaker.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketplaceId::Amazon => "amazon",
            MarketplaceId::Americanas => "americanas",
            MarketplaceId::Magalu => "magalu",
            MarketplaceId::MercadoLivreClassico => "mercado_livre_classico",
            MarketplaceId::MercadoLivrePremium => "mercado_livre_premium",
            MarketplaceId::Shopee => "shopee",
            MarketplaceId::LojaPropria => "loja_propria",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.as_str() == slug)
    }
}

impl std::fmt::Display for MarketplaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceProfile {
    pub id: MarketplaceId,
    pub name: String,
    pub fee_percent: f64,
    pub fixed_fee: f64,
    pub payment_fee_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    #[default]
    LowestFees,
    HighestProfit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceResult {
    pub marketplace_id: MarketplaceId,
    pub marketplace_name: String,
    pub breakdown: PriceBreakdown,
    pub fixed_fee: f64,
    pub total_fees: f64,
    pub profit: f64,
    pub rank: usize,
    pub is_recommended: bool,
    pub profit_difference: f64,
    pub profit_difference_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub ranking: RankingMode,
    pub results: Vec<MarketplaceResult>,
    /// Profiles left out because their fees make the target margin unreachable.
    pub infeasible: Vec<MarketplaceId>,
}

impl ComparisonResult {
    pub fn recommended(&self) -> Option<&MarketplaceResult> {
        self.results.iter().find(|r| r.is_recommended)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub id: String,
    pub name: String,
    pub input: PriceInput,
    pub monthly_volume: Option<f64>,
    /// Display-only.
    pub color: String,
}

impl ScenarioInput {
    pub fn new(name: impl Into<String>, input: PriceInput) -> Self {
        ScenarioInput {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            input,
            monthly_volume: None,
            color: "#3b82f6".to_string(),
        }
    }

    pub fn with_monthly_volume(mut self, volume: f64) -> Self {
        self.monthly_volume = Some(volume);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario_id: String,
    pub name: String,
    pub color: String,
    pub breakdown: PriceBreakdown,
    pub monthly_volume: Option<f64>,
    pub monthly_revenue: Option<f64>,
    pub monthly_profit: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub results: Vec<ScenarioResult>,
    pub best_scenario: Option<String>,
    pub worst_scenario: Option<String>,
    pub price_difference: ValueRange,
    pub profit_difference: ValueRange,
    pub insights: Vec<String>,
}

impl ScenarioComparison {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn result(&self, scenario_id: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.scenario_id == scenario_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    Cost,
    Margin,
    Volume,
    Shipping,
    Marketing,
    Fees,
}

impl SensitivityVariable {
    pub const ALL: [SensitivityVariable; 6] = [
        SensitivityVariable::Cost,
        SensitivityVariable::Margin,
        SensitivityVariable::Volume,
        SensitivityVariable::Shipping,
        SensitivityVariable::Marketing,
        SensitivityVariable::Fees,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SensitivityVariable::Cost => "Custo do produto",
            SensitivityVariable::Margin => "Margem desejada",
            SensitivityVariable::Volume => "Volume mensal",
            SensitivityVariable::Shipping => "Frete",
            SensitivityVariable::Marketing => "Marketing",
            SensitivityVariable::Fees => "Impostos e taxas",
        }
    }

    /// Whether raising this variable raises profit.
    pub fn raises_profit(&self) -> bool {
        matches!(self, SensitivityVariable::Margin | SensitivityVariable::Volume)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPoint {
    pub change_percent: f64,
    pub value: f64,
    pub profit: f64,
    pub profit_change_percent: f64,
    /// Price change needed to keep the target margin, `None` if unreachable.
    pub price_impact: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityVariableImpact {
    pub variable: SensitivityVariable,
    pub base_value: f64,
    pub points: Vec<ScenarioPoint>,
    pub elasticity: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenPoint {
    pub variable: SensitivityVariable,
    /// Percent increase at which profit reaches zero.
    pub max_increase: Option<f64>,
    /// Percent decrease at which profit reaches zero.
    pub max_decrease: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysisInput {
    pub base: PriceInput,
    pub monthly_volume: Option<f64>,
    /// Monthly marketing spend, subtracted from the volume-weighted profit.
    pub marketing_cost: Option<f64>,
}

impl SensitivityAnalysisInput {
    pub fn volume(&self) -> f64 {
        self.monthly_volume.unwrap_or(1.0)
    }

    pub fn marketing(&self) -> f64 {
        self.marketing_cost.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysisResult {
    pub base_price: f64,
    pub base_profit: f64,
    pub impacts: Vec<SensitivityVariableImpact>,
    pub break_even_points: Vec<BreakEvenPoint>,
    pub most_sensitive: SensitivityVariable,
    pub least_sensitive: SensitivityVariable,
}

impl SensitivityAnalysisResult {
    pub fn impact(&self, variable: SensitivityVariable) -> Option<&SensitivityVariableImpact> {
        self.impacts.iter().find(|i| i.variable == variable)
    }

    pub fn break_even(&self, variable: SensitivityVariable) -> Option<&BreakEvenPoint> {
        self.break_even_points.iter().find(|b| b.variable == variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_slug_round_trip() {
        for id in MarketplaceId::ALL {
            assert_eq!(MarketplaceId::from_slug(id.as_str()), Some(id));
        }
        assert_eq!(MarketplaceId::from_slug("ebay"), None);
    }

    #[test]
    fn test_price_input_serializes_camel_case() {
        let input = PriceInput { cost: 10.0, ..PriceInput::default() };
        let json = serde_json::to_value(input).unwrap();
        assert_eq!(json["cost"], 10.0);
        assert_eq!(json["targetMarginPercent"], 0.0);
        assert_eq!(json["includeShipping"], true);
    }

    #[test]
    fn test_price_form_parses_brazilian_fields() {
        let form = PriceForm {
            cost: "R$ 1.234,56".to_string(),
            target_margin_percent: "20".to_string(),
            tax_percent: "6,5".to_string(),
            card_fee_percent: "".to_string(),
            shipping: "abc".to_string(),
            other_costs: "12.5".to_string(),
            include_shipping: false,
        };
        let input = form.to_input();
        assert_eq!(input.cost, 1234.56);
        assert_eq!(input.target_margin_percent, 20.0);
        assert_eq!(input.tax_percent, 6.5);
        assert_eq!(input.card_fee_percent, 0.0);
        assert_eq!(input.shipping, 0.0);
        assert_eq!(input.other_costs, 12.5);
        assert!(!input.include_shipping);
    }

    #[test]
    fn test_scenario_input_builder() {
        let scenario = ScenarioInput::new("Promo", PriceInput::default())
            .with_monthly_volume(150.0)
            .with_color("#ff0000");
        assert_eq!(scenario.name, "Promo");
        assert_eq!(scenario.monthly_volume, Some(150.0));
        assert_eq!(scenario.color, "#ff0000");
        assert!(Uuid::parse_str(&scenario.id).is_ok());
    }

    #[test]
    fn test_sensitivity_direction() {
        assert!(SensitivityVariable::Margin.raises_profit());
        assert!(SensitivityVariable::Volume.raises_profit());
        assert!(!SensitivityVariable::Cost.raises_profit());
        assert!(!SensitivityVariable::Fees.raises_profit());
    }
}
