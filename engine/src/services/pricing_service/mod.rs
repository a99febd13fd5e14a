// engine/src/services/pricing_service/mod.rs
// PricingService is the context object callers hold instead of ambient
// globals: it owns the settings and routes each request to its module.
use std::path::Path;
use std::sync::Arc;

use shared::models::{
    ComparisonResult, MarketplaceProfile, PriceBreakdown, PriceForm, PriceInput, ScenarioComparison,
    ScenarioInput, SensitivityAnalysisInput, SensitivityAnalysisResult,
};

use crate::config::PricingSettings;
use crate::data::csv_parser::BrazilianCsvParser;
use crate::error::PricingError;
use crate::models::{BatchItem, BatchOutcome};
use crate::{calculator, marketplace, scenarios, sensitivity};

pub mod price_batch;

#[derive(Debug, Clone)]
pub struct PricingService {
    settings: Arc<PricingSettings>,
}

impl PricingService {
    /// Fails with `ConfigError` when the settings do not validate.
    pub fn new(settings: PricingSettings) -> Result<Self, PricingError> {
        settings.validate()?;
        Ok(PricingService { settings: Arc::new(settings) })
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn calculate(&self, input: &PriceInput) -> Result<PriceBreakdown, PricingError> {
        tracing::debug!(cost = input.cost, margin = input.target_margin_percent, "Calculating price");
        calculator::calculate(input)
    }

    /// Prices raw form fields; unparseable fields count as zero.
    pub fn calculate_from_form(&self, form: &PriceForm) -> Result<PriceBreakdown, PricingError> {
        self.calculate(&form.to_input())
    }

    pub fn compare(&self, base: &PriceInput, profiles: &[MarketplaceProfile]) -> Result<ComparisonResult, PricingError> {
        let ranking = self.settings.comparison.ranking;
        tracing::info!(profiles = profiles.len(), ?ranking, "Comparing marketplaces");
        marketplace::compare(base, profiles, ranking)
    }

    pub fn compare_all_marketplaces(&self, base: &PriceInput) -> Result<ComparisonResult, PricingError> {
        self.compare(base, &marketplace::default_profiles())
    }

    pub fn simulate(&self, scenarios: &[ScenarioInput]) -> Result<ScenarioComparison, PricingError> {
        tracing::info!(scenarios = scenarios.len(), "Simulating scenarios");
        scenarios::simulate(scenarios)
    }

    pub fn analyze(&self, input: &SensitivityAnalysisInput) -> Result<SensitivityAnalysisResult, PricingError> {
        tracing::info!(
            perturbations = self.settings.sensitivity.perturbations.len(),
            volume = input.volume(),
            "Running sensitivity analysis"
        );
        sensitivity::analyze(input, &self.settings.sensitivity)
    }

    pub async fn price_batch(&self, items: Vec<BatchItem>) -> Result<Vec<BatchOutcome>, PricingError> {
        tracing::info!(items = items.len(), "Received batch pricing request, dispatching to handler.");
        price_batch::handle_price_batch(items, self.settings.batch.chunk_size).await
    }

    pub async fn price_csv_file(&self, path: impl AsRef<Path>) -> Result<Vec<BatchOutcome>, PricingError> {
        let path = path.as_ref();
        let delimiter = self.csv_delimiter()?;
        tracing::info!(path = %path.display(), "Loading batch pricing CSV");
        let items = BrazilianCsvParser::load_batch_from_csv(path, delimiter)?;
        self.price_batch(items).await
    }

    pub fn csv_delimiter(&self) -> Result<u8, PricingError> {
        let delimiter = self.settings.batch.csv_delimiter;
        u8::try_from(delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| PricingError::ConfigError(format!("CSV delimiter must be a single ASCII character, got '{}'", delimiter)))
    }
}

impl Default for PricingService {
    fn default() -> Self {
        PricingService { settings: Arc::new(PricingSettings::default()) }
    }
}
