// Batch runner: prices a products CSV and prints the priced sheet to stdout.
use anyhow::Context;
use chrono::Utc;
use pricing_engine::config::PricingSettings;
use pricing_engine::data::export::{self, ExportMetadata};
use pricing_engine::PricingService;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean CSV.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let settings = match std::env::var("PRICING_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading pricing settings");
            PricingSettings::load_from_file(&path).with_context(|| format!("Failed to load settings from {}", path))?
        }
        Err(_) => PricingSettings::default(),
    };

    let input_path = std::env::args().nth(1).context("usage: pricing-engine <produtos.csv>")?;
    let service = PricingService::new(settings)?;
    let delimiter = service.csv_delimiter()?;

    let outcomes = service
        .price_csv_file(&input_path)
        .await
        .with_context(|| format!("Failed to price {}", input_path))?;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    let metadata = ExportMetadata::new("Precificação em lote", Utc::now()).with_delimiter(delimiter);
    export::write_batch(std::io::stdout().lock(), &outcomes, &metadata)?;

    info!(path = %input_path, priced = outcomes.len() - failed, failed, "Batch pricing complete");
    Ok(())
}
