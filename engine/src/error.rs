use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error(
        "Infeasible pricing: margin ({margin_percent}%) + tax ({tax_percent}%) + card fee ({card_fee_percent}%) reach 100% of the selling price"
    )]
    InfeasiblePricing {
        margin_percent: f64,
        tax_percent: f64,
        card_fee_percent: f64,
    },

    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),

    #[error("Scenario '{name}' failed: {source}")]
    Scenario {
        name: String,
        #[source]
        source: Box<PricingError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Batch processing error: {0}")]
    BatchError(String),
}

impl PricingError {
    /// Errors caused by what the user typed, shown next to the form rather
    /// than reported as failures.
    pub fn is_validation(&self) -> bool {
        match self {
            PricingError::InfeasiblePricing { .. } | PricingError::InvalidInput(_) => true,
            PricingError::Scenario { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let infeasible = PricingError::InfeasiblePricing { margin_percent: 60.0, tax_percent: 30.0, card_fee_percent: 10.0 };
        assert!(infeasible.is_validation());
        assert!(infeasible.to_string().contains("margin (60%)"));

        let wrapped = PricingError::Scenario { name: "Agressivo".to_string(), source: Box::new(infeasible) };
        assert!(wrapped.is_validation());
        assert!(wrapped.to_string().starts_with("Scenario 'Agressivo' failed"));

        assert!(!PricingError::BatchError("worker panicked".to_string()).is_validation());
    }
}
