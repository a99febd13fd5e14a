// Engine settings, loaded from a JSON file or falling back to defaults.
use std::path::Path;

use serde::Deserialize;
use shared::models::RankingMode;

use crate::error::PricingError;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PricingSettings {
    pub comparison: ComparisonSettings,
    pub sensitivity: SensitivityConfig,
    pub batch: BatchSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ComparisonSettings {
    pub ranking: RankingMode,
}

/// Policy knobs of the sensitivity analyzer.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Percent changes applied to each variable, e.g. `-10.0` for a 10% cut.
    pub perturbations: Vec<f64>,
    /// Elasticity strictly above this is at least medium risk.
    pub medium_risk_elasticity: f64,
    /// Elasticity strictly above this is high risk.
    pub high_risk_elasticity: f64,
    /// Largest increase, in percent, probed when looking for a break-even.
    pub max_break_even_search_percent: f64,
    /// Bisection stops once the bracket is narrower than this (percent points).
    pub break_even_tolerance: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        SensitivityConfig {
            perturbations: vec![-50.0, -20.0, -10.0, 10.0, 20.0, 50.0],
            medium_risk_elasticity: 1.0,
            high_risk_elasticity: 2.0,
            max_break_even_search_percent: 1000.0,
            break_even_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BatchSettings {
    /// Inputs handed to one blocking task.
    pub chunk_size: usize,
    pub csv_delimiter: char,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            chunk_size: 256,
            csv_delimiter: ';',
        }
    }
}

impl SensitivityConfig {
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.perturbations.is_empty() {
            return Err(PricingError::ConfigError("sensitivity perturbations must not be empty".to_string()));
        }
        if self.perturbations.iter().any(|p| !p.is_finite()) {
            return Err(PricingError::ConfigError("sensitivity perturbations must be finite".to_string()));
        }
        if !(self.medium_risk_elasticity >= 0.0 && self.medium_risk_elasticity <= self.high_risk_elasticity) {
            return Err(PricingError::ConfigError(format!(
                "risk thresholds must satisfy 0 <= medium ({}) <= high ({})",
                self.medium_risk_elasticity, self.high_risk_elasticity
            )));
        }
        if !(self.max_break_even_search_percent > 0.0 && self.max_break_even_search_percent.is_finite()) {
            return Err(PricingError::ConfigError("max_break_even_search_percent must be positive".to_string()));
        }
        if !(self.break_even_tolerance > 0.0) {
            return Err(PricingError::ConfigError("break_even_tolerance must be positive".to_string()));
        }
        Ok(())
    }
}

impl PricingSettings {
    pub fn from_json_str(json: &str) -> Result<Self, PricingError> {
        let settings: PricingSettings = serde_json::from_str(json)
            .map_err(|e| PricingError::ConfigError(format!("Invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PricingError::ConfigError(format!("Failed to read settings file '{}': {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        self.sensitivity.validate()?;
        if !self.batch.csv_delimiter.is_ascii() {
            return Err(PricingError::ConfigError(format!("csv_delimiter must be ASCII, got '{}'", self.batch.csv_delimiter)));
        }
        if self.batch.chunk_size == 0 {
            return Err(PricingError::ConfigError("batch chunk_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = PricingSettings::default();
        assert_eq!(settings.comparison.ranking, RankingMode::LowestFees);
        assert_eq!(settings.sensitivity.perturbations.len(), 6);
        assert_eq!(settings.batch.csv_delimiter, ';');
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = PricingSettings::from_json_str(
            r#"{ "comparison": { "ranking": "highest_profit" }, "sensitivity": { "perturbations": [-5.0, 5.0] } }"#,
        )
        .unwrap();
        assert_eq!(settings.comparison.ranking, RankingMode::HighestProfit);
        assert_eq!(settings.sensitivity.perturbations, vec![-5.0, 5.0]);
        assert_eq!(settings.sensitivity.high_risk_elasticity, 2.0);
        assert_eq!(settings.batch.chunk_size, 256);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let result = PricingSettings::from_json_str(
            r#"{ "sensitivity": { "medium_risk_elasticity": 3.0, "high_risk_elasticity": 2.0 } }"#,
        );
        assert!(matches!(result, Err(PricingError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_non_finite_perturbations() {
        let config = SensitivityConfig { perturbations: vec![f64::NAN, 10.0], ..SensitivityConfig::default() };
        assert!(matches!(config.validate(), Err(PricingError::ConfigError(msg)) if msg.contains("finite")));
    }

    #[test]
    fn test_rejects_empty_perturbations() {
        let result = PricingSettings::from_json_str(r#"{ "sensitivity": { "perturbations": [] } }"#);
        assert!(matches!(result, Err(PricingError::ConfigError(msg)) if msg.contains("empty")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "batch": {{ "chunk_size": 8, "csv_delimiter": "," }} }}"#).unwrap();
        let settings = PricingSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.batch.chunk_size, 8);
        assert_eq!(settings.batch.csv_delimiter, ',');
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = PricingSettings::load_from_file("does/not/exist.json");
        assert!(matches!(result, Err(PricingError::ConfigError(msg)) if msg.contains("does/not/exist.json")));
    }
}
