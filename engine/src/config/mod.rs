pub mod settings;

pub use settings::{BatchSettings, ComparisonSettings, PricingSettings, SensitivityConfig};
