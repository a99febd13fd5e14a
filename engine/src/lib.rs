// Pricing engine library root.

pub mod calculator;
pub mod config;
pub mod data;
pub mod error;
pub mod marketplace;
pub mod models;
pub mod scenarios;
pub mod sensitivity;
pub mod services;

pub use error::PricingError;
pub use services::PricingService;
