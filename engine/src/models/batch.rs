// Batch pricing rows: one product read from a spreadsheet and its outcome.
use shared::models::{PriceBreakdown, PriceInput};

use crate::error::PricingError;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// 1-based line in the source file, 0 when the item did not come from one.
    pub line: usize,
    pub product: String,
    pub input: PriceInput,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub line: usize,
    pub product: String,
    pub result: Result<PriceBreakdown, PricingError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
