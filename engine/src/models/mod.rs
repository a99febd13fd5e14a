// Engine-side models. Pricing inputs and results shared with front-ends live
// in `shared::models`.
pub mod batch;

pub use batch::{BatchItem, BatchOutcome};
