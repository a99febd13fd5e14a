// Batch pricing: fans inputs out over tokio's blocking pool.
use tokio::task::JoinHandle;

use crate::calculator;
use crate::error::PricingError;
use crate::models::{BatchItem, BatchOutcome};

fn price_item(item: BatchItem) -> BatchOutcome {
    let result = calculator::calculate(&item.input);
    if let Err(e) = &result {
        tracing::debug!(line = item.line, product = %item.product, error = %e, "Batch row could not be priced");
    }
    BatchOutcome { line: item.line, product: item.product, result }
}

/// Prices every item, `chunk_size` items per blocking task. Outcomes come back
/// in input order; a row that fails to price does not stop the batch.
pub async fn handle_price_batch(items: Vec<BatchItem>, chunk_size: usize) -> Result<Vec<BatchOutcome>, PricingError> {
    if chunk_size == 0 {
        return Err(PricingError::BatchError("chunk size must be greater than 0".to_string()));
    }

    let total = items.len();
    let mut handles: Vec<JoinHandle<Vec<BatchOutcome>>> = Vec::with_capacity(total / chunk_size + 1);
    let mut remaining = items.into_iter();
    loop {
        let chunk: Vec<BatchItem> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        handles.push(tokio::task::spawn_blocking(move || chunk.into_iter().map(price_item).collect()));
    }

    let mut outcomes = Vec::with_capacity(total);
    for handle in handles {
        let part = handle
            .await
            .map_err(|e| PricingError::BatchError(format!("Batch worker failed: {}", e)))?;
        outcomes.extend(part);
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    tracing::info!(total, failed, chunk_size, "Batch pricing finished");
    Ok(outcomes)
}
