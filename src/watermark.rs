//! Per-player watermark: creation time of the newest fully processed match.

use crate::error::Result;
use crate::store::Store;

/// Read the watermark. `None` means nothing has been processed yet.
pub async fn read<S: Store>(store: &S, puuid: &str) -> Result<Option<i64>> {
    store.watermark(puuid).await
}

/// Advance the watermark from `current` to `candidate` if that moves it forward.
/// Returns the resulting watermark.
pub async fn advance<S: Store>(
    store: &S,
    puuid: &str,
    current: Option<i64>,
    candidate: Option<i64>,
) -> Result<Option<i64>> {
    match (current, candidate) {
        (_, None) => Ok(current),
        (Some(current), Some(candidate)) if candidate <= current => Ok(Some(current)),
        (_, Some(candidate)) => {
            store.advance_watermark(puuid, candidate).await?;
            log::debug!("Watermark for {} advanced to {}.", puuid, candidate);
            Ok(Some(candidate))
        }
    }
}
