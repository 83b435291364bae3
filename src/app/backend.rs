//! Bounded calls to the datastore.

use std::future::Future;
use std::time::Duration;

use crate::app::error::AppError;

/// Await a datastore call for at most `limit`.
///
/// Expiry becomes `BackendUnavailable` so callers can offer a retry instead of
/// hanging the request.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AppError::Database(err)),
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "backend call timed out");
            Err(AppError::BackendUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_results() {
        let ok = bounded(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = bounded(Duration::from_secs(1), async {
            Err::<i32, _>(sqlx::Error::RowNotFound)
        })
        .await;
        assert!(matches!(err, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn hung_call_becomes_backend_unavailable() {
        let result = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await;
        assert!(matches!(result, Err(AppError::BackendUnavailable)));
    }
}
