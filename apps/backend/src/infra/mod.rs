//! Infrastructure layer - backend clients, startup registry and timeouts.

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

pub mod cache;
pub mod db;
pub mod registry;
pub mod state;

/// Upper bound for any single call against an external backend.
pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a backend call under [`BACKEND_TIMEOUT`].
pub async fn bounded<T, F>(what: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(BACKEND_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(format!(
            "{what} timed out after {}s",
            BACKEND_TIMEOUT.as_secs()
        ))),
    }
}
