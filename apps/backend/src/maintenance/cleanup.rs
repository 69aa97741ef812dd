use std::time::Duration;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::config::backends::MaintenanceConfig;
use crate::error::AppError;
use crate::infra::registry::Backends;
use crate::storage::ObjectStorage;

pub const PURGE_JOB: &str = "purge_expired_objects";

/// Delete every object under `prefix` older than `max_age` at `now`.
///
/// Returns how many objects were removed. A failed deletion does not stop the
/// sweep; the run is reported as failed once every candidate was tried.
pub async fn purge_expired_objects(
    storage: &ObjectStorage,
    prefix: &str,
    max_age: Duration,
    now: OffsetDateTime,
) -> Result<usize, AppError> {
    let max_age = time::Duration::try_from(max_age)
        .map_err(|e| AppError::maintenance(format!("max age out of range: {e}")))?;
    let cutoff = now
        .checked_sub(max_age)
        .ok_or_else(|| AppError::maintenance("max age reaches before the earliest date"))?;

    let candidates = storage.list_older_than(prefix, cutoff).await?;
    let total = candidates.len();
    let mut deleted = 0usize;
    let mut failed = 0usize;

    for object in candidates {
        match storage.delete_file(&object.name).await {
            Ok(()) => deleted += 1,
            Err(e) => {
                failed += 1;
                warn!(file = %object.name, error = %e, "could not purge object");
            }
        }
    }

    info!(
        job = PURGE_JOB,
        bucket = storage.bucket(),
        prefix,
        deleted,
        failed,
        "expired objects purged"
    );

    if failed > 0 {
        return Err(AppError::maintenance(format!(
            "{failed} of {total} expired objects could not be deleted"
        )));
    }
    Ok(deleted)
}

/// One scheduled run: resolve the object store and purge it.
pub async fn run_purge(backends: &Backends, config: &MaintenanceConfig) -> Result<(), AppError> {
    let storage = backends.object_storage()?;
    purge_expired_objects(
        storage,
        &config.prefix,
        config.max_age,
        OffsetDateTime::now_utc(),
    )
    .await
    .map(|_| ())
}
