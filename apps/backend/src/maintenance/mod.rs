//! Background maintenance: the job scheduler and the jobs it runs.

pub mod cleanup;
pub mod scheduler;

use std::sync::Arc;

pub use cleanup::{purge_expired_objects, run_purge, PURGE_JOB};
pub use scheduler::Scheduler;

use crate::config::backends::MaintenanceConfig;
use crate::error::AppError;
use crate::infra::registry::Backends;

/// Register the daily object purge on `scheduler`.
pub fn schedule_purge(
    scheduler: &mut Scheduler,
    backends: Arc<Backends>,
    config: MaintenanceConfig,
) -> Result<(), AppError> {
    let period = config.period;
    let config = Arc::new(config);
    scheduler.schedule(PURGE_JOB, period, move || {
        let backends = Arc::clone(&backends);
        let config = Arc::clone(&config);
        async move { run_purge(&backends, &config).await }
    })
}
