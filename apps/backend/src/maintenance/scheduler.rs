//! Recurring background jobs on the tokio runtime.
//!
//! Every job gets its own task driven by a fixed-period interval. The first
//! invocation happens one full period after [`Scheduler::start`]; missed
//! ticks are skipped. A failing or panicking invocation is logged and the job
//! keeps its schedule. Dropping the scheduler cancels every job.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::AppError;

type Task = Arc<dyn Fn() -> BoxFuture<'static, Result<(), AppError>> + Send + Sync>;

struct Job {
    name: String,
    period: Duration,
    task: Task,
}

pub struct Scheduler {
    pending: Vec<Job>,
    running: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
    started: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            running: Vec::new(),
            cancel: CancellationToken::new(),
            started: false,
        }
    }

    /// Register `task` to run every `period`.
    ///
    /// Jobs registered after [`start`](Self::start) begin immediately, with
    /// their first run one period from now.
    pub fn schedule<F, Fut>(
        &mut self,
        name: impl Into<String>,
        period: Duration,
        task: F,
    ) -> Result<(), AppError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let name = name.into();
        if period.is_zero() {
            return Err(AppError::config(format!(
                "job '{name}' needs a non-zero period"
            )));
        }

        let job = Job {
            name,
            period,
            task: Arc::new(move || task().boxed()),
        };
        if self.started {
            self.spawn(job);
        } else {
            self.pending.push(job);
        }
        Ok(())
    }

    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(jobs = self.pending.len(), "scheduler started");
        for job in std::mem::take(&mut self.pending) {
            self.spawn(job);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.cancel.is_cancelled()
    }

    /// Cancel every job and wait for their tasks to finish. An invocation in
    /// flight is abandoned at its next await point.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        let handles = std::mem::take(&mut self.running);
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "scheduler job task ended abnormally");
            }
        }
        if self.started {
            info!("scheduler stopped");
        }
    }

    fn spawn(&mut self, job: Job) {
        let cancel = self.cancel.clone();
        debug!(job = %job.name, period_secs = job.period.as_secs(), "job scheduled");
        self.running.push(tokio::spawn(run_job(job, cancel)));
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_job(job: Job, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + job.period, job.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = invoke(&job) => {}
        }
    }
    debug!(job = %job.name, "job cancelled");
}

/// Run one invocation, absorbing its error or panic.
async fn invoke(job: &Job) {
    let task = Arc::clone(&job.task);
    let outcome = AssertUnwindSafe(async move { task().await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => debug!(job = %job.name, "job run finished"),
        Ok(Err(e)) => error!(
            event = "MaintenanceTaskError",
            job = %job.name,
            error = %e,
            "scheduled job failed"
        ),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(
                event = "MaintenanceTaskError",
                job = %job.name,
                panic = %message,
                "scheduled job panicked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::Scheduler;
    use crate::error::AppError;

    const PERIOD: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn first_run_waits_one_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        scheduler
            .schedule("tick", PERIOD, move || {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(Instant::now());
                    Ok(())
                }
            })
            .unwrap();

        let started = Instant::now();
        scheduler.start();

        let first = rx.recv().await.unwrap();
        assert!(first.duration_since(started) >= PERIOD);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.duration_since(first), PERIOD);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_run_does_not_stop_the_job() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        let counter = Arc::clone(&calls);
        scheduler
            .schedule("flaky", PERIOD, move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let tx = tx.clone();
                async move {
                    let _ = tx.send(n);
                    if n == 0 {
                        Err(AppError::maintenance("first run fails"))
                    } else {
                        Ok(())
                    }
                }
            })
            .unwrap();
        scheduler.start();

        assert_eq!(rx.recv().await, Some(0));
        assert_eq!(rx.recv().await, Some(1));
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_run_does_not_stop_the_job() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        let counter = Arc::clone(&calls);
        scheduler
            .schedule("panicky", PERIOD, move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let tx = tx.clone();
                async move {
                    let _ = tx.send(n);
                    if n == 0 {
                        panic!("boom");
                    }
                    Ok(())
                }
            })
            .unwrap();
        scheduler.start();

        assert_eq!(rx.recv().await, Some(0));
        assert_eq!(rx.recv().await, Some(1));
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_all_jobs() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut scheduler = Scheduler::new();
        scheduler
            .schedule("noop", PERIOD, move || {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(());
                    Ok(())
                }
            })
            .unwrap();
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop().await;
        assert!(!scheduler.is_running());
        // The job's sender is gone once its task has exited.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_cancels_jobs() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        {
            let mut scheduler = Scheduler::new();
            scheduler
                .schedule("noop", PERIOD, move || {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(());
                        Ok(())
                    }
                })
                .unwrap();
            scheduler.start();
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn stop_without_jobs_returns() {
        let mut scheduler = Scheduler::new();
        scheduler.start();
        scheduler.stop().await;
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut scheduler = Scheduler::new();
        let result = scheduler.schedule("spin", Duration::ZERO, || async { Ok(()) });
        assert!(matches!(result, Err(AppError::Config { .. })));
    }
}
