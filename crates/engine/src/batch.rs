use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use regforge_core::{BatchHandle, BatchResult, BatchState, CancelToken, RegError, RegistrationConfig};
use regforge_mailbox::MailboxFactory;

use crate::driver::DriverFactory;
use crate::events::EventSink;
use crate::job::run_attempt;
use crate::stats::{BatchHistory, BatchRecord};
use crate::store::AccountStore;
use crate::userdata::generate_user_data;

/// Fixed delay between retry attempts of one job.
pub const RETRY_DELAY: Duration = Duration::from_millis(3_000);
/// Fixed pacing delay between consecutive jobs of one worker.
pub const JOB_PACING_DELAY: Duration = Duration::from_millis(5_000);

/// Runs batches of registration jobs under a concurrency cap. Workers share
/// a single atomic next-index counter and a cancellation token; everything
/// else is worker-local.
#[derive(Clone)]
pub struct BatchRunner {
    config: Arc<RegistrationConfig>,
    mailboxes: Arc<dyn MailboxFactory>,
    drivers: Arc<dyn DriverFactory>,
    store: Arc<AccountStore>,
    events: EventSink,
    history: Arc<Mutex<BatchHistory>>,
    retry_delay: Duration,
    pacing_delay: Duration,
}

impl BatchRunner {
    pub fn new(
        config: Arc<RegistrationConfig>,
        mailboxes: Arc<dyn MailboxFactory>,
        drivers: Arc<dyn DriverFactory>,
        store: Arc<AccountStore>,
        events: EventSink,
    ) -> Self {
        Self {
            config,
            mailboxes,
            drivers,
            store,
            events,
            history: Arc::new(Mutex::new(BatchHistory::default())),
            retry_delay: RETRY_DELAY,
            pacing_delay: JOB_PACING_DELAY,
        }
    }

    /// Override the fixed delays (tests).
    pub fn with_delays(mut self, retry_delay: Duration, pacing_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self.pacing_delay = pacing_delay;
        self
    }

    /// Cross-batch aggregate, bounded history window.
    pub fn history(&self) -> Arc<Mutex<BatchHistory>> {
        Arc::clone(&self.history)
    }

    /// Run `count` registration jobs under the configured concurrency cap.
    /// Returns once every worker has stopped; a cancelled batch returns the
    /// partial counts, not an error. Only config validation fails here.
    pub async fn run_batch(&self, count: usize, handle: &BatchHandle) -> Result<BatchResult, RegError> {
        self.config.validate()?;
        if count < 1 {
            return Err(RegError::Config("account count must be at least 1".into()));
        }

        handle.set_state(BatchState::Running);
        let next_index = Arc::new(AtomicUsize::new(0));
        let results = Arc::new(RwLock::new(BatchResult::default()));
        let worker_count = self.config.concurrency.min(count);

        info!(count, workers = worker_count, "starting batch");
        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let runner = self.clone();
            let next_index = Arc::clone(&next_index);
            let results = Arc::clone(&results);
            let cancel = handle.token();
            workers.push(tokio::spawn(async move {
                runner.worker_loop(worker_id, count, next_index, results, cancel).await;
            }));
        }

        for worker in workers {
            if let Err(e) = worker.await {
                error!("worker task failed: {}", e);
            }
        }

        let result = results.read().await.clone();
        let cancelled = handle.is_cancelled();
        handle.set_state(if cancelled { BatchState::Cancelled } else { BatchState::Completed });

        self.history.lock().await.record(BatchRecord {
            result: result.clone(),
            requested: count,
            cancelled,
            finished_at: Utc::now(),
        });

        if cancelled {
            self.events.warn(format!(
                "batch cancelled: ✓ {} ✗ {} ({} retries), {} of {} completed",
                result.success, result.failed, result.retried, result.completed(), count
            ));
        } else {
            self.events.info(format!(
                "batch complete: ✓ {} ✗ {} ({} retries)",
                result.success, result.failed, result.retried
            ));
        }
        Ok(result)
    }

    async fn worker_loop(
        &self,
        worker_id: usize,
        count: usize,
        next_index: Arc<AtomicUsize>,
        results: Arc<RwLock<BatchResult>>,
        cancel: CancelToken,
    ) {
        loop {
            // Checkpoint: no new job once cancellation is observed.
            if cancel.is_cancelled() {
                break;
            }
            let index = next_index.fetch_add(1, Ordering::SeqCst);
            if index >= count {
                break;
            }
            let job_no = index + 1;
            self.events.info(format!("--- starting account {}/{} ---", job_no, count));

            let mut user = generate_user_data();
            let mut success = false;
            let mut attempts = 0u32;
            let mut abandoned = false;

            while !success && attempts <= self.config.max_retries {
                if attempts > 0 {
                    // Checkpoint: no new retry once cancellation is observed.
                    if cancel.is_cancelled() {
                        abandoned = true;
                        break;
                    }
                    results.write().await.retried += 1;
                    self.events.warn(format!(
                        "retry {}/{} for account {}",
                        attempts, self.config.max_retries, job_no
                    ));
                    tokio::time::sleep(self.retry_delay).await;
                    if cancel.is_cancelled() {
                        abandoned = true;
                        break;
                    }
                }

                let mut mailbox = self.mailboxes.create();
                let mut driver = self.drivers.create();
                let outcome = run_attempt(
                    &self.config,
                    &mut user,
                    mailbox.as_mut(),
                    driver.as_mut(),
                    &self.store,
                    &self.events,
                    job_no,
                    attempts + 1,
                )
                .await;
                attempts += 1;
                success = outcome.success;
            }

            // Only jobs that reached a terminal state are counted; a job
            // interrupted between attempts is neither success nor failure.
            if !abandoned {
                let mut counters = results.write().await;
                if success {
                    counters.success += 1;
                } else {
                    counters.failed += 1;
                }
            }

            if cancel.is_cancelled() {
                info!(worker_id, "worker stopping on cancellation");
                break;
            }

            if next_index.load(Ordering::SeqCst) < count {
                tokio::time::sleep(self.pacing_delay).await;
            }
        }
    }
}
