//! Background purge of expired OTP records
//!
//! Expiry is judged lazily at verification time, so stale records linger
//! until the identity requests a new code. This service removes them on a
//! fixed interval when enabled.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::errors::OtpResult;
use crate::services::otp::OtpStore;

/// Periodic removal of expired records from an [`OtpStore`]
pub struct PurgeService<S: OtpStore + 'static> {
    store: Arc<S>,
}

impl<S: OtpStore + 'static> PurgeService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run a single purge cycle
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records removed
    /// * `Err(OtpError)` - If the store could not be purged
    pub async fn run_once(&self) -> OtpResult<u64> {
        let removed = self.store.purge_expired().await?;
        if removed > 0 {
            info!(
                removed,
                backend = %self.store.backend(),
                event = "otp_purged",
                "Purged expired OTP records"
            );
        } else {
            debug!(backend = %self.store.backend(), "No expired OTP records to purge");
        }
        Ok(removed)
    }

    /// Start purging as a background task
    ///
    /// The first cycle runs immediately. Failed cycles are logged and the
    /// loop carries on. The task stops when the returned handle is dropped.
    pub fn spawn(self, every: Duration) -> PurgeHandle {
        let task = tokio::spawn(async move {
            info!(interval_seconds = every.as_secs(), "OTP purge service started");

            let mut timer = tokio::time::interval(every);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                timer.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "OTP purge cycle failed");
                }
            }
        });

        PurgeHandle { task: Some(task) }
    }
}

/// Handle to a running purge task; aborts the task on drop
#[derive(Debug)]
pub struct PurgeHandle {
    task: Option<JoinHandle<()>>,
}

impl PurgeHandle {
    /// Stop the task and wait for it to wind down
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // A cancelled JoinError is the expected result here
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PurgeHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
