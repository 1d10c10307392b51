//! In-memory collaborators for tests.
//!
//! Available under `cfg(test)` and with the `test-support` feature.
//!
//! ```rust,ignore
//! let scheduler = Arc::new(RecordingScheduler::new());
//! let dispatcher = TriggerDispatcher::new(store, scheduler.clone());
//! dispatcher.dispatch(&event).await?;
//! assert_eq!(scheduler.calls().len(), 1);
//! ```

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::SchedulerError;
use crate::parameters::ParameterValue;
use crate::traits::JobScheduler;

/// One recorded call to [`JobScheduler::schedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCall {
    pub job: String,
    pub parameters: Vec<ParameterValue>,
    pub quiet_period_secs: u32,
}

/// Scheduler that records calls instead of queueing builds.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    calls: Mutex<Vec<ScheduledCall>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `schedule` call for `job` fail with
    /// [`SchedulerError::Rejected`]. Failed calls are still recorded.
    pub fn fail_for(&self, job: &str) {
        self.failing.lock().insert(job.to_string());
    }

    pub fn calls(&self) -> Vec<ScheduledCall> {
        self.calls.lock().clone()
    }

    /// Recorded job names, sorted. Dispatch order is not guaranteed.
    pub fn scheduled_jobs(&self) -> Vec<String> {
        let mut jobs: Vec<String> = self.calls.lock().iter().map(|c| c.job.clone()).collect();
        jobs.sort();
        jobs
    }
}

#[async_trait]
impl JobScheduler for RecordingScheduler {
    async fn schedule(
        &self,
        job: &str,
        parameters: Vec<ParameterValue>,
        quiet_period_secs: u32,
    ) -> Result<(), SchedulerError> {
        self.calls.lock().push(ScheduledCall {
            job: job.to_string(),
            parameters,
            quiet_period_secs,
        });
        if self.failing.lock().contains(job) {
            return Err(SchedulerError::Rejected {
                job: job.to_string(),
                message: "configured to fail".into(),
            });
        }
        Ok(())
    }
}
