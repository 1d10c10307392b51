//! Host-facing entry point for item lifecycle notifications.

use tokio::sync::mpsc;

use crate::types::{JobRef, PullRequestInfo, TriggerEvent};

/// Turns host notifications into [`TriggerEvent`]s on a channel drained by
/// [`TriggerDispatcher::run`](super::TriggerDispatcher::run).
///
/// Sending does not wait for dispatch. Once the dispatcher side is gone,
/// notifications are dropped with a debug log.
#[derive(Debug, Clone)]
pub struct ItemListener {
    event_tx: mpsc::Sender<TriggerEvent>,
}

impl ItemListener {
    pub fn new(event_tx: mpsc::Sender<TriggerEvent>) -> Self {
        Self { event_tx }
    }

    /// A job was created, usually by branch indexing.
    pub async fn on_created(&self, job: JobRef) {
        self.send(TriggerEvent::job_created(job)).await;
    }

    pub async fn on_deleted(&self, job: JobRef, pull_request: Option<PullRequestInfo>) {
        self.send(TriggerEvent::job_deleted(job, pull_request)).await;
    }

    pub async fn on_branch_deleted(&self, job: JobRef, pull_request: Option<PullRequestInfo>) {
        self.send(TriggerEvent::branch_deleted(job, pull_request))
            .await;
    }

    pub async fn on_run_deleted(&self, job: JobRef, pull_request: Option<PullRequestInfo>) {
        self.send(TriggerEvent::run_deleted(job, pull_request)).await;
    }

    async fn send(&self, event: TriggerEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            tracing::debug!(
                job = %e.0.job.full_name,
                kind = %e.0.kind,
                "trigger dispatcher is gone, dropping event"
            );
        }
    }
}
