//! Error types for collaborator seams and property loading.
//!
//! "Not applicable" outcomes (wrong container, no property, filtered out)
//! are not errors; see [`SkipReason`](crate::triggers::SkipReason).

use thiserror::Error;

use crate::triggers::DispatchedBuild;

/// Errors from [`JobScheduler`](super::traits::JobScheduler).
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    #[error("scheduling rejected for {job}: {message}")]
    Rejected { job: String, message: String },
    #[error("scheduler unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors from [`PropertyStore`](super::traits::PropertyStore).
#[derive(Debug, Error)]
pub enum PropertyStoreError {
    #[error("property store error: {message}")]
    Store { message: String },
}

/// Errors from parsing a persisted trigger property.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trigger property parse error: {message}")]
    Parse { message: String },
    #[error("invalid trigger property: {message}")]
    Invalid { message: String },
}

/// Errors from [`TriggerDispatcher`](super::triggers::TriggerDispatcher).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// The scheduling collaborator failed for every target. Not retried.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    /// Some targets were queued before another one failed. `dispatched`
    /// lists the queued builds; targets missing from it were not queued.
    #[error("scheduler error after {} build(s) were queued: {source}", .dispatched.len())]
    Partial {
        dispatched: Vec<DispatchedBuild>,
        source: SchedulerError,
    },
    /// The configuration store failed.
    #[error("property store error: {0}")]
    PropertyStore(#[from] PropertyStoreError),
    /// The resolved property belongs to a different container than the job's
    /// parent. Indicates a broken store or host integration.
    #[error("property for {job} resolved from {actual}, expected {expected}")]
    OwnerMismatch {
        job: String,
        expected: String,
        actual: String,
    },
}
