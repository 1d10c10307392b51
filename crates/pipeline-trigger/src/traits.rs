//! Collaborator interfaces implemented by the host.
//!
//! The core never reaches into host globals. Everything it needs from the
//! outside world arrives through one of these traits.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::*;
use super::parameters::ParameterValue;
use super::types::PipelineTriggerProperty;

// ---------------------------------------------------------------------------
// JobScheduler
// ---------------------------------------------------------------------------

/// Queues builds of downstream jobs.
///
/// `schedule` only enqueues; it must not wait for the build to run. The
/// dispatcher does not retry a failed call.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn schedule(
        &self,
        job: &str,
        parameters: Vec<ParameterValue>,
        quiet_period_secs: u32,
    ) -> Result<(), SchedulerError>;
}

// ---------------------------------------------------------------------------
// PropertyStore
// ---------------------------------------------------------------------------

/// A trigger property together with the container it was read from.
#[derive(Debug, Clone)]
pub struct StoredProperty {
    /// Full name of the owning container.
    pub owner: String,
    pub property: Arc<PipelineTriggerProperty>,
}

/// Where per-container trigger configuration lives.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// The property configured on `container`, if any.
    async fn get(&self, container: &str) -> Result<Option<StoredProperty>, PropertyStoreError>;

    /// Replace the property configured on `container`.
    async fn put(
        &self,
        container: &str,
        property: PipelineTriggerProperty,
    ) -> Result<(), PropertyStoreError>;

    /// Remove the property from `container`. Removing nothing is not an error.
    async fn remove(&self, container: &str) -> Result<(), PropertyStoreError>;
}

// ---------------------------------------------------------------------------
// JobCatalog
// ---------------------------------------------------------------------------

/// Permissions relevant to picking downstream jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Read,
    Build,
}

/// Enumerates jobs known to the host, for auto-completion.
pub trait JobCatalog: Send + Sync {
    /// Full names of all jobs, in the host's order.
    fn list_jobs(&self) -> Vec<String>;

    /// Whether the current user holds `permission` on `job`.
    fn has_permission(&self, job: &str, permission: Permission) -> bool;
}
