//! Pipeline trigger — job selection and dispatch for multibranch pipelines.
//!
//! When a branch job of a multibranch project is created, or a job, branch,
//! or run is deleted, the project's [`PipelineTriggerProperty`] decides
//! whether downstream jobs are scheduled and with which parameters:
//!
//! 1. the job must be a direct child of a multibranch project;
//! 2. the project must carry a trigger property;
//! 3. the job name must pass the property's include/exclude wildcard
//!    filters ([`FilterPolicy`]);
//! 4. the parameters are built ([`ParameterBuilder`]) and every resolved
//!    target is handed to the host's [`JobScheduler`].
//!
//! The crate has no dependency on the host. Persistence, scheduling, and
//! the job registry are reached through the traits in [`traits`].

pub mod catalog;
pub mod config;
pub mod defaults;
pub mod errors;
pub mod filter;
pub mod matcher;
pub mod parameters;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod traits;
pub mod triggers;
pub mod types;

// Re-export public types at the crate level.

// catalog
pub use catalog::autocomplete;

// config
pub use config::{DispatcherConfig, QUIET_PERIOD_SECS};

// defaults
pub use defaults::{FilePropertyStore, InMemoryJobCatalog, InMemoryPropertyStore};

// errors
pub use errors::{ConfigError, DispatchError, PropertyStoreError, SchedulerError};

// filter / matcher
pub use filter::{FilterDecision, FilterPolicy};
pub use matcher::{CompiledPattern, WildcardMatcher};

// parameters
pub use parameters::{ParameterBuilder, ParameterValue, EVENT_MARKER_PARAMETER};

// test_support
#[cfg(any(test, feature = "test-support"))]
pub use test_support::{RecordingScheduler, ScheduledCall};

// traits
pub use traits::{JobCatalog, JobScheduler, Permission, PropertyStore, StoredProperty};

// triggers
pub use triggers::{DispatchOutcome, DispatchedBuild, ItemListener, SkipReason, TriggerDispatcher};

// types
pub use types::{
    AdditionalParameter, ContainerKind, ContainerRef, EventKind, JobRef,
    PipelineTriggerProperty, PipelineTriggerPropertyDocument, PullRequestInfo, TriggerEvent,
};
