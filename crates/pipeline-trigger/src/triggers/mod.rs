//! Trigger dispatch for multibranch pipelines.
//!
//! The [`ItemListener`] is what the host calls when branch jobs and runs
//! come and go. The [`TriggerDispatcher`] decides, per event, whether the
//! owning project's trigger property fires anything and with which
//! parameters.

mod dispatcher;
mod listener;

pub use dispatcher::{DispatchOutcome, DispatchedBuild, SkipReason, TriggerDispatcher};
pub use listener::ItemListener;
