//! Dispatcher configuration.

/// Quiet period handed to the scheduler for every triggered build.
pub const QUIET_PERIOD_SECS: u32 = 0;

/// Description attached to every parameter built for a triggered job.
pub const DEFAULT_PARAMETER_DESCRIPTION: &str = "Set by MultiBranch Pipeline Plugin";

/// Configuration for the [`TriggerDispatcher`](crate::triggers::TriggerDispatcher).
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum number of compiled filter strings kept in memory.
    /// `0` disables memoization. Default: 256.
    pub pattern_cache_capacity: usize,
    /// Description carried by every built parameter.
    pub parameter_description: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pattern_cache_capacity: 256,
            parameter_description: DEFAULT_PARAMETER_DESCRIPTION.to_string(),
        }
    }
}
