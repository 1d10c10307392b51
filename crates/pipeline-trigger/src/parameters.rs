//! Parameters handed to triggered jobs.
//!
//! Order is stable: the event marker first, then pull-request branch names
//! (deletion events only), then the configured additional parameters in
//! declaration order. Duplicate names are kept.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PARAMETER_DESCRIPTION;
use crate::types::{AdditionalParameter, TriggerEvent};

/// Name of the parameter carrying the event kind.
pub const EVENT_MARKER_PARAMETER: &str = "MULTIBRANCH_JOB_TRIGGER_EVENT";
pub const SOURCE_BRANCH_PARAMETER: &str = "SOURCE_BRANCH_NAME";
pub const TARGET_BRANCH_PARAMETER: &str = "TARGET_BRANCH_NAME";

/// A named string parameter for a triggered build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub name: String,
    pub value: String,
    pub description: String,
}

impl ParameterValue {
    /// `(name, value)`, dropping the description.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.name, &self.value)
    }
}

/// Builds the ordered parameter list for a dispatch.
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    description: String,
}

impl ParameterBuilder {
    /// Create a builder attaching `description` to every parameter.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// The marker, any pull-request branch names, then `extras` verbatim.
    pub fn build(
        &self,
        event: &TriggerEvent,
        extras: &[AdditionalParameter],
    ) -> Vec<ParameterValue> {
        let mut parameters = Vec::with_capacity(extras.len() + 3);
        parameters.push(self.parameter(EVENT_MARKER_PARAMETER, event.kind.marker()));

        if event.kind.is_deletion() {
            if let Some(pr) = &event.pull_request {
                if let Some(source) = &pr.source_branch_name {
                    parameters.push(self.parameter(SOURCE_BRANCH_PARAMETER, source));
                }
                if let Some(target) = &pr.target_branch_name {
                    parameters.push(self.parameter(TARGET_BRANCH_PARAMETER, target));
                }
            }
        }

        parameters.extend(extras.iter().map(|p| self.parameter(&p.name, &p.value)));
        parameters
    }

    fn parameter(&self, name: &str, value: &str) -> ParameterValue {
        ParameterValue {
            name: name.to_string(),
            value: value.to_string(),
            description: self.description.clone(),
        }
    }
}

impl Default for ParameterBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMETER_DESCRIPTION)
    }
}
