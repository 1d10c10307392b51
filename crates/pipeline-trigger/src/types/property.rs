//! Persisted trigger configuration attached to a multibranch container.
//!
//! Two schema generations exist. The current one carries an include and an
//! exclude filter; the legacy one carries a single `jobFilter`. Both parse
//! into the same [`PipelineTriggerProperty`], and the current field wins
//! when a document carries both.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::matcher::has_tokens;

use super::event::EventKind;

/// Include filter used when none is configured.
pub const DEFAULT_INCLUDE_FILTER: &str = "*";

/// A user-configured `(name, value)` pair passed to triggered jobs.
///
/// The value is opaque. Placeholder expansion is the host's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AdditionalParameter {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl AdditionalParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// On-disk shape of the property, covering both schema generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PipelineTriggerPropertyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_include_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_exclude_filter: Option<String>,
    /// Legacy single filter. Read, never written.
    #[serde(default, skip_serializing)]
    pub job_filter: Option<String>,
    #[serde(default)]
    pub additional_parameters: Option<Vec<AdditionalParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_action_jobs_to_trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_action_jobs_to_trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_jobs_to_trigger_on_run_delete: Option<String>,
}

/// Trigger configuration of one container. Read-only during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTriggerProperty {
    include_filter: String,
    exclude_filter: String,
    additional_parameters: Vec<AdditionalParameter>,
    create_jobs: Vec<String>,
    delete_jobs: Vec<String>,
    run_delete_jobs: Vec<String>,
}

impl Default for PipelineTriggerProperty {
    fn default() -> Self {
        Self::new(DEFAULT_INCLUDE_FILTER, "", Vec::new())
    }
}

impl PipelineTriggerProperty {
    /// Current-schema property with no downstream job lists.
    pub fn new(
        include_filter: impl Into<String>,
        exclude_filter: impl Into<String>,
        additional_parameters: Vec<AdditionalParameter>,
    ) -> Self {
        Self {
            include_filter: include_filter.into(),
            exclude_filter: exclude_filter.into(),
            additional_parameters,
            create_jobs: Vec::new(),
            delete_jobs: Vec::new(),
            run_delete_jobs: Vec::new(),
        }
    }

    /// Legacy single-filter property. Nothing is excluded.
    pub fn legacy(
        job_filter: impl Into<String>,
        additional_parameters: Vec<AdditionalParameter>,
    ) -> Self {
        Self::new(job_filter, "", additional_parameters)
    }

    /// Jobs scheduled when a branch job is created, as a comma-separated list.
    pub fn with_create_jobs(mut self, jobs: &str) -> Self {
        self.create_jobs = split_job_list(jobs);
        self
    }

    /// Jobs scheduled when a branch job or branch is deleted.
    pub fn with_delete_jobs(mut self, jobs: &str) -> Self {
        self.delete_jobs = split_job_list(jobs);
        self
    }

    /// Jobs scheduled when a run is deleted.
    pub fn with_run_delete_jobs(mut self, jobs: &str) -> Self {
        self.run_delete_jobs = split_job_list(jobs);
        self
    }

    /// Space-separated wildcard tokens a job name must match.
    pub fn include_filter(&self) -> &str {
        &self.include_filter
    }

    /// Space-separated wildcard tokens that reject a job name. May be empty.
    pub fn exclude_filter(&self) -> &str {
        &self.exclude_filter
    }

    /// Extra parameters passed to triggered jobs, in declaration order.
    pub fn additional_parameters(&self) -> &[AdditionalParameter] {
        &self.additional_parameters
    }

    /// The configured downstream jobs for an event kind, possibly empty.
    pub fn jobs_for(&self, kind: EventKind) -> &[String] {
        match kind {
            EventKind::JobCreated => &self.create_jobs,
            EventKind::JobDeleted | EventKind::BranchDeleted => &self.delete_jobs,
            EventKind::RunDeleted => &self.run_delete_jobs,
        }
    }

    /// Parse a persisted property document.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let document: PipelineTriggerPropertyDocument =
            serde_json::from_str(data).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })?;
        Self::from_document(document)
    }

    /// Resolve a document of either schema generation.
    pub fn from_document(document: PipelineTriggerPropertyDocument) -> Result<Self, ConfigError> {
        let include_filter = document
            .job_include_filter
            .or(document.job_filter)
            .unwrap_or_else(|| DEFAULT_INCLUDE_FILTER.to_string());
        let additional_parameters = document.additional_parameters.unwrap_or_default();

        if let Some(index) = additional_parameters
            .iter()
            .position(|p| p.name.trim().is_empty())
        {
            return Err(ConfigError::Invalid {
                message: format!("additional parameter #{index} has an empty name"),
            });
        }

        let property = Self {
            include_filter,
            exclude_filter: document.job_exclude_filter.unwrap_or_default(),
            additional_parameters,
            create_jobs: split_job_list(
                document.create_action_jobs_to_trigger.as_deref().unwrap_or(""),
            ),
            delete_jobs: split_job_list(
                document.delete_action_jobs_to_trigger.as_deref().unwrap_or(""),
            ),
            run_delete_jobs: split_job_list(
                document.action_jobs_to_trigger_on_run_delete.as_deref().unwrap_or(""),
            ),
        };

        if !has_tokens(&property.include_filter) {
            tracing::warn!(
                include_filter = %property.include_filter,
                "include filter has no patterns; no job will ever be triggered"
            );
        }

        Ok(property)
    }

    /// The current-schema document for this property.
    pub fn to_document(&self) -> PipelineTriggerPropertyDocument {
        PipelineTriggerPropertyDocument {
            job_include_filter: Some(self.include_filter.clone()),
            job_exclude_filter: Some(self.exclude_filter.clone()),
            job_filter: None,
            additional_parameters: Some(self.additional_parameters.clone()),
            create_action_jobs_to_trigger: join_job_list(&self.create_jobs),
            delete_action_jobs_to_trigger: join_job_list(&self.delete_jobs),
            action_jobs_to_trigger_on_run_delete: join_job_list(&self.run_delete_jobs),
        }
    }

    /// Serialize in the current schema.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(&self.to_document()).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Split a comma-separated job list, trimming names and dropping empties.
fn split_job_list(jobs: &str) -> Vec<String> {
    jobs.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn join_job_list(jobs: &[String]) -> Option<String> {
    if jobs.is_empty() {
        None
    } else {
        Some(jobs.join(", "))
    }
}
