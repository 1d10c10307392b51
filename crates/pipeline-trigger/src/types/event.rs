//! Trigger events — what happened, and to which job.

use serde::{Deserialize, Serialize};

/// The kind of container a job lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ContainerKind {
    /// A branch-indexed pipeline project. Its children are branch jobs.
    MultiBranch,
    /// A folder that indexes repositories into multibranch projects.
    OrganizationFolder,
    /// A plain folder.
    Folder,
    Other,
}

impl ContainerKind {
    /// Whether a trigger property may be configured on this container.
    pub fn accepts_trigger_property(self) -> bool {
        matches!(self, Self::MultiBranch | Self::OrganizationFolder)
    }
}

/// Reference to the container owning a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub struct ContainerRef {
    pub full_name: String,
    pub kind: ContainerKind,
}

impl ContainerRef {
    pub fn multibranch(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            kind: ContainerKind::MultiBranch,
        }
    }
}

/// Reference to the job an event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub struct JobRef {
    /// Short name, the one filters are matched against.
    pub name: String,
    /// Slash-separated path including all parent containers.
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ContainerRef>,
}

impl JobRef {
    /// A branch job directly under the multibranch project `project`.
    pub fn branch(project: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: format!("{project}/{name}"),
            parent: Some(ContainerRef::multibranch(project)),
        }
    }

    /// A job with no branch-indexed parent.
    pub fn standalone(full_name: &str) -> Self {
        let name = full_name.rsplit('/').next().unwrap_or(full_name);
        Self {
            name: name.to_string(),
            full_name: full_name.to_string(),
            parent: None,
        }
    }
}

/// Source and target branch of a pull-request style branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub struct PullRequestInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch_name: Option<String>,
}

impl PullRequestInfo {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_branch_name: Some(source.into()),
            target_branch_name: Some(target.into()),
        }
    }
}

/// What happened to the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    JobCreated,
    JobDeleted,
    BranchDeleted,
    RunDeleted,
}

impl EventKind {
    /// Upper-case token passed to triggered jobs in the event marker parameter.
    pub fn marker(self) -> &'static str {
        match self {
            Self::JobCreated => "CREATE",
            Self::JobDeleted => "DELETE",
            Self::BranchDeleted => "BRANCH_DELETE",
            Self::RunDeleted => "RUN_DELETE",
        }
    }

    pub fn is_deletion(self) -> bool {
        !matches!(self, Self::JobCreated)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// A fully resolved notification from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub struct TriggerEvent {
    pub kind: EventKind,
    pub job: JobRef,
    /// Only meaningful for deletion events on pull-request branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestInfo>,
}

impl TriggerEvent {
    pub fn job_created(job: JobRef) -> Self {
        Self {
            kind: EventKind::JobCreated,
            job,
            pull_request: None,
        }
    }

    pub fn job_deleted(job: JobRef, pull_request: Option<PullRequestInfo>) -> Self {
        Self {
            kind: EventKind::JobDeleted,
            job,
            pull_request,
        }
    }

    pub fn branch_deleted(job: JobRef, pull_request: Option<PullRequestInfo>) -> Self {
        Self {
            kind: EventKind::BranchDeleted,
            job,
            pull_request,
        }
    }

    pub fn run_deleted(job: JobRef, pull_request: Option<PullRequestInfo>) -> Self {
        Self {
            kind: EventKind::RunDeleted,
            job,
            pull_request,
        }
    }
}
