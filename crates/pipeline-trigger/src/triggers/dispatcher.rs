//! Per-event dispatch decision.
//!
//! For each [`TriggerEvent`] the dispatcher resolves the job's owning
//! multibranch container, looks up its trigger property, filters the job
//! name, and schedules the resolved targets with the built parameters.
//! It keeps no state between events apart from the compiled-filter cache.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{DispatcherConfig, QUIET_PERIOD_SECS};
use crate::errors::DispatchError;
use crate::filter::{FilterDecision, FilterPolicy};
use crate::matcher::WildcardMatcher;
use crate::parameters::{ParameterBuilder, ParameterValue};
use crate::traits::{JobScheduler, PropertyStore};
use crate::types::{ContainerKind, EventKind, TriggerEvent};

/// A build handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedBuild {
    /// Full name of the scheduled job.
    pub job: String,
    pub parameters: Vec<ParameterValue>,
}

/// Why an event did not lead to any scheduling. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    /// The job has no parent, or its parent is not a multibranch project.
    NotBranchJob { parent_kind: Option<ContainerKind> },
    /// The owning container has no trigger property.
    NoProperty,
    /// The job name was rejected by the property's filters.
    Filtered(FilterDecision),
    /// No downstream jobs are configured for this event kind.
    NoTargets,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched {
        kind: EventKind,
        /// Full name of the job the event was about.
        source_job: String,
        builds: Vec<DispatchedBuild>,
    },
    Skipped(SkipReason),
}

impl DispatchOutcome {
    /// `true` when at least one build was scheduled.
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }
}

/// Decides whether an event fires downstream jobs and schedules them.
pub struct TriggerDispatcher {
    store: Arc<dyn PropertyStore>,
    scheduler: Arc<dyn JobScheduler>,
    matcher: WildcardMatcher,
    parameters: ParameterBuilder,
}

impl TriggerDispatcher {
    /// Create a dispatcher with the default [`DispatcherConfig`].
    pub fn new(store: Arc<dyn PropertyStore>, scheduler: Arc<dyn JobScheduler>) -> Self {
        Self::with_config(store, scheduler, DispatcherConfig::default())
    }

    /// Create a dispatcher with an explicit configuration.
    pub fn with_config(
        store: Arc<dyn PropertyStore>,
        scheduler: Arc<dyn JobScheduler>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            store,
            scheduler,
            matcher: WildcardMatcher::new(config.pattern_cache_capacity),
            parameters: ParameterBuilder::new(config.parameter_description),
        }
    }

    /// Handle one event.
    ///
    /// Scheduling calls are issued concurrently when several targets are
    /// configured. Every target is attempted and nothing is retried. If any
    /// call fails, the first failure is returned: as
    /// [`DispatchError::Partial`] when other targets were queued, otherwise
    /// as [`DispatchError::Scheduler`].
    pub async fn dispatch(&self, event: &TriggerEvent) -> Result<DispatchOutcome, DispatchError> {
        let job = &event.job;

        let container = match &job.parent {
            Some(parent) if parent.kind == ContainerKind::MultiBranch => parent,
            other => {
                tracing::debug!(
                    job = %job.full_name,
                    "job is not a child of a multibranch project, skipping"
                );
                return Ok(DispatchOutcome::Skipped(SkipReason::NotBranchJob {
                    parent_kind: other.as_ref().map(|p| p.kind),
                }));
            }
        };

        let Some(stored) = self.store.get(&container.full_name).await? else {
            tracing::debug!(
                job = %job.full_name,
                container = %container.full_name,
                "no trigger property configured, skipping"
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::NoProperty));
        };

        if stored.owner != container.full_name {
            tracing::error!(
                job = %job.full_name,
                expected = %container.full_name,
                actual = %stored.owner,
                "trigger property resolved from the wrong container"
            );
            return Err(DispatchError::OwnerMismatch {
                job: job.full_name.clone(),
                expected: container.full_name.clone(),
                actual: stored.owner,
            });
        }

        let property = stored.property;
        let policy = FilterPolicy::with_matcher(
            &self.matcher,
            property.include_filter(),
            property.exclude_filter(),
        );
        let decision = policy.evaluate(&job.name);
        if !decision.is_accepted() {
            tracing::info!(job = %job.name, reason = %decision, "job filtered out, skipping");
            return Ok(DispatchOutcome::Skipped(SkipReason::Filtered(decision)));
        }

        let targets: Vec<String> = match property.jobs_for(event.kind) {
            [] if event.kind == EventKind::JobCreated => vec![job.full_name.clone()],
            [] => {
                tracing::debug!(
                    job = %job.full_name,
                    kind = %event.kind,
                    "no jobs configured for event, skipping"
                );
                return Ok(DispatchOutcome::Skipped(SkipReason::NoTargets));
            }
            jobs => jobs.to_vec(),
        };

        let parameters = self
            .parameters
            .build(event, property.additional_parameters());

        let results = futures::future::join_all(targets.iter().map(|target| {
            self.scheduler
                .schedule(target, parameters.clone(), QUIET_PERIOD_SECS)
        }))
        .await;

        let mut builds = Vec::with_capacity(targets.len());
        let mut first_error = None;
        for (target, result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => builds.push(DispatchedBuild {
                    job: target,
                    parameters: parameters.clone(),
                }),
                Err(e) => {
                    tracing::warn!(
                        downstream = %target,
                        error = %e,
                        "failed to schedule triggered job"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(source) = first_error {
            return Err(if builds.is_empty() {
                DispatchError::Scheduler(source)
            } else {
                DispatchError::Partial {
                    dispatched: builds,
                    source,
                }
            });
        }

        tracing::info!(
            job = %job.full_name,
            kind = %event.kind,
            targets = builds.len(),
            "triggered jobs scheduled"
        );

        Ok(DispatchOutcome::Dispatched {
            kind: event.kind,
            source_job: job.full_name.clone(),
            builds,
        })
    }

    /// Process events until the channel closes.
    ///
    /// Returns every build that was scheduled, including the queued builds
    /// of partially failed events. Skipped events are dropped silently and
    /// failures are logged.
    pub async fn run(&self, mut event_rx: mpsc::Receiver<TriggerEvent>) -> Vec<DispatchedBuild> {
        let mut dispatched = Vec::new();

        while let Some(event) = event_rx.recv().await {
            match self.dispatch(&event).await {
                Ok(DispatchOutcome::Dispatched { builds, .. }) => dispatched.extend(builds),
                Ok(DispatchOutcome::Skipped(_)) => {}
                Err(DispatchError::Partial { dispatched: builds, source }) => {
                    tracing::error!(
                        job = %event.job.full_name,
                        kind = %event.kind,
                        queued = builds.len(),
                        "trigger dispatch partially failed: {source}"
                    );
                    dispatched.extend(builds);
                }
                Err(e) => {
                    tracing::error!(
                        job = %event.job.full_name,
                        kind = %event.kind,
                        "trigger dispatch failed: {e}"
                    );
                }
            }
        }

        dispatched
    }
}

impl std::fmt::Debug for TriggerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerDispatcher")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{FilePropertyStore, InMemoryPropertyStore};
    use crate::errors::{PropertyStoreError, SchedulerError};
    use crate::parameters::EVENT_MARKER_PARAMETER;
    use crate::test_support::RecordingScheduler;
    use crate::traits::StoredProperty;
    use crate::types::{
        AdditionalParameter, ContainerRef, JobRef, PipelineTriggerProperty, PullRequestInfo,
    };
    use async_trait::async_trait;

    async fn setup(
        property: Option<PipelineTriggerProperty>,
    ) -> (TriggerDispatcher, Arc<RecordingScheduler>) {
        let store = Arc::new(InMemoryPropertyStore::new());
        if let Some(property) = property {
            store.put("repo", property).await.expect("put");
        }
        let scheduler = Arc::new(RecordingScheduler::new());
        let dispatcher = TriggerDispatcher::new(store, scheduler.clone());
        (dispatcher, scheduler)
    }

    #[tokio::test]
    async fn created_job_schedules_itself_once() {
        let property = PipelineTriggerProperty::new(
            "*",
            "",
            vec![AdditionalParameter::new("A", "1"), AdditionalParameter::new("B", "2")],
        );
        let (dispatcher, scheduler) = setup(Some(property)).await;

        let event = TriggerEvent::job_created(JobRef::branch("repo", "main"));
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert!(outcome.is_dispatched());

        let calls = scheduler.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].job, "repo/main");
        assert_eq!(calls[0].quiet_period_secs, 0);
        let pairs: Vec<_> = calls[0].parameters.iter().map(ParameterValue::as_pair).collect();
        assert_eq!(pairs, vec![(EVENT_MARKER_PARAMETER, "CREATE"), ("A", "1"), ("B", "2")]);

        if let DispatchOutcome::Dispatched { builds, .. } = outcome {
            assert_eq!(builds[0].parameters, calls[0].parameters);
        }
    }

    #[tokio::test]
    async fn missing_property_skips() {
        let (dispatcher, scheduler) = setup(None).await;
        let event = TriggerEvent::job_created(JobRef::branch("repo", "main"));
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::NoProperty));
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn standalone_job_skips() {
        let (dispatcher, scheduler) = setup(Some(PipelineTriggerProperty::default())).await;
        let event = TriggerEvent::job_created(JobRef::standalone("tools/cleanup"));
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert_eq!(
            outcome,
            DispatchOutcome::Skipped(SkipReason::NotBranchJob { parent_kind: None })
        );
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn organization_folder_child_skips() {
        let (dispatcher, scheduler) = setup(Some(PipelineTriggerProperty::default())).await;
        let mut job = JobRef::branch("repo", "main");
        job.parent = Some(ContainerRef {
            full_name: "repo".into(),
            kind: ContainerKind::OrganizationFolder,
        });
        let outcome = dispatcher
            .dispatch(&TriggerEvent::job_created(job))
            .await
            .expect("dispatch");
        assert_eq!(
            outcome,
            DispatchOutcome::Skipped(SkipReason::NotBranchJob {
                parent_kind: Some(ContainerKind::OrganizationFolder)
            })
        );
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn excluded_job_skips() {
        let property = PipelineTriggerProperty::new("*", "test-*", vec![]);
        let (dispatcher, scheduler) = setup(Some(property)).await;

        let event = TriggerEvent::job_created(JobRef::branch("repo", "test-foo"));
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert_eq!(
            outcome,
            DispatchOutcome::Skipped(SkipReason::Filtered(FilterDecision::Excluded))
        );

        let event = TriggerEvent::job_created(JobRef::branch("repo", "main"));
        assert!(dispatcher.dispatch(&event).await.expect("dispatch").is_dispatched());
        assert_eq!(scheduler.scheduled_jobs(), vec!["repo/main"]);
    }

    #[tokio::test]
    async fn empty_include_filter_never_fires() {
        let property = PipelineTriggerProperty::new("", "", vec![]);
        let (dispatcher, scheduler) = setup(Some(property)).await;
        let event = TriggerEvent::job_created(JobRef::branch("repo", "main"));
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert_eq!(
            outcome,
            DispatchOutcome::Skipped(SkipReason::Filtered(FilterDecision::NotIncluded))
        );
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn deletion_without_targets_skips() {
        let (dispatcher, scheduler) = setup(Some(PipelineTriggerProperty::default())).await;
        let event = TriggerEvent::job_deleted(JobRef::branch("repo", "old"), None);
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::NoTargets));
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn deletion_fires_every_configured_job() {
        let property =
            PipelineTriggerProperty::new("PR-*", "", vec![]).with_delete_jobs("cleanup, audit");
        let (dispatcher, scheduler) = setup(Some(property)).await;

        let event = TriggerEvent::branch_deleted(
            JobRef::branch("repo", "PR-3"),
            Some(PullRequestInfo::new("feature/a", "main")),
        );
        let outcome = dispatcher.dispatch(&event).await.expect("dispatch");
        assert!(outcome.is_dispatched());
        assert_eq!(scheduler.scheduled_jobs(), vec!["audit", "cleanup"]);

        for call in scheduler.calls() {
            assert_eq!(call.quiet_period_secs, 0);
            assert_eq!(call.parameters[0].value, "BRANCH_DELETE");
            assert_eq!(call.parameters[1].value, "feature/a");
            assert_eq!(call.parameters[2].value, "main");
        }
    }

    #[tokio::test]
    async fn partial_failure_reports_queued_builds() {
        let property = PipelineTriggerProperty::default().with_run_delete_jobs("a,b");
        let (dispatcher, scheduler) = setup(Some(property)).await;
        scheduler.fail_for("a");

        let event = TriggerEvent::run_deleted(JobRef::branch("repo", "main"), None);
        let err = dispatcher.dispatch(&event).await.expect_err("should fail");
        match err {
            DispatchError::Partial { dispatched, source } => {
                let jobs: Vec<_> = dispatched.iter().map(|b| b.job.as_str()).collect();
                assert_eq!(jobs, vec!["b"]);
                assert_eq!(dispatched[0].parameters[0].value, "RUN_DELETE");
                assert!(matches!(source, SchedulerError::Rejected { ref job, .. } if job == "a"));
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
        assert_eq!(scheduler.scheduled_jobs(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn total_failure_is_a_scheduler_error() {
        let property = PipelineTriggerProperty::default().with_run_delete_jobs("a,b");
        let (dispatcher, scheduler) = setup(Some(property)).await;
        scheduler.fail_for("a");
        scheduler.fail_for("b");

        let event = TriggerEvent::run_deleted(JobRef::branch("repo", "main"), None);
        let err = dispatcher.dispatch(&event).await.expect_err("should fail");
        assert!(matches!(err, DispatchError::Scheduler(SchedulerError::Rejected { .. })));
        assert_eq!(scheduler.scheduled_jobs(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("repo.json"), "not json").expect("write");
        let store = Arc::new(FilePropertyStore::new(dir.path().to_path_buf()).expect("store"));
        let scheduler = Arc::new(RecordingScheduler::new());
        let dispatcher = TriggerDispatcher::new(store, scheduler.clone());

        let event = TriggerEvent::job_created(JobRef::branch("repo", "main"));
        let err = dispatcher.dispatch(&event).await.expect_err("should fail");
        assert!(matches!(err, DispatchError::PropertyStore(_)));
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn run_continues_after_store_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.json"), "not json").expect("write");
        let store = Arc::new(FilePropertyStore::new(dir.path().to_path_buf()).expect("store"));
        store
            .put("repo", PipelineTriggerProperty::default())
            .await
            .expect("put");
        let scheduler = Arc::new(RecordingScheduler::new());
        let dispatcher = TriggerDispatcher::new(store, scheduler.clone());
        let (tx, rx) = mpsc::channel(10);

        tx.send(TriggerEvent::job_created(JobRef::branch("broken", "main")))
            .await
            .expect("send");
        tx.send(TriggerEvent::job_created(JobRef::branch("repo", "main")))
            .await
            .expect("send");
        drop(tx);

        let dispatched = dispatcher.run(rx).await;
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].job, "repo/main");
        assert_eq!(scheduler.scheduled_jobs(), vec!["repo/main"]);
    }

    /// Store that answers every lookup with another container's property.
    struct MisroutedStore;

    #[async_trait]
    impl PropertyStore for MisroutedStore {
        async fn get(
            &self,
            _container: &str,
        ) -> Result<Option<StoredProperty>, PropertyStoreError> {
            Ok(Some(StoredProperty {
                owner: "elsewhere".into(),
                property: Arc::new(PipelineTriggerProperty::default()),
            }))
        }

        async fn put(
            &self,
            _container: &str,
            _property: PipelineTriggerProperty,
        ) -> Result<(), PropertyStoreError> {
            Ok(())
        }

        async fn remove(&self, _container: &str) -> Result<(), PropertyStoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn owner_mismatch_is_an_error() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let dispatcher = TriggerDispatcher::new(Arc::new(MisroutedStore), scheduler.clone());
        let event = TriggerEvent::job_created(JobRef::branch("repo", "main"));
        let err = dispatcher.dispatch(&event).await.expect_err("should fail");
        assert!(matches!(err, DispatchError::OwnerMismatch { .. }));
        assert!(scheduler.calls().is_empty());
    }

    #[tokio::test]
    async fn run_collects_until_channel_closes() {
        let (dispatcher, scheduler) =
            setup(Some(PipelineTriggerProperty::new("main dev", "", vec![]))).await;
        let (tx, rx) = mpsc::channel(10);

        for name in ["main", "feature", "dev"] {
            tx.send(TriggerEvent::job_created(JobRef::branch("repo", name)))
                .await
                .expect("send");
        }
        drop(tx);

        let dispatched = dispatcher.run(rx).await;
        let jobs: Vec<_> = dispatched.iter().map(|b| b.job.as_str()).collect();
        assert_eq!(jobs, vec!["repo/main", "repo/dev"]);
        assert_eq!(scheduler.calls().len(), 2);
    }

    #[tokio::test]
    async fn run_continues_after_failure() {
        let property = PipelineTriggerProperty::default().with_run_delete_jobs("a,b");
        let (dispatcher, scheduler) = setup(Some(property)).await;
        scheduler.fail_for("repo/bad");
        scheduler.fail_for("a");
        let (tx, rx) = mpsc::channel(10);

        tx.send(TriggerEvent::job_created(JobRef::branch("repo", "bad")))
            .await
            .expect("send");
        tx.send(TriggerEvent::run_deleted(JobRef::branch("repo", "main"), None))
            .await
            .expect("send");
        tx.send(TriggerEvent::job_created(JobRef::branch("repo", "good")))
            .await
            .expect("send");
        drop(tx);

        let dispatched = dispatcher.run(rx).await;
        let jobs: Vec<_> = dispatched.iter().map(|b| b.job.as_str()).collect();
        assert_eq!(jobs, vec!["b", "repo/good"]);
        assert_eq!(scheduler.scheduled_jobs(), vec!["a", "b", "repo/bad", "repo/good"]);
    }
}
