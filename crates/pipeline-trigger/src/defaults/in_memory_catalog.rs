//! In-memory job catalog.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::traits::{JobCatalog, Permission};

/// Job catalog backed by an ordered list of jobs and their granted
/// permissions.
#[derive(Debug, Default)]
pub struct InMemoryJobCatalog {
    jobs: RwLock<Vec<(String, HashSet<Permission>)>>,
}

impl InMemoryJobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job, or replace the permissions of an existing one.
    pub fn add(&self, full_name: &str, permissions: &[Permission]) {
        let granted: HashSet<Permission> = permissions.iter().copied().collect();
        let mut jobs = self.jobs.write();
        match jobs.iter_mut().find(|(name, _)| name == full_name) {
            Some((_, existing)) => *existing = granted,
            None => jobs.push((full_name.to_string(), granted)),
        }
    }
}

impl JobCatalog for InMemoryJobCatalog {
    fn list_jobs(&self) -> Vec<String> {
        self.jobs.read().iter().map(|(name, _)| name.clone()).collect()
    }

    fn has_permission(&self, job: &str, permission: Permission) -> bool {
        self.jobs
            .read()
            .iter()
            .any(|(name, granted)| name == job && granted.contains(&permission))
    }
}
