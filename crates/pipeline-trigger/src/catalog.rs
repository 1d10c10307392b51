//! Job-name auto-completion for the downstream job list fields.

use crate::traits::{JobCatalog, Permission};

/// Full names of catalog jobs containing `value` (trimmed) that the current
/// user may both read and build, in catalog order.
pub fn autocomplete(catalog: &dyn JobCatalog, value: &str) -> Vec<String> {
    let needle = value.trim();
    catalog
        .list_jobs()
        .into_iter()
        .filter(|job| {
            job.contains(needle)
                && catalog.has_permission(job, Permission::Build)
                && catalog.has_permission(job, Permission::Read)
        })
        .collect()
}
