//! File-system backed trigger property store.
//!
//! Layout:
//! ```text
//! {base_dir}/{container}.json   — PipelineTriggerPropertyDocument
//! ```
//!
//! Container full names are path-like (`org/repo`), so `%` and `/` are
//! percent-encoded to keep one flat directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::PropertyStoreError;
use crate::traits::{PropertyStore, StoredProperty};
use crate::types::PipelineTriggerProperty;

/// Store reading and writing one JSON document per container.
///
/// Documents in the legacy single-filter schema are read as-is and
/// rewritten in the current schema on the next `put`.
#[derive(Debug)]
pub struct FilePropertyStore {
    base_dir: PathBuf,
}

impl FilePropertyStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: PathBuf) -> Result<Self, PropertyStoreError> {
        std::fs::create_dir_all(&base_dir).map_err(|e| PropertyStoreError::Store {
            message: format!("failed to create property directory: {e}"),
        })?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, container: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", encode_name(container)))
    }
}

fn encode_name(container: &str) -> String {
    container.replace('%', "%25").replace('/', "%2F")
}

/// Atomic write: temp file, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), PropertyStoreError> {
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, data).map_err(|e| PropertyStoreError::Store {
        message: format!("failed to write temp file: {e}"),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| PropertyStoreError::Store {
        message: format!("failed to rename temp file: {e}"),
    })?;
    Ok(())
}

#[async_trait]
impl PropertyStore for FilePropertyStore {
    async fn get(&self, container: &str) -> Result<Option<StoredProperty>, PropertyStoreError> {
        let path = self.path_for(container);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path).map_err(|e| PropertyStoreError::Store {
            message: format!("failed to read trigger property: {e}"),
        })?;
        let property =
            PipelineTriggerProperty::from_json(&data).map_err(|e| PropertyStoreError::Store {
                message: format!("{}: {e}", path.display()),
            })?;
        Ok(Some(StoredProperty {
            owner: container.to_string(),
            property: Arc::new(property),
        }))
    }

    async fn put(
        &self,
        container: &str,
        property: PipelineTriggerProperty,
    ) -> Result<(), PropertyStoreError> {
        let data = property.to_json().map_err(|e| PropertyStoreError::Store {
            message: format!("failed to serialize trigger property: {e}"),
        })?;
        atomic_write(&self.path_for(container), data.as_bytes())
    }

    async fn remove(&self, container: &str) -> Result<(), PropertyStoreError> {
        let path = self.path_for(container);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PropertyStoreError::Store {
                message: format!("failed to remove trigger property: {e}"),
            }),
        }
    }
}
