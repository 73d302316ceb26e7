//! File-backed override store
//!
//! One JSON record per key at `<root>/<environment>/<type>/<name>.json`:
//!
//! ```json
//! { "revision": 3, "overrides": { "spec": { "replicas": 10 } } }
//! ```

use super::{OverrideStore, Revision, StoredOverride, stale_revision};
use crate::error::{OverrideError, Result};
use crate::key::{ResourceKey, validate_identifier};
use crate::system::System;
use crate::value::is_empty_object;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize)]
struct OverrideRecord<D> {
    revision: Revision,
    overrides: D,
}

/// Override store persisting one file per resource key
///
/// Records are replaced with `System::write_atomic`. The revision check and
/// the write happen under an exclusive lock on `<name>.json.lock` next to the
/// record, so saves of one key are serialized across store instances and
/// processes.
pub struct FileOverrideStore<'sys> {
    system: &'sys dyn System,
    root: PathBuf,
}

impl<'sys> FileOverrideStore<'sys> {
    /// Create a store rooted at `root`; the directory is created on first save
    #[inline]
    pub fn new<P: Into<PathBuf>>(system: &'sys dyn System, root: P) -> Self {
        Self {
            system,
            root: root.into(),
        }
    }

    /// Directory holding every environment's records
    #[must_use]
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &ResourceKey) -> PathBuf {
        self.root
            .join(key.environment())
            .join(key.resource_type())
            .join(format!("{}.json", key.resource_name()))
    }

    fn read_record(&self, path: &Path) -> Result<StoredOverride> {
        if !self.system.is_file(path) {
            return Ok(StoredOverride::empty());
        }

        let content = self.system.read_to_string(path).map_err(|e| {
            OverrideError::storage(format!(
                "Failed to read override record {}: {e}",
                path.display()
            ))
        })?;

        let record: OverrideRecord<Value> = serde_json::from_str(&content).map_err(|e| {
            OverrideError::storage(format!(
                "Failed to parse override record {}: {e}",
                path.display()
            ))
        })?;

        if !record.overrides.is_object() {
            return Err(OverrideError::storage(format!(
                "Override record {} does not hold an object",
                path.display()
            )));
        }

        Ok(StoredOverride {
            document: record.overrides,
            revision: record.revision,
        })
    }

    /// Compare-and-write; the caller holds the record's lock
    fn save_locked(
        &self,
        key: &ResourceKey,
        path: &Path,
        document: &Value,
        expected: Revision,
    ) -> Result<Revision> {
        let current = self.read_record(path)?.revision;
        if current != expected {
            return Err(stale_revision(key, expected, current));
        }

        let revision = current.next();
        let record = OverrideRecord {
            revision,
            overrides: document,
        };
        let bytes = serde_json::to_vec_pretty(&record).map_err(|e| {
            OverrideError::storage(format!("Failed to encode override for {key}: {e}"))
        })?;

        self.system.write_atomic(path, &bytes).map_err(|e| {
            OverrideError::storage(format!(
                "Failed to write override record {}: {e}",
                path.display()
            ))
        })?;

        debug!("Stored override for {key} at revision {revision}");
        Ok(revision)
    }
}

impl OverrideStore for FileOverrideStore<'_> {
    #[inline]
    fn load(&self, key: &ResourceKey) -> Result<StoredOverride> {
        let path = self.record_path(key);
        debug!("Loading override for {key} from {}", path.display());
        self.read_record(&path)
    }

    #[inline]
    fn save(&self, key: &ResourceKey, document: &Value, expected: Revision) -> Result<Revision> {
        let path = self.record_path(key);
        if let Some(parent) = path.parent() {
            self.system.create_dir_all(parent).map_err(|e| {
                OverrideError::storage(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let lock_path = path.with_extension("json.lock");
        let mut outcome = None;
        self.system
            .with_exclusive_lock(&lock_path, &mut || -> io::Result<()> {
                outcome = Some(self.save_locked(key, &path, document, expected));
                Ok(())
            })
            .map_err(|e| {
                OverrideError::storage(format!(
                    "Failed to lock override record {}: {e}",
                    path.display()
                ))
            })?;

        outcome.unwrap_or_else(|| {
            Err(OverrideError::storage(format!(
                "Override record {} was not written",
                path.display()
            )))
        })
    }

    #[inline]
    fn list(&self, environment: &str) -> Result<Vec<ResourceKey>> {
        validate_identifier("environment", environment)?;
        let environment_dir = self.root.join(environment);
        if !self.system.is_dir(&environment_dir) {
            return Ok(Vec::new());
        }

        let read_dir = |dir: &Path| {
            self.system.read_dir(dir).map_err(|e| {
                OverrideError::storage(format!("Failed to list {}: {e}", dir.display()))
            })
        };

        let mut keys = Vec::new();
        for type_dir in read_dir(&environment_dir)? {
            if !self.system.is_dir(&type_dir) {
                continue;
            }
            let Some(resource_type) = type_dir.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            for record_path in read_dir(&type_dir)? {
                if !self.system.is_file(&record_path)
                    || record_path.extension().is_none_or(|ext| ext != "json")
                {
                    continue;
                }
                let Some(resource_name) = record_path.file_stem().and_then(|stem| stem.to_str())
                else {
                    continue;
                };

                let key = match ResourceKey::new(environment, resource_type, resource_name) {
                    Ok(key) => key,
                    Err(e) => {
                        warn!("Skipping {}: {e}", record_path.display());
                        continue;
                    }
                };

                if !is_empty_object(&self.read_record(&record_path)?.document) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
