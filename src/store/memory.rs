//! In-memory override store

use super::{OverrideStore, Revision, StoredOverride, stale_revision};
use crate::error::{OverrideError, Result};
use crate::key::ResourceKey;
use crate::value::is_empty_object;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Override store kept in process memory
///
/// Clones share the same underlying map, so a clone handed to a second
/// service instance observes (and races with) the first one's writes.
#[derive(Clone, Default)]
pub struct InMemoryOverrideStore {
    documents: Arc<RwLock<HashMap<ResourceKey, StoredOverride>>>,
}

impl InMemoryOverrideStore {
    /// Create an empty store
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an override document (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document cannot be saved
    #[inline]
    pub fn with_override(self, key: &ResourceKey, document: Value) -> Result<Self> {
        let current = self.load(key)?.revision;
        self.save(key, &document, current)?;
        Ok(self)
    }
}

fn poisoned<E: ToString>(e: E) -> OverrideError {
    OverrideError::storage(format!("Override store lock poisoned: {}", e.to_string()))
}

impl OverrideStore for InMemoryOverrideStore {
    #[inline]
    fn load(&self, key: &ResourceKey) -> Result<StoredOverride> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents
            .get(key)
            .cloned()
            .unwrap_or_else(StoredOverride::empty))
    }

    #[inline]
    fn save(&self, key: &ResourceKey, document: &Value, expected: Revision) -> Result<Revision> {
        let mut documents = self.documents.write().map_err(poisoned)?;

        let current = documents
            .get(key)
            .map_or(Revision::INITIAL, |stored| stored.revision);
        if current != expected {
            return Err(stale_revision(key, expected, current));
        }

        let revision = current.next();
        documents.insert(
            key.clone(),
            StoredOverride {
                document: document.clone(),
                revision,
            },
        );
        drop(documents);

        debug!("Stored override for {key} at revision {revision}");
        Ok(revision)
    }

    #[inline]
    fn list(&self, environment: &str) -> Result<Vec<ResourceKey>> {
        let documents = self.documents.read().map_err(poisoned)?;
        let mut keys: Vec<ResourceKey> = documents
            .iter()
            .filter(|(key, stored)| {
                key.environment() == environment && !is_empty_object(&stored.document)
            })
            .map(|(key, _)| key.clone())
            .collect();
        drop(documents);

        keys.sort();
        Ok(keys)
    }
}
