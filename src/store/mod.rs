//! Override document persistence
//!
//! An [`OverrideStore`] keeps one override document per [`ResourceKey`] and
//! only ever replaces it as a whole. Every stored document carries a
//! [`Revision`]; `save` is a compare-and-swap against the revision observed at
//! `load`, which turns a lost update into a [`OverrideError::Concurrency`].

pub mod file;
pub mod memory;

pub use file::FileOverrideStore;
pub use memory::InMemoryOverrideStore;

use crate::error::{OverrideError, Result};
use crate::key::ResourceKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Version stamp of a stored override document
///
/// `Revision::INITIAL` means nothing has been stored for the key yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(pub u64);

impl Revision {
    /// Revision of a key that has never been saved
    pub const INITIAL: Self = Self(0);

    /// The revision a successful save produces
    #[must_use]
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Revision {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An override document together with the revision it was loaded at
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct StoredOverride {
    /// The override document, always an object
    pub document: Value,

    /// Revision to pass back to `save`
    pub revision: Revision,
}

impl StoredOverride {
    /// The empty override of a key that has never been saved
    #[must_use]
    #[inline]
    pub fn empty() -> Self {
        Self {
            document: Value::Object(Map::new()),
            revision: Revision::INITIAL,
        }
    }
}

/// Persistence boundary for override documents
pub trait OverrideStore: Send + Sync {
    /// Load the override document for `key`; an empty object at
    /// `Revision::INITIAL` when none exists
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backing data cannot be read or decoded.
    fn load(&self, key: &ResourceKey) -> Result<StoredOverride>;

    /// Replace the whole override document for `key`
    ///
    /// # Errors
    ///
    /// Returns a concurrency error if the stored revision is not `expected`,
    /// or a storage error if the document cannot be written. Nothing is
    /// written in either case.
    fn save(&self, key: &ResourceKey, document: &Value, expected: Revision) -> Result<Revision>;

    /// Keys in `environment` whose stored override is not empty, sorted
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backing data cannot be enumerated.
    fn list(&self, environment: &str) -> Result<Vec<ResourceKey>>;
}

/// Error for a save whose expected revision is stale
pub(crate) fn stale_revision(key: &ResourceKey, expected: Revision, found: Revision) -> OverrideError {
    OverrideError::concurrency(format!(
        "Override for '{key}' changed since it was loaded (expected revision {expected}, found {found}); reload and retry"
    ))
}
