//! Sources of base configurations and schema documents
//!
//! The override engine never authors base configurations or schemas; it asks
//! a [`ConfigProvider`] for fresh copies on every operation.

pub mod file;
pub mod memory;

pub use file::FileConfigProvider;
pub use memory::InMemoryConfigProvider;

use crate::error::Result;
use crate::key::ResourceKey;
use serde_json::Value;

/// Supplies the base configuration and schema document of a resource
pub trait ConfigProvider: Send + Sync {
    /// Fetch the environment-agnostic base configuration of a resource
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the resource does not exist.
    fn fetch_base(&self, key: &ResourceKey) -> Result<Value>;

    /// Fetch the schema document the resource's effective configuration must satisfy
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no schema is registered for the resource.
    fn fetch_schema(&self, key: &ResourceKey) -> Result<Value>;
}
