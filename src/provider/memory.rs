//! In-memory configuration provider

use super::ConfigProvider;
use crate::error::{OverrideError, Result};
use crate::key::ResourceKey;
use serde_json::Value;
use std::collections::HashMap;

/// Base configurations and schemas held in memory, keyed by (type, name)
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigProvider {
    bases: HashMap<(String, String), Value>,
    schemas: HashMap<(String, String), Value>,
}

impl InMemoryConfigProvider {
    /// Create an empty provider
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource's base configuration (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_base(mut self, resource_type: &str, resource_name: &str, base: Value) -> Self {
        self.bases
            .insert((resource_type.to_owned(), resource_name.to_owned()), base);
        self
    }

    /// Register a resource's schema document (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_schema(mut self, resource_type: &str, resource_name: &str, schema: Value) -> Self {
        self.schemas
            .insert((resource_type.to_owned(), resource_name.to_owned()), schema);
        self
    }

    fn lookup(map: &HashMap<(String, String), Value>, key: &ResourceKey) -> Option<Value> {
        map.get(&(key.resource_type().to_owned(), key.resource_name().to_owned()))
            .cloned()
    }
}

impl ConfigProvider for InMemoryConfigProvider {
    #[inline]
    fn fetch_base(&self, key: &ResourceKey) -> Result<Value> {
        Self::lookup(&self.bases, key).ok_or_else(|| {
            OverrideError::not_found(format!(
                "Resource '{}' of type '{}' does not exist",
                key.resource_name(),
                key.resource_type()
            ))
        })
    }

    #[inline]
    fn fetch_schema(&self, key: &ResourceKey) -> Result<Value> {
        Self::lookup(&self.schemas, key).ok_or_else(|| {
            OverrideError::not_found(format!(
                "No module schema registered for resource '{}' of type '{}'",
                key.resource_name(),
                key.resource_type()
            ))
        })
    }
}
