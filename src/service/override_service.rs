//! Override service coordination

use crate::error::{OverrideError, Result};
use crate::key::{ResourceKey, validate_identifier};
use crate::provider::ConfigProvider;
use crate::schema::{self, Violation};
use crate::service::{EffectiveView, Preview};
use crate::store::{OverrideStore, StoredOverride};
use crate::value::{self, PropertyPath, is_empty_object, kind_name};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Implements the externally visible override operations
///
/// Every operation takes an explicit [`ResourceKey`]. Base configurations and
/// schemas are fetched fresh from the provider each time. Mutations load the
/// current document, compute the new one in memory and call `save` exactly
/// once with the revision they loaded, so a concurrent writer surfaces as an
/// [`OverrideError::Concurrency`] instead of a lost update.
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "OverrideService")]
pub struct OverrideService<'src> {
    provider: &'src dyn ConfigProvider,
    store: &'src dyn OverrideStore,
}

impl<'src> OverrideService<'src> {
    /// Create a service over a configuration provider and an override store
    #[must_use]
    #[inline]
    pub const fn new(provider: &'src dyn ConfigProvider, store: &'src dyn OverrideStore) -> Self {
        Self { provider, store }
    }

    /// Current base, override and effective configuration of a resource
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The resource does not exist
    /// - The stored override cannot be loaded
    #[inline]
    pub fn get_effective(&self, key: &ResourceKey) -> Result<EffectiveView> {
        let stored = self.store.load(key)?;
        let base = self.provider.fetch_base(key)?;
        let effective = value::merge(&base, &stored.document);

        Ok(EffectiveView {
            key: key.clone(),
            is_overridden: !is_empty_object(&stored.document),
            base,
            overrides: stored.document,
            effective,
            revision: stored.revision,
        })
    }

    /// Compute what setting `path` to `value` would produce, without saving
    ///
    /// Schema violations are returned as data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is malformed or conflicts with the override document
    /// - The resource or its schema does not exist
    /// - The schema document is malformed
    #[inline]
    pub fn preview_set(&self, key: &ResourceKey, path: &str, value: Value) -> Result<Preview> {
        let path = PropertyPath::parse(path)?;
        let (_, preview) = self.propose(key, &path, value)?;
        Ok(preview)
    }

    /// Set `path` to `value` in the override document if the result is valid
    ///
    /// Returns the stored override document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is malformed or conflicts with the override document
    /// - The resource or its schema does not exist
    /// - The effective configuration would violate the schema (nothing is saved)
    /// - The override changed since it was loaded
    #[inline]
    pub fn apply_set(&self, key: &ResourceKey, path: &str, value: Value) -> Result<Value> {
        let path = PropertyPath::parse(path)?;
        let (stored, preview) = self.propose(key, &path, value)?;

        if !preview.is_valid() {
            warn!(
                "Rejected override of '{path}' for {key}: {} violation(s)",
                preview.violations.len()
            );
            return Err(OverrideError::validation(preview.violations));
        }

        let revision = self
            .store
            .save(key, &preview.proposed_override, stored.revision)?;
        info!("Set '{path}' for {key} (revision {revision})");
        Ok(preview.proposed_override)
    }

    /// Remove `path` from the override document, pruning emptied parents
    ///
    /// Removing a path that is not overridden stores the document unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is malformed
    /// - The override cannot be loaded or saved
    /// - The override changed since it was loaded
    #[inline]
    pub fn remove_property(&self, key: &ResourceKey, path: &str) -> Result<Value> {
        let path = PropertyPath::parse(path)?;
        let stored = self.store.load(key)?;

        let pruned = value::delete(&stored.document, &path);
        if pruned == stored.document {
            debug!("'{path}' is not overridden for {key}");
        }

        let revision = self.store.save(key, &pruned, stored.revision)?;
        info!("Removed '{path}' for {key} (revision {revision})");
        Ok(pruned)
    }

    /// Replace the whole override document if the result is valid
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document is not an object, or the effective configuration would
    ///   violate the schema (nothing is saved)
    /// - The resource or its schema does not exist
    /// - The override changed since it was loaded
    #[inline]
    pub fn replace_all(&self, key: &ResourceKey, document: Value) -> Result<Value> {
        if !document.is_object() {
            return Err(OverrideError::validation(vec![Violation::new(
                PropertyPath::root(),
                format!("override document must be an object, found {}", kind_name(&document)),
            )]));
        }

        let stored = self.store.load(key)?;
        let violations = self.validate_against_base(key, &document)?.1;
        if !violations.is_empty() {
            warn!(
                "Rejected override document for {key}: {} violation(s)",
                violations.len()
            );
            return Err(OverrideError::validation(violations));
        }

        let revision = self.store.save(key, &document, stored.revision)?;
        info!("Replaced override for {key} (revision {revision})");
        Ok(document)
    }

    /// Remove every override of a resource in its environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The override cannot be loaded or saved
    /// - The override changed since it was loaded
    #[inline]
    pub fn clear_all(&self, key: &ResourceKey) -> Result<Value> {
        let stored = self.store.load(key)?;
        let cleared = Value::Object(Map::new());

        let revision = self.store.save(key, &cleared, stored.revision)?;
        info!("Cleared override for {key} (revision {revision})");
        Ok(cleared)
    }

    /// Validate the current effective configuration; violations are returned as data
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The resource or its schema does not exist
    /// - The schema document is malformed
    #[inline]
    pub fn check(&self, key: &ResourceKey) -> Result<Vec<Violation>> {
        let stored = self.store.load(key)?;
        Ok(self.validate_against_base(key, &stored.document)?.1)
    }

    /// Resources in `environment` that carry a non-empty override
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The environment is not a valid identifier
    /// - The store cannot be enumerated
    #[inline]
    pub fn list_overrides(&self, environment: &str) -> Result<Vec<ResourceKey>> {
        validate_identifier("environment", environment)?;
        self.store.list(environment)
    }

    /// The module schema governing a resource's effective configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the resource or its schema does not exist.
    #[inline]
    pub fn schema(&self, key: &ResourceKey) -> Result<Value> {
        self.provider.fetch_schema(key)
    }

    fn propose(
        &self,
        key: &ResourceKey,
        path: &PropertyPath,
        value: Value,
    ) -> Result<(StoredOverride, Preview)> {
        let stored = self.store.load(key)?;
        let proposed_override = value::set(&stored.document, path, value)?;
        let (proposed_effective, violations) =
            self.validate_against_base(key, &proposed_override)?;

        debug!(
            "Proposed '{path}' for {key} from revision {}: {} violation(s)",
            stored.revision,
            violations.len()
        );

        Ok((
            stored,
            Preview {
                proposed_override,
                proposed_effective,
                violations,
            },
        ))
    }

    /// Merge `overrides` onto the resource's base and validate the result
    fn validate_against_base(
        &self,
        key: &ResourceKey,
        overrides: &Value,
    ) -> Result<(Value, Vec<Violation>)> {
        let base = self.provider.fetch_base(key)?;
        let schema = self.provider.fetch_schema(key)?;
        let effective = value::merge(&base, overrides);
        let violations = schema::validate(&effective, &schema)?;
        Ok((effective, violations))
    }
}
