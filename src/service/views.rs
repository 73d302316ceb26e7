//! Results returned by override operations

use crate::key::ResourceKey;
use crate::schema::Violation;
use crate::store::Revision;
use serde::Serialize;
use serde_json::Value;

/// Base, override and effective configuration of a resource in one environment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct EffectiveView {
    /// Which override document this view was computed from
    pub key: ResourceKey,

    /// Environment-agnostic base configuration
    pub base: Value,

    /// Stored override document (`{}` when the environment customizes nothing)
    #[serde(rename = "override")]
    pub overrides: Value,

    /// `merge(base, override)`
    pub effective: Value,

    /// Whether the override document is non-empty
    pub is_overridden: bool,

    /// Revision of the stored override document
    pub revision: Revision,
}

/// Outcome of a hypothetical edit; nothing is persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Preview {
    /// Override document the edit would store
    pub proposed_override: Value,

    /// Effective configuration the edit would produce
    pub proposed_effective: Value,

    /// Schema violations of the proposed effective configuration
    pub violations: Vec<Violation>,
}

impl Preview {
    /// Whether the proposed edit would be accepted by `apply_set`
    #[must_use]
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}
