//! Override operations
//!
//! Coordinates the configuration provider, the override store, path edits,
//! the merge and schema validation.

pub mod override_service;
pub mod views;

pub use override_service::OverrideService;
pub use views::{EffectiveView, Preview};
