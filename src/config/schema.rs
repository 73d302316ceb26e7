//! Schema validation for envoverride settings

use crate::error::OverrideError;
use anyhow::Result;
use serde_json::{Value, json};

/// The embedded schema for envoverride settings
#[must_use]
pub fn settings_schema() -> Value {
    json!({
        "type": "object",
        "required": ["projectDir"],
        "properties": {
            "projectDir": {"type": "string"},
            "stateDir": {"type": "string"}
        },
        "additionalProperties": false
    })
}

/// Validate a settings value against the schema
///
/// # Errors
///
/// Returns a configuration error listing every violation.
pub fn validate_against_schema(settings: &Value) -> Result<()> {
    let violations = crate::schema::validate(settings, &settings_schema())?;

    if !violations.is_empty() {
        let error_messages: Vec<String> = violations
            .iter()
            .map(|violation| format!("  - Path '{}': {}", violation.path, violation.message))
            .collect();

        return Err(OverrideError::configuration(format!(
            "Settings validation failed:\n{}",
            error_messages.join("\n")
        ))
        .into());
    }

    Ok(())
}
