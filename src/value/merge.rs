//! Override merge logic
//!
//! Computes an effective configuration from a base document and a sparse
//! override document:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (override wins entirely, never concatenated or merged by index)
//! - Scalars and kind mismatches: override wins

use serde_json::{Map, Value};

/// Deep merge an override document onto a base document.
///
/// Base keys keep their order and are followed by override-only keys in the
/// override's order. An explicit `null` in the override replaces the base
/// value. Merging never fails and never mutates its inputs.
#[must_use]
#[inline]
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        // Both objects: deep merge
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = Map::with_capacity(base_map.len() + overlay_map.len());

            for (key, base_value) in base_map {
                let value = match overlay_map.get(key) {
                    Some(overlay_value) => merge(base_value, overlay_value),
                    None => base_value.clone(),
                };
                merged.insert(key.clone(), value);
            }

            for (key, overlay_value) in overlay_map {
                if !base_map.contains_key(key) {
                    merged.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Object(merged)
        }

        // Arrays, scalars and any other case: overlay wins
        (_, overlay) => overlay.clone(),
    }
}

/// Merge several documents in order (first is base, last has highest precedence)
#[must_use]
#[inline]
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    layers
        .into_iter()
        .reduce(|merged, layer| merge(&merged, &layer))
        .unwrap_or_else(|| Value::Object(Map::new()))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_override() {
        let base = json!({"spec": {"replicas": 3}});
        let overlay = json!({"spec": {"replicas": 10}});
        let result = merge(&base, &overlay);
        assert_eq!(result, json!({"spec": {"replicas": 10}}));
    }

    #[test]
    fn object_deep_merge() {
        let base = json!({
            "spec": {
                "image": "api:1.0",
                "replicas": 3
            }
        });
        let overlay = json!({
            "spec": {
                "replicas": 5
            }
        });
        let result = merge(&base, &overlay);

        // replicas should be overridden
        assert_eq!(result["spec"]["replicas"], 5);
        // image should be preserved
        assert_eq!(result["spec"]["image"], "api:1.0");
    }

    #[test]
    fn array_replace() {
        let base = json!({"spec": {"env": [{"name": "A", "value": "1"}]}});
        let overlay = json!({"spec": {"env": [{"name": "B", "value": "2"}]}});
        let result = merge(&base, &overlay);

        // Array should be completely replaced, no element-wise merge
        let env = result["spec"]["env"].as_array().unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env[0], json!({"name": "B", "value": "2"}));
    }

    #[test]
    fn empty_override_is_identity() {
        let base = json!({
            "kind": "service",
            "spec": {"replicas": 3, "ports": [80, 443], "labels": {}}
        });
        assert_eq!(merge(&base, &json!({})), base);
    }

    #[test]
    fn override_only_keys_follow_base_keys() {
        let base = json!({"b": 1, "a": 2});
        let overlay = json!({"c": 3, "a": 4});
        let result = merge(&base, &overlay);

        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(result["a"], 4);
    }

    #[test]
    fn kind_mismatch_override_wins() {
        let base = json!({"spec": {"resources": {"cpu": "1"}}});
        let overlay = json!({"spec": {"resources": "default"}});
        let result = merge(&base, &overlay);
        assert_eq!(result["spec"]["resources"], "default");
    }

    #[test]
    fn null_override() {
        let base = json!({"value": 100});
        let overlay = json!({"value": null});
        let result = merge(&base, &overlay);

        assert!(result["value"].is_null());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let base = json!({"spec": {"replicas": 3}});
        let overlay = json!({"spec": {"replicas": 4, "image": "x"}});
        let _merged = merge(&base, &overlay);
        assert_eq!(base, json!({"spec": {"replicas": 3}}));
        assert_eq!(overlay, json!({"spec": {"replicas": 4, "image": "x"}}));
    }

    #[test]
    fn merge_layers_in_order() {
        let file = json!({
            "projectDir": "./project",
            "stateDir": ".envoverride"
        });
        let cli = json!({
            "stateDir": "/var/lib/envoverride"
        });

        let result = merge_layers(vec![file, cli]);

        assert_eq!(result["projectDir"], "./project");
        assert_eq!(result["stateDir"], "/var/lib/envoverride");
    }

    #[test]
    fn merge_layers_of_nothing_is_empty_object() {
        assert_eq!(merge_layers(Vec::new()), json!({}));
    }
}
