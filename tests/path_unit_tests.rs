//! Unit tests for property paths

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {

    use envoverride::OverrideError;
    use envoverride::value::{PropertyPath, Segment, delete, get, merge, set};
    use serde_json::json;

    fn path(raw: &str) -> PropertyPath {
        PropertyPath::parse(raw).unwrap()
    }

    fn assert_path_error<T: std::fmt::Debug>(result: Result<T, OverrideError>) {
        let err = result.unwrap_err();
        assert!(matches!(err, OverrideError::Path { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn parse_keys_and_indices() {
        let parsed = path("spec.env.0.value");
        assert_eq!(
            parsed.segments(),
            [
                Segment::Key("spec".to_owned()),
                Segment::Key("env".to_owned()),
                Segment::Index(0),
                Segment::Key("value".to_owned()),
            ]
        );
        assert_eq!(parsed.to_string(), "spec.env.0.value");
    }

    #[test]
    fn parse_non_digit_segments_as_keys() {
        assert_eq!(path("a.-1").segments()[1], Segment::Key("-1".to_owned()));
        assert_eq!(path("a.1a").segments()[1], Segment::Key("1a".to_owned()));
        assert_eq!(path("a.10").segments()[1], Segment::Index(10));
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert_path_error(PropertyPath::parse(""));
        assert_path_error(PropertyPath::parse("spec..replicas"));
        assert_path_error(PropertyPath::parse(".spec"));
        assert_path_error(PropertyPath::parse("spec."));
        assert_path_error(PropertyPath::parse("spec.env.01"));
        assert_path_error(PropertyPath::parse("spec.env.99999999999999999999999999"));
    }

    #[test]
    fn path_serializes_as_string() {
        assert_eq!(serde_json::to_value(path("spec.env.0")).unwrap(), json!("spec.env.0"));
        assert_eq!(serde_json::to_value(PropertyPath::root()).unwrap(), json!(""));

        let parsed: PropertyPath = serde_json::from_value(json!("spec.replicas")).unwrap();
        assert_eq!(parsed, path("spec.replicas"));
        let root: PropertyPath = serde_json::from_value(json!("")).unwrap();
        assert!(root.is_root());
    }

    #[test]
    fn get_existing_and_missing_values() {
        let doc = json!({"spec": {"replicas": 3, "env": [{"name": "A"}, {"name": "B"}]}});

        assert_eq!(get(&doc, &path("spec.replicas")).unwrap(), Some(&json!(3)));
        assert_eq!(get(&doc, &path("spec.env.1.name")).unwrap(), Some(&json!("B")));
        assert_eq!(get(&doc, &path("spec.env.5")).unwrap(), None);
        assert_eq!(get(&doc, &path("spec.resources.limits.cpu")).unwrap(), None);
    }

    #[test]
    fn get_rejects_incompatible_traversal() {
        let doc = json!({"spec": {"image": "api:1.0", "ports": [80]}});

        assert_path_error(get(&doc, &path("spec.image.tag")));
        assert_path_error(get(&doc, &path("spec.ports.first")));
    }

    #[test]
    fn get_index_on_object_uses_digit_key() {
        let doc = json!({"codes": {"404": "missing"}});
        assert_eq!(get(&doc, &path("codes.404")).unwrap(), Some(&json!("missing")));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let original = json!({});
        let updated = set(&original, &path("spec.resources.limits.cpu"), json!("500m")).unwrap();

        assert_eq!(updated, json!({"spec": {"resources": {"limits": {"cpu": "500m"}}}}));
        // Input untouched
        assert_eq!(original, json!({}));
    }

    #[test]
    fn set_never_creates_arrays() {
        let updated = set(&json!({}), &path("spec.env.0"), json!("A")).unwrap();
        assert_eq!(updated, json!({"spec": {"env": {"0": "A"}}}));
    }

    #[test]
    fn set_replaces_and_appends_array_elements() {
        let doc = json!({"ports": [80, 443]});

        let replaced = set(&doc, &path("ports.1"), json!(8443)).unwrap();
        assert_eq!(replaced, json!({"ports": [80, 8443]}));

        let appended = set(&doc, &path("ports.2"), json!(9090)).unwrap();
        assert_eq!(appended, json!({"ports": [80, 443, 9090]}));

        assert_path_error(set(&doc, &path("ports.5"), json!(1)));
    }

    #[test]
    fn set_rejects_type_conflicts() {
        let doc = json!({"spec": {"replicas": 3, "ports": [80]}});

        assert_path_error(set(&doc, &path("spec.replicas.min"), json!(1)));
        assert_path_error(set(&doc, &path("spec.ports.name"), json!("http")));
    }

    #[test]
    fn delete_prunes_empty_ancestors_to_root() {
        let doc = json!({"spec": {"resources": {"limits": {"cpu": "500m"}}}});
        let pruned = delete(&doc, &path("spec.resources.limits.cpu"));
        assert_eq!(pruned, json!({}));
    }

    #[test]
    fn delete_stops_at_non_empty_ancestor() {
        let doc = json!({"spec": {"replicas": 3, "resources": {"limits": {"cpu": "1"}}}});
        let pruned = delete(&doc, &path("spec.resources.limits.cpu"));
        assert_eq!(pruned, json!({"spec": {"replicas": 3}}));
    }

    #[test]
    fn delete_missing_path_is_noop() {
        let doc = json!({"spec": {"replicas": 3, "image": "api"}});

        assert_eq!(delete(&doc, &path("spec.resources.cpu")), doc);
        assert_eq!(delete(&doc, &path("spec.image.tag")), doc);
        assert_eq!(delete(&doc, &path("metadata")), doc);
    }

    #[test]
    fn delete_leaves_unrelated_empty_objects() {
        let doc = json!({"labels": {}, "spec": {"replicas": 3}});
        assert_eq!(delete(&doc, &path("spec.replicas")), json!({"labels": {}}));
    }

    #[test]
    fn delete_array_elements() {
        let doc = json!({"spec": {"ports": [80, 443, 8080]}});
        assert_eq!(
            delete(&doc, &path("spec.ports.1")),
            json!({"spec": {"ports": [80, 8080]}})
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let doc = json!({"spec": {"replicas": 10, "image": "api:2.0"}});
        let once = delete(&doc, &path("spec.replicas"));
        let twice = delete(&once, &path("spec.replicas"));
        assert_eq!(once, twice);
        assert_eq!(once, json!({"spec": {"image": "api:2.0"}}));
    }

    #[test]
    fn displayed_digit_key_still_addresses_the_key() {
        let document = json!({"ports": {"0": {"name": "http"}}});
        let original = PropertyPath::root().key("ports").key("0").key("name");
        let reparsed = path(&original.to_string());

        assert_ne!(reparsed, original);
        assert_eq!(reparsed.segments()[1], Segment::Index(0));
        assert_eq!(
            get(&document, &reparsed).unwrap(),
            get(&document, &original).unwrap()
        );
        assert_eq!(
            set(&document, &reparsed, json!("https")).unwrap(),
            set(&document, &original, json!("https")).unwrap()
        );
        assert_eq!(delete(&document, &reparsed), json!({}));
    }

    #[test]
    fn override_wins_at_every_leaf() {
        let base = json!({
            "spec": {"replicas": 3, "image": "api:1.0", "resources": {"cpu": "1", "memory": "1Gi"}}
        });
        let overrides = json!({
            "spec": {"replicas": 10, "resources": {"memory": "2Gi"}},
            "metadata": {"owner": "team-a"}
        });
        let effective = merge(&base, &overrides);

        for leaf in ["spec.replicas", "spec.resources.memory", "metadata.owner"] {
            let leaf = path(leaf);
            assert_eq!(
                get(&effective, &leaf).unwrap(),
                get(&overrides, &leaf).unwrap(),
                "leaf {leaf}"
            );
        }
        assert_eq!(get(&effective, &path("spec.image")).unwrap(), Some(&json!("api:1.0")));
    }
}
