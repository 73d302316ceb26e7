//! Unit tests for override stores

use envoverride::store::{
    FileOverrideStore, InMemoryOverrideStore, OverrideStore, Revision, StoredOverride,
};
use envoverride::system::{MockSystem, RealSystem, System};
use envoverride::{OverrideError, ResourceKey};
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Barrier;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn key(environment: &str, resource_type: &str, resource_name: &str) -> ResourceKey {
    ResourceKey::new(environment, resource_type, resource_name).unwrap()
}

/// Behaviour every store implementation shares
fn exercise_store(store: &dyn OverrideStore) {
    let api = key("staging", "service", "api");

    // Nothing stored yet
    assert_eq!(store.load(&api).unwrap(), StoredOverride::empty());

    let first = json!({"spec": {"replicas": 10}});
    let revision = store.save(&api, &first, Revision::INITIAL).unwrap();
    assert_eq!(revision, Revision(1));

    let loaded = store.load(&api).unwrap();
    assert_eq!(loaded.document, first);
    assert_eq!(loaded.revision, Revision(1));

    // A writer holding the old revision loses
    let err = store
        .save(&api, &json!({"spec": {"replicas": 2}}), Revision::INITIAL)
        .unwrap_err();
    assert!(matches!(err, OverrideError::Concurrency { .. }), "unexpected error: {err:?}");
    assert_eq!(store.load(&api).unwrap().document, first);

    let second = json!({"spec": {"replicas": 12}});
    assert_eq!(store.save(&api, &second, Revision(1)).unwrap(), Revision(2));
    assert_eq!(store.load(&api).unwrap().document, second);
}

fn exercise_listing(store: &dyn OverrideStore) {
    let overridden = json!({"spec": {"replicas": 2}});
    for (environment, resource_type, resource_name, document) in [
        ("staging", "service", "worker", overridden.clone()),
        ("staging", "service", "api", overridden.clone()),
        ("staging", "postgres", "db", overridden.clone()),
        ("staging", "ingress", "public", json!({})),
        ("production", "service", "api", overridden.clone()),
    ] {
        let resource = key(environment, resource_type, resource_name);
        let revision = store.load(&resource).unwrap().revision;
        store.save(&resource, &document, revision).unwrap();
    }

    let listed = store.list("staging").unwrap();
    assert_eq!(
        listed,
        [
            key("staging", "postgres", "db"),
            key("staging", "service", "api"),
            key("staging", "service", "worker"),
        ]
    );
    assert!(store.list("qa").unwrap().is_empty());
}

#[test]
fn test_memory_store_save_and_load() {
    exercise_store(&InMemoryOverrideStore::new());
}

#[test]
fn test_memory_store_listing() {
    exercise_listing(&InMemoryOverrideStore::new());
}

#[test]
fn test_memory_store_clones_share_documents() {
    let api = key("staging", "service", "api");
    let store = InMemoryOverrideStore::new()
        .with_override(&api, json!({"spec": {"replicas": 4}}))
        .unwrap();
    let other = store.clone();

    assert_eq!(other.load(&api).unwrap().document, json!({"spec": {"replicas": 4}}));
    assert_eq!(other.load(&api).unwrap().revision, Revision(1));
}

#[test]
fn test_file_store_save_and_load() {
    let system = MockSystem::new();
    exercise_store(&FileOverrideStore::new(&system, "/state"));
}

#[test]
fn test_file_store_listing() {
    let system = MockSystem::new();
    exercise_listing(&FileOverrideStore::new(&system, "/state"));
}

#[test]
fn test_file_store_record_layout() {
    let system = MockSystem::new();
    let store = FileOverrideStore::new(&system, "/state");
    let api = key("staging", "service", "api");

    store
        .save(&api, &json!({"spec": {"replicas": 10}}), Revision::INITIAL)
        .unwrap();

    let content = system
        .read_to_string(Path::new("/state/staging/service/api.json"))
        .unwrap();
    let record: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        record,
        json!({"revision": 1, "overrides": {"spec": {"replicas": 10}}})
    );
}

#[test]
fn test_file_store_reads_existing_records() {
    let system = MockSystem::new()
        .with_file(
            "/state/dev/service/api.json",
            br#"{"revision": 7, "overrides": {"spec": {"image": "api:dev"}}}"#,
        )
        .unwrap();
    let store = FileOverrideStore::new(&system, "/state");

    let loaded = store.load(&key("dev", "service", "api")).unwrap();
    assert_eq!(loaded.revision, Revision(7));
    assert_eq!(loaded.document, json!({"spec": {"image": "api:dev"}}));
}

#[test]
fn test_file_store_rejects_corrupt_records() {
    let system = MockSystem::new()
        .with_file("/state/dev/service/api.json", b"{not json")
        .unwrap()
        .with_file(
            "/state/dev/service/web.json",
            br#"{"revision": 1, "overrides": [1, 2]}"#,
        )
        .unwrap();
    let store = FileOverrideStore::new(&system, "/state");

    for name in ["api", "web"] {
        let err = store.load(&key("dev", "service", name)).unwrap_err();
        assert!(matches!(err, OverrideError::Storage { .. }), "unexpected error: {err:?}");
    }
}

#[test]
fn test_file_store_listing_skips_foreign_files() {
    let system = MockSystem::new()
        .with_file(
            "/state/dev/service/api.json",
            br#"{"revision": 1, "overrides": {"spec": {"replicas": 1}}}"#,
        )
        .unwrap()
        .with_file("/state/dev/service/README.md", b"notes")
        .unwrap()
        .with_file("/state/dev/notes.txt", b"notes")
        .unwrap();
    let store = FileOverrideStore::new(&system, "/state");

    assert_eq!(store.list("dev").unwrap(), [key("dev", "service", "api")]);
}

#[test]
fn test_resource_key_validation() {
    assert!(ResourceKey::new("staging", "service", "api-v2").is_ok());
    assert!(ResourceKey::new("staging", "service", "api_1.internal").is_ok());

    for (environment, resource_type, resource_name) in [
        ("", "service", "api"),
        ("staging", "../service", "api"),
        ("staging", "service", ".."),
        ("staging", "service", "api/v2"),
        ("staging", "service", "api v2"),
    ] {
        let err = ResourceKey::new(environment, resource_type, resource_name).unwrap_err();
        assert!(matches!(err, OverrideError::InvalidKey { .. }), "unexpected error: {err:?}");
    }

    assert_eq!(key("staging", "service", "api").to_string(), "staging/service/api");
}

/// Filesystem that stops in its first record write until a second writer is
/// ready to race it
struct PausingSystem<'sys> {
    inner: &'sys dyn System,
    paused: AtomicBool,
    rendezvous: Barrier,
}

impl<'sys> PausingSystem<'sys> {
    fn new(inner: &'sys dyn System) -> Self {
        Self {
            inner,
            paused: AtomicBool::new(false),
            rendezvous: Barrier::new(2),
        }
    }
}

impl System for PausingSystem<'_> {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.inner.read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if !self.paused.swap(true, Ordering::SeqCst) {
            self.rendezvous.wait();
            thread::sleep(Duration::from_millis(50));
        }
        self.inner.write_atomic(path, contents)
    }

    fn with_exclusive_lock(
        &self,
        path: &Path,
        critical: &mut dyn FnMut() -> io::Result<()>,
    ) -> io::Result<()> {
        self.inner.with_exclusive_lock(path, critical)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
}

/// Races two stores on one state directory; the first pauses mid-write
fn race_two_stores(first_system: &dyn System, second_system: &dyn System, root: &Path) {
    let pausing = PausingSystem::new(first_system);
    let first = FileOverrideStore::new(&pausing, root);
    let second = FileOverrideStore::new(second_system, root);
    let api = key("staging", "service", "api");

    let (first_result, second_result) = thread::scope(|scope| {
        let racing = scope.spawn(|| {
            pausing.rendezvous.wait();
            second.save(&api, &json!({"spec": {"image": "other"}}), Revision::INITIAL)
        });
        let saved = first.save(&api, &json!({"spec": {"replicas": 10}}), Revision::INITIAL);
        (saved, racing.join().unwrap())
    });

    assert_eq!(first_result.unwrap(), Revision(1));
    let err = second_result.unwrap_err();
    assert!(matches!(err, OverrideError::Concurrency { .. }), "unexpected error: {err:?}");

    let stored = second.load(&api).unwrap();
    assert_eq!(stored.document, json!({"spec": {"replicas": 10}}));
    assert_eq!(stored.revision, Revision(1));
}

#[test]
fn test_file_store_saves_exclude_other_store_instances() {
    let shared = MockSystem::new();
    race_two_stores(&shared, &shared, Path::new("/state"));
}

#[test]
fn test_file_store_saves_exclude_other_store_instances_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    race_two_stores(&RealSystem::new(), &RealSystem::new(), temp_dir.path());

    // Only the record and its lock file are left behind
    let mut entries: Vec<String> = std::fs::read_dir(temp_dir.path().join("staging/service"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, ["api.json", "api.json.lock"]);
}

#[test]
fn test_file_store_listing_rejects_unsafe_environment() {
    let system = MockSystem::new()
        .with_file(
            "/service/api.json",
            br#"{"revision": 1, "overrides": {"spec": {"replicas": 1}}}"#,
        )
        .unwrap();
    let store = FileOverrideStore::new(&system, "/state");

    for environment in ["..", "../state", ""] {
        let err = store.list(environment).unwrap_err();
        assert!(matches!(err, OverrideError::InvalidKey { .. }), "unexpected error: {err:?}");
    }
}
