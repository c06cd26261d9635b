//! Storage Integration Tests.
//!
//! These tests drive subject backends through the `SubjectBackend` trait only,
//! so any implementation can be checked with the same helpers.

use std::sync::Arc;

use rspex_domain::{ContextSet, SubjectDataStore, SubjectRef};
use rspex_storage::{MemoryBackendConfig, MemorySubjectBackend, StorageError, SubjectBackend};

/// Installs a test subscriber once so `RUST_LOG=debug` shows backend spans.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ctx(tokens: &[&str]) -> ContextSet {
    ContextSet::parse_all(tokens).unwrap()
}

/// Helper function to run a write/read cycle against any SubjectBackend.
async fn run_basic_update_test<B: SubjectBackend>(backend: &B) {
    let subject = SubjectRef::new("user", "alice");
    let global = ContextSet::empty();
    let nether = ctx(&["world=nether"]);

    backend
        .update_subject(&subject, &|s| {
            s.set_permission(&global, "build", 1)
                .set_option(&nether, "prefix", Some("[N]"))
                .add_parent(&global, "group", "default")
        })
        .await
        .unwrap();

    let data = backend.get_subject(&subject).await.unwrap();
    assert_eq!(data.get_permissions(&global).get("build"), Some(&1));
    assert_eq!(
        data.get_options(&nether).get("prefix").map(String::as_str),
        Some("[N]")
    );
    assert_eq!(data.get_parents(&global), vec![SubjectRef::group("default")]);
    assert!(backend.subject_exists(&subject).await.unwrap());
}

/// Helper function to check that readers keep their snapshot across writes.
async fn run_snapshot_isolation_test<B: SubjectBackend>(backend: &B) {
    let subject = SubjectRef::new("group", "admin");
    let global = ContextSet::empty();

    backend
        .update_subject(&subject, &|s| s.set_permission(&global, "build", 1))
        .await
        .unwrap();
    let snapshot = backend.get_subject(&subject).await.unwrap();

    backend
        .update_subject(&subject, &|s| s.set_permission(&global, "build", -1))
        .await
        .unwrap();

    assert_eq!(snapshot.get_permissions(&global).get("build"), Some(&1));
    let current = backend.get_subject(&subject).await.unwrap();
    assert_eq!(current.get_permissions(&global).get("build"), Some(&-1));
}

#[tokio::test]
async fn test_memory_backend_basic_update() {
    init_tracing();
    run_basic_update_test(&MemorySubjectBackend::new()).await;
}

#[tokio::test]
async fn test_memory_backend_snapshot_isolation() {
    init_tracing();
    run_snapshot_isolation_test(&MemorySubjectBackend::new()).await;
}

#[tokio::test]
async fn test_backend_as_trait_object() {
    init_tracing();
    let backend: Arc<dyn SubjectBackend> = Arc::new(MemorySubjectBackend::new());
    let subject = SubjectRef::new("user", "carol");

    let data = SubjectDataStore::new().set_default_value(&ContextSet::empty(), 1);
    backend.set_subject(&subject, data).await.unwrap();
    let data = backend.get_subject(&subject).await.unwrap();
    assert_eq!(data.get_default_value(&ContextSet::empty()), 1);
}

/// Concurrent writers each add their own permission nodes; none may be lost.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_not_lost() {
    init_tracing();
    let backend = Arc::new(MemorySubjectBackend::with_config(
        MemoryBackendConfig::default().with_max_update_retries(10_000),
    ));
    let subject = SubjectRef::new("group", "builders");

    let mut handles = Vec::new();
    for writer in 0..8 {
        let backend = Arc::clone(&backend);
        let subject = subject.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                let node = format!("node.{writer}.{i}");
                let global = ContextSet::empty();
                backend
                    .update_subject(&subject, &move |s| s.set_permission(&global, &node, 1))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let data = backend.get_subject(&subject).await.unwrap();
    assert_eq!(data.get_permissions(&ContextSet::empty()).len(), 8 * 25);
}

/// Readers holding a generation see no partial write while writers proceed.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_observe_whole_generations() {
    init_tracing();
    let backend = MemorySubjectBackend::new_shared();
    let subject = SubjectRef::new("user", "dave");
    let a = ctx(&["world=a"]);
    let b = ctx(&["world=b"]);

    let writer = {
        let backend = Arc::clone(&backend);
        let subject = subject.clone();
        let (a, b) = (a.clone(), b.clone());
        tokio::spawn(async move {
            for i in 1..=200 {
                // Both context sets always move together within one generation
                backend
                    .update_subject(&subject, &|s| {
                        s.set_default_value(&a, i).set_default_value(&b, i)
                    })
                    .await
                    .unwrap();
            }
        })
    };

    for _ in 0..200 {
        let data = backend.get_subject(&subject).await.unwrap();
        assert_eq!(data.get_default_value(&a), data.get_default_value(&b));
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
}

#[tokio::test]
async fn test_import_rejects_malformed_parent() {
    init_tracing();
    let backend = MemorySubjectBackend::new();
    let subject = SubjectRef::new("user", "erin");

    let result = backend
        .import_subject(&subject, r#"[{"parents": ["user:"]}]"#)
        .await;
    assert!(matches!(result, Err(StorageError::Domain(_))));
    assert!(!backend.subject_exists(&subject).await.unwrap());
}
