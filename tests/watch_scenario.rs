use std::sync::Arc;
use std::time::Duration;

use waitserve::fingerprint;
use waitserve_test_utils::site::TestSite;
use waitserve_test_utils::{init_tracing, wait_until, with_timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overwrite_then_delete_propagates_through_watcher() {
    init_tracing();
    let site = TestSite::new();
    let a = site.write("a.txt", "hello");
    let store = site.start().await;

    let h1 = fingerprint(b"hello");
    let h2 = fingerprint(b"world");
    assert_eq!(store.lookup(&a), Some(h1.clone()));

    let waiter = {
        let store = Arc::clone(&store);
        let a = a.clone();
        let h1 = h1.clone();
        tokio::spawn(async move { store.await_change(&a, Some(&h1)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    site.write("a.txt", "world");
    // The writer may truncate before writing, so the waiter can observe an
    // intermediate (empty) read; it must never see the old token again.
    let woke_with = with_timeout(waiter).await.unwrap();
    assert!(woke_with.is_some());
    assert_ne!(woke_with, Some(h1));
    assert!(wait_until(|| store.lookup(&a) == Some(h2.clone())).await);

    site.remove("a.txt");
    let after_delete = with_timeout(store.await_change(&a, Some(&h2))).await;
    assert_eq!(after_delete, None);
    assert_eq!(store.lookup(&a), None);

    store.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn created_and_renamed_files_are_tracked() {
    init_tracing();
    let site = TestSite::new();
    let store = site.start().await;
    assert!(store.is_empty());

    let new = site.write("new.txt", "fresh");
    assert!(wait_until(|| store.lookup(&new) == Some(fingerprint(b"fresh"))).await);

    let renamed = site.path("renamed.txt");
    std::fs::rename(&new, &renamed).unwrap();
    assert!(
        wait_until(|| store.lookup(&new).is_none()
            && store.lookup(&renamed) == Some(fingerprint(b"fresh")))
        .await
    );

    store.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn nested_directories_are_not_tracked() {
    init_tracing();
    let site = TestSite::new();
    std::fs::create_dir(site.path("sub")).unwrap();
    site.write("sub/inner.txt", "deep");
    let store = site.start().await;

    assert_eq!(store.lookup(&site.path("sub/inner.txt")), None);
    assert_eq!(store.lookup(&site.path("sub")), None);
    assert!(store.is_empty());

    store.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn close_stops_updates_and_is_idempotent() {
    init_tracing();
    let site = TestSite::new();
    let a = site.write("a.txt", "before");
    let store = site.start().await;
    assert_eq!(store.lookup(&a), Some(fingerprint(b"before")));

    store.close();
    store.close();

    site.write("a.txt", "after");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(store.lookup(&a), Some(fingerprint(b"before")));

    // Manual refreshes keep working after the watcher is gone.
    store.refresh(&a);
    assert_eq!(store.lookup(&a), Some(fingerprint(b"after")));
}

#[tokio::test]
async fn start_tracking_fails_for_missing_root() {
    init_tracing();
    let site = TestSite::new();
    let missing = site.path("does-not-exist");
    let result =
        waitserve::start_tracking(&missing, Arc::new(waitserve::fs::RealFileSystem)).await;
    assert!(result.is_err());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn symlinked_root_keeps_one_key_per_file() {
    init_tracing();
    let site = TestSite::new();
    site.write("a.txt", "hello");

    let links = tempfile::tempdir().unwrap();
    let linked_root = links.path().join("site");
    std::os::unix::fs::symlink(site.root(), &linked_root).unwrap();

    let store =
        waitserve::start_tracking(&linked_root, Arc::new(waitserve::fs::RealFileSystem))
            .await
            .unwrap();
    let a = linked_root.join("a.txt");
    assert_eq!(store.lookup(&a), Some(fingerprint(b"hello")));

    site.write("a.txt", "world");
    assert!(wait_until(|| store.lookup(&a) == Some(fingerprint(b"world"))).await);
    // Watcher updates land on the seeded key rather than next to it.
    assert_eq!(store.len(), 1);

    store.close();
}
