// src/store.rs

//! Shared path -> fingerprint cache with change notification.
//!
//! The store is the single serialization point between the watch loop (the
//! writer) and request handlers (readers). Entries live behind an `RwLock`;
//! every mutation that changes a fingerprint also bumps a store-wide
//! generation counter while the write guard is still held. Waiters subscribe
//! to that counter *before* checking their predicate, so a mutation that
//! lands between "check" and "suspend" always wakes them.
//!
//! The signal is coarse: any change anywhere wakes every waiter, and each
//! waiter re-checks its own path after waking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::fingerprint::{Fingerprint, fingerprint};
use crate::fs::FileSystem;
use crate::watch::WatcherHandle;

/// What a single `refresh` did to the entry for its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The path is now present with a fingerprint different from before
    /// (including absent -> present).
    Updated(Fingerprint),
    /// Read succeeded and produced the fingerprint already stored.
    Unchanged,
    /// Read failed and an existing entry was dropped.
    Removed,
    /// Read failed and there was no entry to begin with.
    StillAbsent,
}

impl RefreshOutcome {
    /// Whether waiters were signalled.
    pub fn changed(&self) -> bool {
        matches!(self, RefreshOutcome::Updated(_) | RefreshOutcome::Removed)
    }
}

/// Result of a bounded or cancellable wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The stored value differs from the one the caller knew about.
    Changed(Option<Fingerprint>),
    Cancelled,
    TimedOut,
}

pub struct FingerprintStore {
    fs: Arc<dyn FileSystem>,
    entries: RwLock<HashMap<PathBuf, Fingerprint>>,
    generation: watch::Sender<u64>,
    /// Held across a whole read-then-store so a slower, older read can never
    /// land after a newer one. Readers of `entries` do not take it.
    refresh_lock: Mutex<()>,
    watcher: Mutex<Option<WatcherHandle>>,
}

impl std::fmt::Debug for FingerprintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintStore")
            .field("entries", &self.len())
            .field("generation", &*self.generation.borrow())
            .finish_non_exhaustive()
    }
}

impl FingerprintStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            fs,
            entries: RwLock::new(HashMap::new()),
            generation,
            refresh_lock: Mutex::new(()),
            watcher: Mutex::new(None),
        }
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, Fingerprint>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, Fingerprint>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake every waiter. Must be called with the write guard held.
    fn broadcast(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    /// Current fingerprint for `path`, or `None` if it is unknown.
    pub fn lookup(&self, path: &Path) -> Option<Fingerprint> {
        self.read_entries().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-read `path` and store its fingerprint.
    ///
    /// Refreshes are serialized against each other, so the stored value is
    /// always from the most recent read. The read and the hash happen outside
    /// the entries lock; lookups and waiters are never blocked on file I/O.
    /// Read failures of any kind drop the entry.
    pub fn refresh(&self, path: &Path) -> RefreshOutcome {
        let _serial = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let bytes = match self.fs.read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(?path, error = %err, "file unreadable");
                let mut entries = self.write_entries();
                if entries.remove(path).is_none() {
                    return RefreshOutcome::StillAbsent;
                }
                self.broadcast();
                drop(entries);
                info!(?path, "removed fingerprint");
                return RefreshOutcome::Removed;
            }
        };

        let next = fingerprint(&bytes);
        let mut entries = self.write_entries();
        let previous = entries.insert(path.to_path_buf(), next.clone());
        if previous.as_ref() == Some(&next) {
            return RefreshOutcome::Unchanged;
        }
        self.broadcast();
        drop(entries);

        info!(?path, etag = %next, "updated fingerprint");
        RefreshOutcome::Updated(next)
    }

    /// Refresh each path in turn. No path's result depends on another's.
    pub fn refresh_all<I, P>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut changed = 0;
        for path in paths {
            if self.refresh(path.as_ref()).changed() {
                changed += 1;
            }
        }
        changed
    }

    /// Seed the cache with every regular file directly inside `root`.
    ///
    /// Returns the number of entries that changed.
    pub fn seed_from_dir(&self, root: &Path) -> Result<usize> {
        let files: Vec<PathBuf> = self
            .fs
            .read_dir(root)?
            .into_iter()
            .filter(|p| self.fs.is_file(p))
            .collect();

        let seeded = self.refresh_all(&files);
        info!(root = ?root, files = files.len(), seeded, "seeded fingerprint cache");
        Ok(seeded)
    }

    /// Wait until the stored value for `path` differs from `known`.
    ///
    /// Returns immediately if it already differs. Dropping the future
    /// abandons the wait.
    pub async fn await_change(
        &self,
        path: &Path,
        known: Option<&Fingerprint>,
    ) -> Option<Fingerprint> {
        // Subscribing marks the current generation as seen, so any
        // mutation after this point wakes us even if it lands before the
        // first check below.
        let mut changes = self.generation.subscribe();
        loop {
            let current = self.lookup(path);
            if current.as_ref() != known {
                return current;
            }
            if changes.changed().await.is_err() {
                return self.lookup(path);
            }
        }
    }

    /// [`await_change`](Self::await_change) bounded by a cancellation token
    /// and an optional deadline.
    pub async fn await_change_until(
        &self,
        path: &Path,
        known: Option<&Fingerprint>,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> WaitOutcome {
        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            current = self.await_change(path, known) => WaitOutcome::Changed(current),
            _ = cancel.cancelled() => WaitOutcome::Cancelled,
            _ = deadline => WaitOutcome::TimedOut,
        }
    }

    /// Hand ownership of the running watcher to the store. Replaces (and
    /// stops) any watcher attached before.
    pub fn attach_watcher(&self, handle: WatcherHandle) {
        let previous = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if previous.is_some() {
            debug!("replaced previously attached watcher");
        }
    }

    /// Stop the attached watcher. Safe to call more than once.
    pub fn close(&self) {
        let handle = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            drop(handle);
            info!("file watcher closed");
        }
    }
}
