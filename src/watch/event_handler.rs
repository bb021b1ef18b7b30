// src/watch/event_handler.rs

//! Translation of raw notify events into cache refreshes.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind};
use tracing::trace;

use crate::watch::path_utils::child_of_root;

/// Whether an event kind can change what a read of the path returns.
///
/// Creates, writes, renames (both halves) and removals count; pure access
/// notifications do not.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Paths whose fingerprints should be recomputed for `event`.
///
/// Returns cache keys (see [`child_of_root`]) for every relevant path that is
/// a direct child of `root`, without duplicates.
pub fn paths_to_refresh(event: &Event, root: &Path) -> Vec<PathBuf> {
    if !is_relevant(&event.kind) {
        trace!(kind = ?event.kind, "ignoring event kind");
        return Vec::new();
    }

    let mut paths: Vec<PathBuf> = Vec::with_capacity(event.paths.len());
    for path in &event.paths {
        match child_of_root(root, path) {
            Some(key) if !paths.contains(&key) => paths.push(key),
            Some(_) => {}
            None => trace!(?path, "event outside watched root"),
        }
    }
    paths
}
