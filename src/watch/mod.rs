// src/watch/mod.rs

//! Filesystem watching for the served root.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform, non-recursive watcher (`notify`) on the root.
//! - Deciding which paths an event touches (`event_handler`).
//! - Feeding those paths into `FingerprintStore::refresh`.
//!
//! It does **not** know about HTTP; the store is its only output.

pub mod event_handler;
pub mod path_utils;
pub mod watcher;

pub use event_handler::paths_to_refresh;
pub use watcher::{spawn_watcher, WatcherHandle};
