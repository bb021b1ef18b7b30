// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::store::FingerprintStore;
use crate::watch::event_handler::paths_to_refresh;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching and end the
/// event loop.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Hands notify events to the watch loop. Once the loop has gone away every
/// later event is dropped; that is reported a single time.
struct EventForwarder {
    tx: UnboundedSender<notify::Result<Event>>,
    loop_gone: bool,
}

impl EventForwarder {
    fn new(tx: UnboundedSender<notify::Result<Event>>) -> Self {
        Self { tx, loop_gone: false }
    }

    /// Returns whether the event reached the loop.
    fn forward(&mut self, res: notify::Result<Event>) -> bool {
        if self.tx.send(res).is_ok() {
            return true;
        }
        if !self.loop_gone {
            self.loop_gone = true;
            warn!("watch loop has exited; dropping further notify events");
        }
        false
    }
}

/// Spawn a filesystem watcher on `root` (non-recursive) that refreshes
/// `store` for every file created, written, renamed or removed directly
/// inside it.
///
/// Refreshed paths are keyed under `root` exactly as passed in, whether it is
/// relative, symlinked or canonical.
///
/// Must be called from within a tokio runtime. Failing to create or register
/// the watcher is returned as an error; errors reported later by the event
/// stream end the loop and leave the store serving what it last knew.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    store: &Arc<FingerprintStore>,
) -> Result<WatcherHandle> {
    // Not canonicalized: cache keys are `root.join(name)` for the root as
    // given, the same keys `seed_from_dir(root)` produces. `child_of_root`
    // maps events reported under another prefix back onto it.
    let root = root.into();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) =
        tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut forwarder = EventForwarder::new(event_tx);
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            forwarder.forward(res);
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::NonRecursive)?;

    info!("file watcher started on {:?}", root);

    // The loop only holds a weak reference; the store owns the handle.
    let store: Weak<FingerprintStore> = Arc::downgrade(store);
    tokio::spawn(async move {
        while let Some(res) = event_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    error!(error = %err, "file watch error; no further changes will be observed");
                    return;
                }
            };
            debug!(?event, "received notify event");

            // Refreshes run one at a time so two events for the same path
            // are applied in the order they were reported.
            for path in paths_to_refresh(&event, &root) {
                let Some(store) = store.upgrade() else {
                    debug!("fingerprint store dropped; stopping watch loop");
                    return;
                };
                let refreshed = tokio::task::spawn_blocking(move || store.refresh(&path)).await;
                if let Err(err) = refreshed {
                    warn!(error = %err, "fingerprint refresh task failed");
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
