// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod fs;
pub mod http;
pub mod logging;
pub mod store;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::http::AppState;
use crate::store::FingerprintStore;
use crate::watch::spawn_watcher;

pub use crate::fingerprint::{Fingerprint, fingerprint};
pub use crate::store::{RefreshOutcome, WaitOutcome};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - fingerprint store, watcher and initial seeding
/// - the HTTP server
/// - Ctrl-C handling (releases pending long-polls, then stops the watcher)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => ConfigFile::default(),
    };
    let cfg = cfg.with_overrides(&args)?;
    let root = cfg.resolve_root()?;

    let store = start_tracking(&root, Arc::new(RealFileSystem)).await?;

    let state = AppState::new(Arc::clone(&store), root.clone(), cfg.server.prefix.clone())
        .with_wait_timeout(cfg.wait_timeout());
    let shutdown = state.shutdown.clone();
    let app = http::router(state);

    let addr = cfg.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving {} on http://{}", root.display(), addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await;

    store.close();
    served?;
    Ok(())
}

/// Build a store for `root`, start watching it and seed it from disk.
///
/// The watcher is registered before seeding so that changes racing with the
/// initial scan are still observed. Seeding and the watcher key files as
/// `root.join(name)` for `root` as given. The returned store owns the watcher;
/// call [`FingerprintStore::close`] to stop it.
pub async fn start_tracking(
    root: &Path,
    fs: Arc<dyn FileSystem>,
) -> Result<Arc<FingerprintStore>> {
    let store = Arc::new(FingerprintStore::new(fs));
    let handle = spawn_watcher(root, &store)?;
    store.attach_watcher(handle);

    let seeding = Arc::clone(&store);
    let seed_root = root.to_path_buf();
    tokio::task::spawn_blocking(move || seeding.seed_from_dir(&seed_root))
        .await
        .map_err(anyhow::Error::from)??;

    Ok(store)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested; releasing pending long-polls");
    shutdown.cancel();
}
