// src/http/mod.rs

//! HTTP surface: one fallback handler for every method and path.

pub mod error;
pub mod handlers;
pub mod path;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub use error::RequestError;
pub use path::resolve_request_path;

use crate::store::FingerprintStore;

/// Request header that turns a request into a long-poll.
pub const WAIT_HEADER: &str = "x-wait-if-match";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FingerprintStore>,
    /// Canonical directory files are served from
    pub root: PathBuf,
    /// URL prefix stripped before resolving under `root`
    pub prefix: String,
    /// Upper bound on a long-poll; `None` waits until a change or shutdown
    pub wait_timeout: Option<Duration>,
    /// Cancelled on shutdown to release pending long-polls
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<FingerprintStore>, root: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            store,
            root,
            prefix: prefix.into(),
            wait_timeout: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

/// Build the router serving `state.root`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::serve)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
