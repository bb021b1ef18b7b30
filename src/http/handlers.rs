// src/http/handlers.rs

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::fingerprint::Fingerprint;
use crate::http::error::RequestError;
use crate::http::path::resolve_request_path;
use crate::http::{AppState, WAIT_HEADER};
use crate::store::WaitOutcome;

const CACHE_CONTROL_VALUE: &str = "public, must-revalidate";

/// Any method, any path: attach the current (or next) fingerprint as `ETag`
/// and hand the request to `ServeFile` for the bytes.
///
/// With `X-Wait-If-Match: true` the response is held until the stored
/// fingerprint differs from `If-None-Match`, the configured wait timeout
/// passes, or the server shuts down.
pub async fn serve(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, RequestError> {
    let path = resolve_request_path(&state.root, &state.prefix, req.uri().path())?;
    let client_tag = if_none_match(req.headers());

    // Blocking needs a token to compare against; without one the request
    // is answered like a plain GET.
    let etag = match (&client_tag, wants_wait(req.headers())) {
        (Some(known), true) => {
            debug!(?path, ?known, "long-poll waiting for change");
            let outcome = state
                .store
                .await_change_until(&path, Some(known), &state.shutdown, state.wait_timeout)
                .await;
            match outcome {
                WaitOutcome::Changed(current) => current,
                released => {
                    debug!(?path, outcome = ?released, "long-poll released without change");
                    state.store.lookup(&path)
                }
            }
        }
        _ => state.store.lookup(&path),
    };

    // A released long-poll or a revalidating GET whose tag still matches
    // gets no body.
    let conditional = req.method() == Method::GET || req.method() == Method::HEAD;
    if conditional {
        if let (Some(current), Some(client)) = (&etag, &client_tag) {
            if current == client {
                return Ok(not_modified(current));
            }
        }
    }

    let served = ServeFile::new(&path).oneshot(req).await;
    let mut response = match served {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };
    apply_cache_headers(response.headers_mut(), etag.as_ref());
    Ok(response)
}

fn wants_wait(headers: &HeaderMap) -> bool {
    headers
        .get(WAIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn if_none_match(headers: &HeaderMap) -> Option<Fingerprint> {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .and_then(Fingerprint::parse_etag)
}

fn apply_cache_headers(headers: &mut HeaderMap, etag: Option<&Fingerprint>) {
    if let Some(etag) = etag {
        if let Ok(value) = HeaderValue::from_str(&etag.to_header_value()) {
            headers.insert(header::ETAG, value);
        }
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_VALUE),
    );
}

fn not_modified(etag: &Fingerprint) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    apply_cache_headers(response.headers_mut(), Some(etag));
    response
}
