// src/http/path.rs

//! Request path -> filesystem path resolution.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::http::error::RequestError;

/// Resolve a raw (percent-encoded) request path to a path under `root`.
///
/// `prefix` is stripped when present; requests that do not carry it are
/// resolved as-is. The remainder is joined to `root` component by component.
/// Parent-directory, absolute and NUL-containing components are rejected
/// rather than normalized away.
pub fn resolve_request_path(
    root: &Path,
    prefix: &str,
    uri_path: &str,
) -> Result<PathBuf, RequestError> {
    let decoded = urlencoding::decode(uri_path)
        .map_err(|e| RequestError::InvalidPath(format!("{uri_path}: {e}")))?;

    let relative = decoded.strip_prefix(prefix).unwrap_or(&*decoded);
    let relative = relative.trim_start_matches('/');

    let mut result = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => {
                if name.to_string_lossy().contains('\0') {
                    warn!("Path component contains null byte: {:?}", name);
                    return Err(RequestError::PathTraversal);
                }
                result.push(name);
            }
            Component::CurDir => continue,
            Component::ParentDir => {
                warn!("Path traversal attempt detected: parent directory (..) in {uri_path:?}");
                return Err(RequestError::PathTraversal);
            }
            Component::RootDir | Component::Prefix(_) => {
                warn!("Absolute path component in {uri_path:?}");
                return Err(RequestError::PathTraversal);
            }
        }
    }

    Ok(result)
}
