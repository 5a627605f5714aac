//! Serves generated HTML per site, picking the site from the request host.
//!
//! `blog.localhost:8081/about/` serves `about/index.html` from the `blog`
//! site's HTML root; bare `localhost` maps to the `default` site.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Response},
};
use folio_common::slug;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::utils::filename::escapes_root;
use crate::workspace::Workspace;

pub const DEFAULT_SITE: &str = "default";
const LOCALHOST: &str = "localhost";
const INDEX_FILE: &str = "index.html";

/// Site slug for a `Host` header value.
pub fn site_from_host(host: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    let name = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host.as_str(),
    };

    if name == LOCALHOST {
        return Some(DEFAULT_SITE.to_string());
    }
    let sub = name.strip_suffix(LOCALHOST)?.strip_suffix('.')?;
    slug::is_valid(sub).then(|| sub.to_string())
}

/// File under `root` that a request path refers to.
pub async fn resolve_file(root: &Path, request_path: &str) -> Result<PathBuf, AppError> {
    let rel = request_path.trim_start_matches('/');
    let rel = if rel.is_empty() { INDEX_FILE } else { rel };
    if escapes_root(Path::new(rel)) {
        return Err(AppError::Forbidden(format!("path '{request_path}' is outside the site")));
    }

    let mut path = root.join(rel);
    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
        path.push(INDEX_FILE);
    }
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(path),
        _ => Err(AppError::NotFound(format!("'{request_path}' not found"))),
    }
}

#[instrument(skip(workspace, headers), fields(path = %uri.path()))]
pub async fn serve(
    State(workspace): State<Arc<Workspace>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let site = site_from_host(host)
        .ok_or_else(|| AppError::BadRequest(format!("cannot preview host '{host}'")))?;

    let root = workspace.site_paths(&site).html;
    let path = resolve_file(&root, uri.path()).await?;
    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    debug!(site = %site, file = %path.display(), "Serving preview");

    Ok(([(header::CONTENT_TYPE, mime.as_ref().to_string())], body).into_response())
}

/// Router for the preview listener; every path goes to [`serve`].
pub fn router(workspace: Arc<Workspace>) -> Router {
    Router::new().fallback(serve).with_state(workspace)
}
