//! Authenticated pass-through to the back-office API.
//!
//! `ANY /api/backoffice/{*path}` is forwarded to `{API_BASE_URL}/{path}`
//! through [`ApiClient`], carrying the session's access token as bearer
//! token. Status, content type and body are relayed unchanged.
//!
//! The path is forwarded still percent-encoded, so `%2F` and `%3F` cannot
//! change the upstream path or query. Dot segments are refused.

use axum::body::{Body, Bytes};
use axum::extract::{Extension, RawQuery, State};
use axum::http::{Method, Uri, header};
use axum::response::Response;
use backoffice_sdk::{ApiClient, SdkError};
use serde_json::Value;
use tracing::debug;

use crate::error::AuthError;
use crate::session::SessionClaims;
use crate::state::AppState;

/// Mount point of the pass-through.
pub const API_PREFIX: &str = "/api/backoffice";

/// Raw upstream path of a request below [`API_PREFIX`].
pub fn upstream_path(request_path: &str) -> Result<&str, AuthError> {
    let path = request_path
        .strip_prefix(API_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| AuthError::InvalidPath(request_path.to_string()))?;

    let dot_segment = path.split('/').any(|segment| {
        let decoded = urlencoding::decode(segment).unwrap_or_default();
        segment.contains('\\') || decoded == "." || decoded == ".."
    });
    if dot_segment {
        return Err(AuthError::InvalidPath(request_path.to_string()));
    }
    Ok(path)
}

/// Forward one request to the back-office API.
pub async fn forward(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    method: Method,
    uri: Uri,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AuthError> {
    let path = upstream_path(uri.path())?;
    let base = state
        .config
        .api_base_url
        .as_deref()
        .ok_or(AuthError::NotConfigured("API_BASE_URL"))?;
    let client = ApiClient::with_http_client(state.http.clone(), base)?
        .with_session(Some(&claims.record));

    let body: Option<Value> = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body)?)
    };
    let target = match query {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    debug!(%method, path = %target, sub = %claims.record.id, "forwarding to back-office API");
    let upstream = client.send(method, &target, body.as_ref()).await?;

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream.bytes().await.map_err(SdkError::from)?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_path_encoded() {
        assert_eq!(
            upstream_path("/api/backoffice/api/Categories").unwrap(),
            "api/Categories"
        );
        assert_eq!(
            upstream_path("/api/backoffice/api/a%3Fb%2Fc").unwrap(),
            "api/a%3Fb%2Fc"
        );
    }

    #[test]
    fn refuses_dot_segments() {
        for path in [
            "/api/backoffice/../Auth/login",
            "/api/backoffice/api/%2e%2e/%2E%2E/Auth/login",
            "/api/backoffice/./api",
            "/api/backoffice/api/..\\Auth",
        ] {
            assert!(
                matches!(upstream_path(path), Err(AuthError::InvalidPath(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn refuses_paths_outside_prefix() {
        assert!(upstream_path("/api/backoffice/").is_err());
        assert!(upstream_path("/api/backofficex/a").is_err());
    }
}
