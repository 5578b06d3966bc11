//! Route guard.
//!
//! Every request is classified by path before it reaches a handler:
//!
//! | Class       | Session | Outcome                                   |
//! |-------------|---------|-------------------------------------------|
//! | PUBLIC      | any     | pass through                              |
//! | AUTH or `/` | yes     | redirect to the dashboard                 |
//! | PROTECTED   | yes     | pass through                              |
//! | AUTH        | no      | pass through                              |
//! | PROTECTED   | no      | redirect to sign-in with `callbackUrl`    |
//!
//! The decision is a pure function of path class and session presence; the
//! middleware only gathers those two inputs and turns the decision into a
//! response.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::config::GuardPaths;
use crate::state::AppState;

/// Access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PathClass {
    /// Reachable by anyone.
    Public,
    /// Sign-in and related pages.
    Auth,
    /// Everything else.
    Protected,
}

/// Outcome of the guard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through.
    Allow,
    /// Send an authenticated user to the dashboard.
    RedirectToDashboard,
    /// Send an anonymous user to sign in, returning to `callback_url` after.
    RedirectToSignIn { callback_url: Option<String> },
}

impl GuardDecision {
    /// Redirect target, or `None` for [`GuardDecision::Allow`].
    pub fn location(&self, paths: &GuardPaths) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToDashboard => Some(paths.dashboard.clone()),
            Self::RedirectToSignIn { callback_url: None } => Some(paths.sign_in.clone()),
            Self::RedirectToSignIn {
                callback_url: Some(url),
            } => Some(format!(
                "{}?callbackUrl={}",
                paths.sign_in,
                urlencoding::encode(url)
            )),
        }
    }
}

/// `true` if `path` is `prefix` itself or a path segment below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Classify a request path (without query string).
pub fn classify(path: &str, paths: &GuardPaths) -> PathClass {
    if paths.public_files.iter().any(|file| file == path)
        || paths
            .public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        || under(path, &paths.auth_api)
    {
        PathClass::Public
    } else if under(path, &paths.auth_prefix) {
        PathClass::Auth
    } else {
        PathClass::Protected
    }
}

/// Decide what to do with a request.
///
/// `path_and_query` is the original target; it becomes the callback URL
/// when an anonymous user is sent to sign in from anywhere but the root.
pub fn decide(class: PathClass, path_and_query: &str, has_session: bool) -> GuardDecision {
    let path = path_and_query.split('?').next().unwrap_or_default();
    let is_root = path == "/";

    match (class, has_session) {
        (PathClass::Public, _) => GuardDecision::Allow,
        (PathClass::Auth, true) => GuardDecision::RedirectToDashboard,
        (PathClass::Protected, true) if is_root => GuardDecision::RedirectToDashboard,
        (PathClass::Protected, true) | (PathClass::Auth, false) => GuardDecision::Allow,
        (PathClass::Protected, false) => GuardDecision::RedirectToSignIn {
            callback_url: (!is_root).then(|| path_and_query.to_string()),
        },
    }
}

/// Axum middleware applying [`classify`] and [`decide`] to every request.
///
/// An allowed request with a valid session carries the verified
/// [`SessionClaims`](crate::session::SessionClaims) as an extension.
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let paths = &state.config.paths;
    let class = classify(request.uri().path(), paths);
    if class == PathClass::Public {
        return next.run(request).await;
    }

    let session = state.read_session(&jar);
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), |pq| pq.as_str().to_string());

    let decision = decide(class, &path_and_query, session.is_some());
    match decision.location(paths) {
        None => {
            if let Some(claims) = session {
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        Some(location) => {
            debug!(%class, path = %request.uri().path(), %location, "route guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
