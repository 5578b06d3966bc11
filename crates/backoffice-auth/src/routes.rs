//! Auth API: credential sign-in, session read and sign-out.
//!
//! Mounted under [`GuardPaths::auth_api`], which the route guard always
//! lets through.

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use backoffice_models::Credentials;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::GuardPaths;
use crate::cookies;
use crate::error::AuthError;
use crate::session;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body of `POST {auth_api}/callback/credentials`.
#[derive(Debug, Default, Deserialize)]
pub struct SignInForm {
    /// Email or username, depending on the login variant.
    #[serde(alias = "email", alias = "username")]
    pub identifier: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Where to go after signing in.
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// `callback` if it is a same-origin relative path.
pub fn safe_callback(callback: Option<&str>) -> Option<&str> {
    callback.filter(|url| url.starts_with('/') && !url.starts_with("//") && !url.contains('\\'))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Routes of the auth API, nested at `paths.auth_api`.
pub fn auth_routes(paths: &GuardPaths) -> Router<AppState> {
    let base = paths.auth_api.trim_end_matches('/');
    Router::new()
        .route(&format!("{base}/callback/credentials"), post(sign_in))
        .route(&format!("{base}/session"), get(read_session))
        .route(&format!("{base}/signout"), post(sign_out))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST {auth_api}/callback/credentials`: exchange credentials for a
/// session cookie.
async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let paths = &state.config.paths;
    let callback = safe_callback(form.callback_url.as_deref()).map(String::from);

    match issue_session(&state, &form).await {
        Ok((token, lifetime)) => {
            let cookie = cookies::session_cookie(
                &state.config.session_cookie,
                &token,
                lifetime,
                state.config.secure_cookies,
            );
            let target = callback.unwrap_or_else(|| paths.dashboard.clone());
            (jar.add(cookie), Redirect::to(&target)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "sign-in rejected");
            let mut target = format!("{}?error=CredentialsSignin", paths.sign_in);
            if let Some(callback) = callback {
                target.push_str("&callbackUrl=");
                target.push_str(&urlencoding::encode(&callback));
            }
            Redirect::to(&target).into_response()
        }
    }
}

/// Run the exchange and the session bridge, returning the signed token and
/// its lifetime in seconds.
async fn issue_session(state: &AppState, form: &SignInForm) -> Result<(String, i64), AuthError> {
    let codec = state
        .sessions
        .as_deref()
        .ok_or(AuthError::NotConfigured("SESSION_SECRET"))?;

    let credentials = Credentials::new(
        form.identifier.as_deref().unwrap_or_default(),
        form.password.as_deref().unwrap_or_default(),
    );
    let identity = state
        .identity
        .authorize(&credentials)
        .await
        .ok_or_else(|| AuthError::ExchangeFailed("credentials were not accepted".into()))?;

    let not_after = identity.expires_at;
    let record = session::jwt_callback(None, Some(identity))
        .ok_or_else(|| AuthError::ExchangeFailed("no session record".into()))?;
    let (token, claims) = codec.issue(record, not_after)?;

    info!(sub = %claims.record.id, expires = %claims.expires(), "session issued");
    Ok((token, claims.lifetime_secs()))
}

/// `GET {auth_api}/session`: the current session, or `{}`.
async fn read_session(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    match state.read_session(&jar) {
        Some(claims) => Json(serde_json::to_value(claims.to_public()).unwrap_or_else(|_| json!({}))),
        None => Json(json!({})),
    }
}

/// `POST {auth_api}/signout`: drop the session cookie.
async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(cookies::clear_session_cookie(
        &state.config.session_cookie,
        state.config.secure_cookies,
    ));
    (jar, Redirect::to(&state.config.paths.sign_in))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_must_be_relative() {
        assert_eq!(safe_callback(Some("/dashboard?x=1")), Some("/dashboard?x=1"));
        assert_eq!(safe_callback(Some("//evil.example")), None);
        assert_eq!(safe_callback(Some("https://evil.example")), None);
        assert_eq!(safe_callback(Some("/\\evil.example")), None);
        assert_eq!(safe_callback(None), None);
    }

    #[test]
    fn sign_in_form_accepts_variant_field_names() {
        let email: SignInForm = serde_json::from_value(serde_json::json!({
            "email": "a@b.com", "password": "pw", "callbackUrl": "/x"
        }))
        .unwrap();
        assert_eq!(email.identifier.as_deref(), Some("a@b.com"));
        assert_eq!(email.callback_url.as_deref(), Some("/x"));

        let username: SignInForm =
            serde_json::from_value(serde_json::json!({ "username": "clerk" })).unwrap();
        assert_eq!(username.identifier.as_deref(), Some("clerk"));
        assert!(username.password.is_none());
    }
}
