#![allow(dead_code)]

use std::collections::HashMap;

use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::any;
use axum::{Json, Router};
use axum_test::{TestResponse, TestServer};
use backoffice_auth::config::AppConfig;
use backoffice_auth::session::SessionCodec;
use backoffice_auth::state::AppState;
use backoffice_models::SessionRecord;
use mock_idp::{IdpState, SigningKeys};
use serde_json::{Value, json};

pub const SECRET: &str = "integration-secret";
pub const COOKIE_NAME: &str = "backoffice.session-token";

/// Build the gateway from `vars`.
pub fn gateway(vars: &[(&str, &str)]) -> TestServer {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned());
    TestServer::new(backoffice_auth::app(AppState::new(config))).unwrap()
}

/// Gateway with a session secret but no identity provider.
pub fn offline_gateway() -> TestServer {
    gateway(&[("SESSION_SECRET", SECRET)])
}

/// Echo the request's method, URI, bearer token and JSON body.
async fn echo(request: axum::extract::Request) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Json(json!({
        "method": parts.method.as_str(),
        "uri": parts.uri.to_string(),
        "authorization": parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
        "body": body,
    }))
}

/// Spawn the mock identity provider, plus an echoing API under `/api`, on
/// an ephemeral port. Returns its base URL.
pub async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let idp = IdpState::new(SigningKeys::hmac(b"idp-secret"), base.clone());
    let app = mock_idp::router(idp).merge(Router::new().route("/api/{*rest}", any(echo)));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

pub fn record() -> SessionRecord {
    SessionRecord {
        id: "u-1".into(),
        name: "Ada".into(),
        email: Some("ada@example.com".into()),
        external_token: "access-token".into(),
        roles: vec!["admin".into()],
    }
}

/// A session token signed with [`SECRET`].
pub fn valid_token() -> String {
    SessionCodec::new(SECRET, 3600)
        .issue(record(), None)
        .unwrap()
        .0
}

pub fn session_cookie(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{COOKIE_NAME}={token}")).unwrap()
}

pub fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Value of the session cookie set by `response`, if any.
pub fn set_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let (pair, _) = raw.split_once(';').unwrap_or((raw, ""));
            let (name, value) = pair.split_once('=')?;
            (name.trim() == COOKIE_NAME).then(|| value.trim().to_string())
        })
}
