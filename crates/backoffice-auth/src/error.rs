//! Error types for the console gateway.
//!
//! [`AuthError`] unifies all failure modes and implements
//! [`axum::response::IntoResponse`] so handlers can return
//! `Result<…, AuthError>` directly. Authentication failures are reported to
//! the client with a generic message; the cause only goes to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use backoffice_models::ModelError;
use backoffice_sdk::SdkError;
use serde_json::json;

/// Errors that can occur while authenticating or serving a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials were missing or blank.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(#[from] ModelError),

    /// A required setting is absent.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The identity provider rejected the login or answered an error.
    #[error("identity exchange failed: {0}")]
    ExchangeFailed(String),

    /// The identity provider could not be reached.
    #[error("failed to reach identity provider: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token payload could not be decoded.
    #[error("access token could not be decoded: {0}")]
    Decode(String),

    /// The session token could not be signed or verified.
    #[error("session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    /// The identity expired before a session could be issued.
    #[error("session would already be expired")]
    SessionExpired,

    /// A call to the back-office API failed.
    #[error("back-office API error: {0}")]
    Api(#[from] SdkError),

    /// A pass-through path that would leave the API base.
    #[error("invalid API path: {0}")]
    InvalidPath(String),

    /// JSON (de)serialisation error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidCredentials(_)
            | Self::ExchangeFailed(_)
            | Self::Http(_)
            | Self::Decode(_) => (StatusCode::UNAUTHORIZED, "authentication failed"),
            Self::Session(_) | Self::SessionExpired => (StatusCode::UNAUTHORIZED, "not authenticated"),
            Self::NotConfigured(_) | Self::Api(_) => {
                (StatusCode::BAD_GATEWAY, "back-office API unavailable")
            }
            Self::InvalidPath(_) => (StatusCode::BAD_REQUEST, "invalid API path"),
            Self::Serialization(_) => (StatusCode::BAD_REQUEST, "malformed JSON body"),
        };

        tracing::error!(%status, error = %self, "request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
