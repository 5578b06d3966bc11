//! Shared gateway state.
//!
//! Built once at startup; cloning is cheap.

use std::sync::Arc;

use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::config::AppConfig;
use crate::cookies;
use crate::identity::IdentityExchange;
use crate::session::{SessionClaims, SessionCodec};

/// State shared across all Axum handlers and the route guard.
#[derive(Clone)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<AppConfig>,
    /// Credential login against the identity provider.
    pub identity: Arc<IdentityExchange>,
    /// Session token codec; absent when no secret is configured.
    pub sessions: Option<Arc<SessionCodec>>,
    /// Outbound HTTP client shared by the exchange and the API pass-through.
    pub http: reqwest::Client,
}

impl AppState {
    /// Build the state from a loaded configuration.
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::new();
        let identity = IdentityExchange::from_config(http.clone(), &config);
        let sessions = SessionCodec::from_config(&config).map(Arc::new);

        Self {
            config: Arc::new(config),
            identity: Arc::new(identity),
            sessions,
            http,
        }
    }

    /// Verified session carried by the request cookies, if any.
    pub fn read_session(&self, jar: &CookieJar) -> Option<SessionClaims> {
        let token = cookies::session_token(jar, &self.config.session_cookie)?;
        let Some(codec) = self.sessions.as_deref() else {
            debug!("session cookie ignored: SESSION_SECRET is not configured");
            return None;
        };

        match codec.verify(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!(error = %e, "session cookie rejected");
                None
            }
        }
    }
}
