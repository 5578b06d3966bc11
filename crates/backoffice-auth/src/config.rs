//! Console gateway configuration.
//!
//! Built from environment variables at startup and shared with every Axum
//! handler through [`AppState`](crate::state::AppState). Missing secrets do
//! not abort startup: the affected features fail closed instead.

use backoffice_models::LoginVariant;
use tracing::warn;

/// Paths the route guard and the auth routes are built around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPaths {
    /// Sign-in page (`/auth/signIn`).
    pub sign_in: String,
    /// Prefix of every auth page (`/auth`).
    pub auth_prefix: String,
    /// Landing page for authenticated users (`/dashboard`).
    pub dashboard: String,
    /// Prefix of the auth API (`/api/auth`), always public.
    pub auth_api: String,
    /// Exact paths reachable without a session.
    pub public_files: Vec<String>,
    /// Path prefixes reachable without a session.
    pub public_prefixes: Vec<String>,
}

impl Default for GuardPaths {
    fn default() -> Self {
        Self {
            sign_in: "/auth/signIn".into(),
            auth_prefix: "/auth".into(),
            dashboard: "/dashboard".into(),
            auth_api: "/api/auth".into(),
            public_files: vec![
                "/favicon.ico".into(),
                "/sitemap.xml".into(),
                "/robots.txt".into(),
            ],
            public_prefixes: vec!["/static/".into(), "/assets/".into()],
        }
    }
}

/// Global configuration shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the back-office API and its login endpoints.
    pub api_base_url: Option<String>,
    /// Secret signing the session cookie.
    pub session_secret: Option<String>,
    /// Which login integration to call.
    pub login_variant: LoginVariant,
    /// Port to listen on (default `3000`).
    pub listen_port: u16,
    /// Upper bound on the session lifetime in seconds.
    pub session_max_age_secs: i64,
    /// Mark cookies `Secure`.
    pub secure_cookies: bool,
    /// Name of the session cookie.
    pub session_cookie: String,
    /// Route guard paths.
    pub paths: GuardPaths,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable               | Default    | Description                          |
    /// |------------------------|------------|--------------------------------------|
    /// | `API_BASE_URL`         | unset      | Back-office API and login base URL   |
    /// | `SESSION_SECRET`       | unset      | HS256 secret for the session cookie  |
    /// | `LOGIN_VARIANT`        | `email`    | `email` or `username`                |
    /// | `CONSOLE_PORT`         | `3000`     | HTTP listen port                     |
    /// | `SESSION_MAX_AGE_SECS` | `2592000`  | Session lifetime cap (30 days)       |
    /// | `SECURE_COOKIES`       | `false`    | `true`/`1` to mark cookies `Secure`  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let login_variant = match non_empty("LOGIN_VARIANT") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "falling back to the email login variant");
                LoginVariant::Email
            }),
            None => LoginVariant::Email,
        };

        let listen_port = non_empty("CONSOLE_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let session_max_age_secs = non_empty("SESSION_MAX_AGE_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &i64| *secs > 0)
            .unwrap_or(30 * 24 * 60 * 60);

        let secure_cookies = matches!(
            non_empty("SECURE_COOKIES").as_deref(),
            Some("1" | "true")
        );

        let session_cookie = if secure_cookies {
            "__Secure-backoffice.session-token"
        } else {
            "backoffice.session-token"
        };

        Self {
            api_base_url: non_empty("API_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string()),
            session_secret: non_empty("SESSION_SECRET"),
            login_variant,
            listen_port,
            session_max_age_secs,
            secure_cookies,
            session_cookie: session_cookie.to_string(),
            paths: GuardPaths::default(),
        }
    }
}
