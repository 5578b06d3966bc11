//! HTTP client adapter for the back-office REST API.
//!
//! [`ApiClient`] pins a base URL, sends JSON default headers and attaches the
//! current session's access token as a bearer token. Clearing the token
//! removes the `Authorization` header from subsequent requests.
//!
//! # Typical usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use backoffice_sdk::{ApiClient, RefreshQueue, SdkError};
//!
//! # async fn run() -> Result<(), SdkError> {
//! let queue = Arc::new(RefreshQueue::new(|| async {
//!     // Exchange the refresh token with the identity provider here.
//!     Ok::<_, SdkError>("new-access-token".to_string())
//! }));
//!
//! let client = ApiClient::new("http://localhost:5000/api")?
//!     .with_refresh_queue(queue);
//! client.set_token(Some("access-token".into()));
//!
//! client.delete("/Categories/7").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use backoffice_models::SessionRecord;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SdkError;
use crate::refresh::RefreshQueue;

/// Client for the back-office REST API bound to one base URL.
///
/// Cloning is cheap; clones share the bearer token and the refresh queue.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_headers: HeaderMap,
    token: Arc<RwLock<Option<String>>>,
    refresh: Option<Arc<RefreshQueue>>,
}

impl ApiClient {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a client with its own connection pool.
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing connection pool.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Result<Self, SdkError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "base URL must be absolute http(s): {base_url:?}"
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            default_headers,
            token: Arc::new(RwLock::new(None)),
            refresh: None,
        })
    }

    /// Attach a refresh queue consulted when the API answers `401`.
    #[must_use]
    pub fn with_refresh_queue(mut self, queue: Arc<RefreshQueue>) -> Self {
        self.refresh = Some(queue);
        self
    }

    /// Set the initial bearer token.
    #[must_use]
    pub fn with_token(self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    /// Take the bearer token from `session`; no session means no token.
    #[must_use]
    pub fn with_session(self, session: Option<&SessionRecord>) -> Self {
        self.with_token(session.map(|s| s.external_token.clone()))
    }

    // ------------------------------------------------------------------
    // Session token
    // ------------------------------------------------------------------

    /// Replace the bearer token; `None` stops sending `Authorization`.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path` (which may carry a query string).
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    /// Send a request and return the raw response, whatever its status.
    ///
    /// On `401` with a refresh queue attached, the token is refreshed and
    /// the request retried once.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, SdkError> {
        let response = self.dispatch(method.clone(), path, body).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(queue) = &self.refresh else {
            return Ok(response);
        };

        debug!(%method, path, "API answered 401, refreshing token");
        let token = queue.fresh_token().await?;
        self.set_token(Some(token));
        self.dispatch(method, path, body).await
    }

    /// `GET` a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        let response = self.send(Method::GET, path, None).await?;
        Self::ensure_success(response).await?.json().await.map_err(Into::into)
    }

    /// `POST` a JSON body and decode the JSON answer.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, Some(&body)).await?;
        Self::ensure_success(response).await?.json().await.map_err(Into::into)
    }

    /// `PUT` a JSON body and decode the JSON answer.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, path, Some(&body)).await?;
        Self::ensure_success(response).await?.json().await.map_err(Into::into)
    }

    /// `DELETE` a resource, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), SdkError> {
        let response = self.send(Method::DELETE, path, None).await?;
        Self::ensure_success(response).await.map(|_| ())
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, SdkError> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .headers(self.default_headers.clone());

        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Return the response on success or an error carrying status and body.
    async fn ensure_success(response: Response) -> Result<Response, SdkError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(SdkError::Status { status, body })
    }
}
