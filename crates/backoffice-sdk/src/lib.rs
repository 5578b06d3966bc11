//! # Back-office SDK
//!
//! HTTP client adapter for the back-office REST API.
//!
//! The SDK provides:
//!
//! * [`ApiClient`] — base URL, JSON default headers and bearer-token
//!   injection from the current session.
//! * [`RefreshQueue`] — per-client coordination of token refreshes so that
//!   concurrent `401` responses trigger a single refresh.
//! * [`SdkError`] — unified error type for all SDK operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use backoffice_sdk::ApiClient;
//!
//! # async fn run() -> Result<(), backoffice_sdk::SdkError> {
//! let client = ApiClient::new("http://localhost:5000/api")?;
//! client.set_token(Some("eyJhbGciOi...".to_string()));
//!
//! let products: serde_json::Value = client.get_json("/Products").await?;
//! # let _ = products;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod refresh;

pub use client::ApiClient;
pub use error::SdkError;
pub use refresh::RefreshQueue;
