//! Token pair returned by the identity provider's login endpoint.

use serde::{Deserialize, Serialize};

/// Access / refresh token pair issued after a successful login.
///
/// Both the Keycloak snake_case layout and the camelCase layout of the
/// back-office API are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityToken {
    /// Signed access token (JWT).
    #[serde(alias = "accessToken", alias = "token")]
    pub access_token: String,
    /// Refresh token, if the provider issued one.
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<u64>,
    /// Refresh token lifetime in seconds.
    #[serde(default, alias = "refreshExpiresIn")]
    pub refresh_expires_in: Option<u64>,
    /// Token type, usually `Bearer`.
    #[serde(default, alias = "tokenType")]
    pub token_type: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl IdentityToken {
    /// Absolute expiry of the access token in unix seconds, given the
    /// instant the token was received.
    pub fn expires_at(&self, received_at: i64) -> Option<i64> {
        self.expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| received_at.saturating_add(secs))
    }
}
