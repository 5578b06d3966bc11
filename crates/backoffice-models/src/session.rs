//! Identity results and the session shapes derived from them.
//!
//! An [`IdentityResult`] is produced once per successful login. It becomes a
//! [`SessionRecord`], the signed server-side view of the session, which is in
//! turn projected into a [`PublicSession`] whenever a page reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::DecodedClaims;

// ---------------------------------------------------------------------------
// IdentityResult
// ---------------------------------------------------------------------------

/// Outcome of a successful identity exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResult {
    /// Subject identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address, when the token carries one.
    pub email: Option<String>,
    /// Raw access token, forwarded as bearer token to the back-office API.
    pub external_token: String,
    /// Role set.
    pub roles: Vec<String>,
    /// Access token expiry in unix seconds, if known.
    pub expires_at: Option<i64>,
}

impl IdentityResult {
    /// Build a result from decoded claims.
    ///
    /// `identifier` is the value the user logged in with and serves as the
    /// display name when the token carries none. `token_expires_at` takes
    /// precedence over the `exp` claim.
    pub fn from_claims(
        claims: DecodedClaims,
        identifier: &str,
        access_token: String,
        token_expires_at: Option<i64>,
    ) -> Self {
        Self {
            name: claims.display_name(identifier),
            id: claims.sub,
            email: claims.email,
            external_token: access_token,
            roles: claims.roles,
            expires_at: token_expires_at.or(claims.exp),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// Session contents persisted in the signed session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Subject identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Access token for downstream API calls.
    pub external_token: String,
    /// Role set.
    #[serde(default)]
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// PublicSession
// ---------------------------------------------------------------------------

/// The user part of a [`PublicSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Subject identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Access token for downstream API calls.
    pub token: String,
    /// Role set.
    pub roles: Vec<String>,
}

/// Session object exposed to pages and API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSession {
    /// Authenticated user.
    pub user: SessionUser,
    /// Instant the session stops being valid.
    pub expires: DateTime<Utc>,
}
