//! Session bridge.
//!
//! Two projections tie the identity exchange to the pages:
//!
//! * [`on_login`] turns a fresh [`IdentityResult`] into the
//!   [`SessionRecord`] stored in the session cookie.
//! * [`on_session_read`] turns a stored record into the [`PublicSession`]
//!   handed to pages and API consumers.
//!
//! [`SessionCodec`] persists records as HS256-signed JWTs whose lifetime is
//! capped by the identity provider's token expiry.

use backoffice_models::{IdentityResult, PublicSession, SessionRecord, SessionUser};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AuthError;

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Build the session record for a successful login.
pub fn on_login(identity: IdentityResult) -> SessionRecord {
    SessionRecord {
        id: identity.id,
        name: identity.name,
        email: identity.email,
        external_token: identity.external_token,
        roles: identity.roles,
    }
}

/// Resolve the record to persist: a fresh login replaces whatever was
/// stored, otherwise the existing record passes through untouched.
pub fn jwt_callback(
    existing: Option<SessionRecord>,
    login: Option<IdentityResult>,
) -> Option<SessionRecord> {
    login.map(on_login).or(existing)
}

/// Project a stored record into the session object exposed to pages.
pub fn on_session_read(record: &SessionRecord, expires: DateTime<Utc>) -> PublicSession {
    PublicSession {
        user: SessionUser {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            token: record.external_token.clone(),
            roles: record.roles.clone(),
        },
        expires,
    }
}

// ---------------------------------------------------------------------------
// Signed session token
// ---------------------------------------------------------------------------

/// Claims of the session cookie: the record plus its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Persisted session contents.
    #[serde(flatten)]
    pub record: SessionRecord,
    /// Issue instant in unix seconds.
    pub iat: i64,
    /// Expiry in unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    /// Expiry as an instant.
    pub fn expires(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Remaining lifetime in seconds at issue time.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }

    /// The session object exposed to pages.
    pub fn to_public(&self) -> PublicSession {
        on_session_read(&self.record, self.expires())
    }
}

/// Signs and verifies session tokens with a shared secret.
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    max_age_secs: i64,
}

impl SessionCodec {
    /// Codec for `secret`, capping sessions at `max_age_secs`.
    pub fn new(secret: &str, max_age_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            max_age_secs,
        }
    }

    /// Codec from the gateway configuration; `None` without a secret.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config
            .session_secret
            .as_deref()
            .map(|secret| Self::new(secret, config.session_max_age_secs))
    }

    /// Sign `record`, expiring at the earlier of the maximum session age
    /// and `not_after`.
    pub fn issue(
        &self,
        record: SessionRecord,
        not_after: Option<i64>,
    ) -> Result<(String, SessionClaims), AuthError> {
        self.issue_at(record, not_after, Utc::now().timestamp())
    }

    /// [`issue`](Self::issue) with an explicit clock.
    pub fn issue_at(
        &self,
        record: SessionRecord,
        not_after: Option<i64>,
        now: i64,
    ) -> Result<(String, SessionClaims), AuthError> {
        let cap = now.saturating_add(self.max_age_secs);
        let exp = not_after.map_or(cap, |limit| limit.min(cap));
        if exp <= now {
            return Err(AuthError::SessionExpired);
        }

        let claims = SessionClaims {
            record,
            iat: now,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok((token, claims))
    }

    /// Check signature and expiry of a session token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        Ok(decode::<SessionClaims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> IdentityResult {
        IdentityResult {
            id: "u-1".into(),
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            external_token: "access".into(),
            roles: vec!["admin".into(), "inventory".into()],
            expires_at: None,
        }
    }

    fn record() -> SessionRecord {
        on_login(identity())
    }

    #[test]
    fn on_login_copies_fields() {
        let record = record();
        assert_eq!(record.id, "u-1");
        assert_eq!(record.name, "Ada");
        assert_eq!(record.email.as_deref(), Some("ada@example.com"));
        assert_eq!(record.external_token, "access");
        assert_eq!(record.roles, vec!["admin", "inventory"]);
    }

    #[test]
    fn jwt_callback_prefers_fresh_login() {
        let stale = SessionRecord {
            id: "old".into(),
            ..record()
        };
        let fresh = jwt_callback(Some(stale.clone()), Some(identity())).unwrap();
        assert_eq!(fresh.id, "u-1");

        let kept = jwt_callback(Some(stale.clone()), None).unwrap();
        assert_eq!(kept, stale);

        assert!(jwt_callback(None, None).is_none());
    }

    #[test]
    fn session_read_is_field_for_field_and_idempotent() {
        let record = record();
        let expires = DateTime::from_timestamp(2_000_000_000, 0).unwrap();

        let first = on_session_read(&record, expires);
        let second = on_session_read(&record, expires);
        assert_eq!(first, second);
        assert_eq!(first.user.id, record.id);
        assert_eq!(first.user.email, record.email);
        assert_eq!(first.user.token, record.external_token);
        assert_eq!(first.user.roles, record.roles);
    }

    #[test]
    fn issued_token_verifies() {
        let codec = SessionCodec::new("secret", 3600);
        let (token, issued) = codec.issue(record(), None).unwrap();

        let verified = codec.verify(&token).unwrap();
        assert_eq!(verified, issued);
        assert_eq!(verified.lifetime_secs(), 3600);
        assert_eq!(verified.to_public(), verified.to_public());
    }

    #[test]
    fn identity_expiry_caps_lifetime() {
        let codec = SessionCodec::new("secret", 3600);
        let now = Utc::now().timestamp();
        let (_, claims) = codec.issue_at(record(), Some(now + 300), now).unwrap();
        assert_eq!(claims.exp, now + 300);
    }

    #[test]
    fn expired_identity_is_refused() {
        let codec = SessionCodec::new("secret", 3600);
        let now = Utc::now().timestamp();
        assert!(matches!(
            codec.issue_at(record(), Some(now), now),
            Err(AuthError::SessionExpired)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = SessionCodec::new("secret", 60);
        let long_ago = Utc::now().timestamp() - 10_000;
        let (token, _) = codec.issue_at(record(), None, long_ago).unwrap();
        assert!(matches!(codec.verify(&token), Err(AuthError::Session(_))));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let (token, _) = SessionCodec::new("one", 60).issue(record(), None).unwrap();
        assert!(SessionCodec::new("two", 60).verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(SessionCodec::new("secret", 60).verify("not-a-token").is_err());
    }
}
