//! Development identity provider for the back-office console.
//!
//! Mimics the two login integrations of the real identity backend:
//!
//! * `POST /Auth/login` with `{"email", "password"}` — answers a camelCase
//!   token pair and issues string subjects.
//! * `POST /auth/login` with `{"username", "password"}` — answers a
//!   Keycloak-style snake_case token pair and issues numeric subjects.
//!
//! Users live in an in-memory directory. Access tokens are signed JWTs
//! whose claims follow the Keycloak layout (`realm_access.roles`, …).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Audience written into every access token.
pub const AUDIENCE: &str = "backoffice-console";

// ---------------------------------------------------------------------------
// Signing keys
// ---------------------------------------------------------------------------

/// Key material used to sign access tokens.
pub struct SigningKeys {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    kid: String,
    public_jwk: Option<Value>,
}

impl SigningKeys {
    /// Generate an RSA key pair and sign with RS256.
    pub fn rsa(bits: usize) -> anyhow::Result<Self> {
        let mut rng = rand::thread_rng();
        let priv_key = RsaPrivateKey::new(&mut rng, bits)?;
        let pub_key = RsaPublicKey::from(&priv_key);

        let priv_pem = priv_key
            .to_pkcs1_pem(rsa::pkcs8::LineEnding::LF)
            .map_err(|e| anyhow::anyhow!("PKCS#1 encoding failed: {e}"))?;
        let encoding_key = EncodingKey::from_rsa_pem(priv_pem.as_bytes())?;

        let kid = "mock-idp-key-1".to_string();
        let public_jwk = json!({
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "kid": kid,
            "n": URL_SAFE_NO_PAD.encode(pub_key.n().to_bytes_be()),
            "e": URL_SAFE_NO_PAD.encode(pub_key.e().to_bytes_be()),
        });

        Ok(Self {
            encoding_key,
            algorithm: Algorithm::RS256,
            kid,
            public_jwk: Some(public_jwk),
        })
    }

    /// Sign with HS256 using a shared secret. Nothing is published on `/jwks`.
    pub fn hmac(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            kid: "mock-idp-hmac".to_string(),
            public_jwk: None,
        }
    }
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

/// A user known to the mock provider.
#[derive(Debug, Clone)]
pub struct IdpUser {
    /// Subject issued through `/Auth/login`.
    pub id: String,
    /// Subject issued through `/auth/login`.
    pub numeric_id: u64,
    /// Login email.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Plain-text password; this is a development tool.
    pub password: String,
    /// Realm roles.
    pub roles: Vec<String>,
}

/// Users available out of the box.
pub fn default_users() -> Vec<IdpUser> {
    vec![
        IdpUser {
            id: "7c9e6679-7425-40de-944b-e07fc1f90ae7".into(),
            numeric_id: 1,
            email: "admin@backoffice.local".into(),
            username: "admin".into(),
            name: "Back-office Admin".into(),
            password: "admin".into(),
            roles: vec!["admin".into(), "inventory".into()],
        },
        IdpUser {
            id: "3f2504e0-4f89-11d3-9a0c-0305e82c3301".into(),
            numeric_id: 2,
            email: "a@b.com".into(),
            username: "clerk".into(),
            name: "Store Clerk".into(),
            password: "secret".into(),
            roles: vec!["inventory".into()],
        },
    ]
}

// ---------------------------------------------------------------------------
// State & router
// ---------------------------------------------------------------------------

/// Shared state of the mock provider.
#[derive(Clone)]
pub struct IdpState {
    keys: Arc<SigningKeys>,
    issuer: String,
    users: Arc<Vec<IdpUser>>,
    token_ttl: Duration,
}

impl IdpState {
    /// Provider with the [`default_users`] and a five minute token lifetime.
    pub fn new(keys: SigningKeys, issuer: impl Into<String>) -> Self {
        Self {
            keys: Arc::new(keys),
            issuer: issuer.into(),
            users: Arc::new(default_users()),
            token_ttl: Duration::minutes(5),
        }
    }

    /// Replace the user directory.
    #[must_use]
    pub fn with_users(mut self, users: Vec<IdpUser>) -> Self {
        self.users = Arc::new(users);
        self
    }

    /// Override the access token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

/// Build the provider's routes.
pub fn router(state: IdpState) -> Router {
    Router::new()
        .route("/.well-known/openid-configuration", get(openid_configuration))
        .route("/jwks", get(jwks))
        .route("/Auth/login", post(login_by_email))
        .route("/auth/login", post(login_by_username))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

async fn openid_configuration(State(state): State<IdpState>) -> Json<Value> {
    let issuer = &state.issuer;
    Json(json!({
        "issuer": issuer,
        "token_endpoint": format!("{issuer}/Auth/login"),
        "jwks_uri": format!("{issuer}/jwks"),
        "response_types_supported": ["token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": [format!("{:?}", state.keys.algorithm)]
    }))
}

async fn jwks(State(state): State<IdpState>) -> Json<Value> {
    let keys: Vec<Value> = state.keys.public_jwk.iter().cloned().collect();
    Json(json!({ "keys": keys }))
}

#[derive(Deserialize)]
struct EmailLogin {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct UsernameLogin {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login_by_email(State(state): State<IdpState>, Json(req): Json<EmailLogin>) -> Response {
    let user = state
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(&req.email) && u.password == req.password);
    let Some(user) = user else {
        info!(email = %req.email, "rejected login");
        return invalid_grant();
    };

    match issue_tokens(&state, user, json!(user.id)) {
        Ok(tokens) => Json(json!({
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
            "expiresIn": tokens.expires_in,
            "tokenType": "Bearer"
        }))
        .into_response(),
        Err(e) => signing_failed(&e),
    }
}

async fn login_by_username(
    State(state): State<IdpState>,
    Json(req): Json<UsernameLogin>,
) -> Response {
    let user = state
        .users
        .iter()
        .find(|u| u.username == req.username && u.password == req.password);
    let Some(user) = user else {
        info!(username = %req.username, "rejected login");
        return invalid_grant();
    };

    match issue_tokens(&state, user, json!(user.numeric_id)) {
        Ok(tokens) => Json(json!({
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
            "expires_in": tokens.expires_in,
            "refresh_expires_in": tokens.expires_in * 6,
            "token_type": "Bearer",
            "scope": "openid profile email"
        }))
        .into_response(),
        Err(e) => signing_failed(&e),
    }
}

// ---------------------------------------------------------------------------
// Token issuance
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RealmAccess {
    roles: Vec<String>,
}

#[derive(Serialize)]
struct AccessClaims {
    iss: String,
    sub: Value,
    aud: String,
    exp: i64,
    iat: i64,
    jti: String,
    typ: String,
    azp: String,
    name: String,
    preferred_username: String,
    email: String,
    realm_access: RealmAccess,
    scope: String,
}

struct IssuedTokens {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

fn issue_tokens(
    state: &IdpState,
    user: &IdpUser,
    sub: Value,
) -> Result<IssuedTokens, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + state.token_ttl;

    let claims = AccessClaims {
        iss: state.issuer.clone(),
        sub,
        aud: AUDIENCE.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
        typ: "Bearer".to_string(),
        azp: AUDIENCE.to_string(),
        name: user.name.clone(),
        preferred_username: user.username.clone(),
        email: user.email.clone(),
        realm_access: RealmAccess {
            roles: user.roles.clone(),
        },
        scope: "openid profile email".to_string(),
    };

    let header = Header {
        kid: Some(state.keys.kid.clone()),
        alg: state.keys.algorithm,
        ..Default::default()
    };
    let access_token = encode(&header, &claims, &state.keys.encoding_key)?;

    info!(sub = %claims.sub, "access token issued");
    Ok(IssuedTokens {
        access_token,
        refresh_token: uuid::Uuid::new_v4().to_string(),
        expires_in: state.token_ttl.num_seconds(),
    })
}

fn invalid_grant() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid user credentials"
        })),
    )
        .into_response()
}

fn signing_failed(error: &jsonwebtoken::errors::Error) -> Response {
    tracing::error!(error = %error, "token signing failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "server_error" })),
    )
        .into_response()
}
