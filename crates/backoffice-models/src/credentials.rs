//! Login credentials and the two supported login integrations.
//!
//! The identity provider is reachable through two login endpoints which
//! differ only in path and in the name of the identifier field. Neither is
//! treated as canonical: [`LoginVariant`] selects one at configuration time.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use strum::{AsRefStr, Display};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// LoginVariant
// ---------------------------------------------------------------------------

/// Which login endpoint of the identity provider to call.
///
/// # Examples
///
/// ```
/// use backoffice_models::LoginVariant;
///
/// let variant: LoginVariant = "username".parse().unwrap();
/// assert_eq!(variant.path(), "/auth/login");
/// assert_eq!(variant.identifier_field(), "username");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LoginVariant {
    /// `POST /Auth/login` with `{"email", "password"}`.
    #[default]
    Email,
    /// `POST /auth/login` with `{"username", "password"}`.
    Username,
}

impl LoginVariant {
    /// Path of the login endpoint, relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Email => "/Auth/login",
            Self::Username => "/auth/login",
        }
    }

    /// Name of the JSON field carrying the identifier.
    pub fn identifier_field(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
        }
    }
}

impl FromStr for LoginVariant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "username" => Ok(Self::Username),
            _ => Err(ModelError::UnknownVariant {
                kind: "login variant".into(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// An identifier / secret pair submitted on a single login attempt.
///
/// Never persisted. The secret is omitted from the `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address or username.
    pub identifier: String,
    /// Password.
    pub secret: String,
}

impl Credentials {
    /// Create a new credential pair.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Reject blank identifiers and empty secrets.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.identifier.trim().is_empty() {
            return Err(ModelError::MissingField {
                field: "identifier".into(),
            });
        }
        if self.secret.is_empty() {
            return Err(ModelError::MissingField {
                field: "password".into(),
            });
        }
        Ok(())
    }

    /// JSON body expected by the login endpoint of `variant`.
    pub fn login_body(&self, variant: LoginVariant) -> Value {
        let mut body = json!({ "password": self.secret });
        body[variant.identifier_field()] = Value::String(self.identifier.trim().to_string());
        body
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}
