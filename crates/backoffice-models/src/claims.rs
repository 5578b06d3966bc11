//! Claims carried in an access token payload.
//!
//! The payload is read without signature verification; the transport to the
//! identity provider is the trust boundary. Decoding from the compact JWT
//! form lives in the gateway crate, this module only describes the shape.

use serde::{Deserialize, Serialize};

/// Claims decoded from an access token.
///
/// # Examples
///
/// ```
/// use backoffice_models::DecodedClaims;
///
/// let claims: DecodedClaims = serde_json::from_str(
///     r#"{"sub": 42, "email": "a@b.com", "realm_access": {"roles": ["admin"]}}"#,
/// ).unwrap();
/// assert_eq!(claims.sub, "42");
/// assert_eq!(claims.roles, vec!["admin".to_string()]);
/// assert_eq!(claims.display_name("a@b.com"), "a@b.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawClaims")]
pub struct DecodedClaims {
    /// Subject identifier, stringified when the provider issues numbers.
    pub sub: String,
    /// Full display name.
    pub name: Option<String>,
    /// Login name chosen by the user.
    pub preferred_username: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Ordered, de-duplicated role set.
    pub roles: Vec<String>,
    /// Issuer.
    pub iss: Option<String>,
    /// Expiry in unix seconds.
    pub exp: Option<i64>,
    /// Issue instant in unix seconds.
    pub iat: Option<i64>,
}

impl DecodedClaims {
    /// Display name, falling back to the preferred username and then to
    /// `fallback` (usually the identifier the user typed).
    pub fn display_name(&self, fallback: &str) -> String {
        self.name
            .as_deref()
            .or(self.preferred_username.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum Subject {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Deserialize)]
struct RawClaims {
    sub: Subject,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    realm_access: Option<RealmAccess>,
    #[serde(default)]
    roles: Option<OneOrMany>,
    // ASP.NET Core identity backends use the schema URI as claim name.
    #[serde(default, alias = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
    role: Option<OneOrMany>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
}

impl From<RawClaims> for DecodedClaims {
    fn from(raw: RawClaims) -> Self {
        let sub = match raw.sub {
            Subject::Text(s) => s,
            Subject::Number(n) => n.to_string(),
        };

        let mut roles: Vec<String> = Vec::new();
        let realm = raw.realm_access.map(|r| r.roles).unwrap_or_default();
        let top_level = raw.roles.into_iter().chain(raw.role).flat_map(|r| match r {
            OneOrMany::One(role) => vec![role],
            OneOrMany::Many(list) => list,
        });
        for role in realm.into_iter().chain(top_level) {
            if !role.is_empty() && !roles.contains(&role) {
                roles.push(role);
            }
        }

        Self {
            sub,
            name: raw.name,
            preferred_username: raw.preferred_username,
            email: raw.email,
            roles,
            iss: raw.iss,
            exp: raw.exp,
            iat: raw.iat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keycloak_realm_roles() {
        let claims: DecodedClaims = serde_json::from_value(json!({
            "sub": "f3a1",
            "name": "Ada Lovelace",
            "preferred_username": "ada",
            "email": "ada@example.com",
            "realm_access": { "roles": ["admin", "offline_access"] },
            "iss": "http://localhost:4000",
            "exp": 1_700_000_300,
            "iat": 1_700_000_000
        }))
        .unwrap();

        assert_eq!(claims.sub, "f3a1");
        assert_eq!(claims.roles, vec!["admin", "offline_access"]);
        assert_eq!(claims.exp, Some(1_700_000_300));
        assert_eq!(claims.display_name("ignored"), "Ada Lovelace");
    }

    #[test]
    fn numeric_subject_is_stringified() {
        let claims: DecodedClaims = serde_json::from_value(json!({ "sub": 17 })).unwrap();
        assert_eq!(claims.sub, "17");
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn roles_are_merged_and_deduplicated() {
        let claims: DecodedClaims = serde_json::from_value(json!({
            "sub": "1",
            "realm_access": { "roles": ["admin"] },
            "roles": ["admin", "sales"],
            "role": "support"
        }))
        .unwrap();
        assert_eq!(claims.roles, vec!["admin", "sales", "support"]);
    }

    #[test]
    fn dotnet_role_claim_is_read() {
        let claims: DecodedClaims = serde_json::from_value(json!({
            "sub": "1",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": ["Manager"]
        }))
        .unwrap();
        assert_eq!(claims.roles, vec!["Manager"]);
    }

    #[test]
    fn display_name_falls_back() {
        let claims: DecodedClaims =
            serde_json::from_value(json!({ "sub": "1", "preferred_username": "bob" })).unwrap();
        assert_eq!(claims.display_name("bob@example.com"), "bob");

        let bare: DecodedClaims = serde_json::from_value(json!({ "sub": "1" })).unwrap();
        assert_eq!(bare.display_name("bob@example.com"), "bob@example.com");
    }

    #[test]
    fn missing_subject_is_an_error() {
        assert!(serde_json::from_value::<DecodedClaims>(json!({ "email": "x@y.z" })).is_err());
    }
}
