//! Unverified access token decoding.
//!
//! Reads the payload segment of a compact JWT
//! (`base64url(header).base64url(payload).base64url(signature)`) into
//! [`DecodedClaims`]. The signature is not checked: the token was received
//! directly from the identity provider over the configured transport.

use backoffice_models::DecodedClaims;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::error::AuthError;

/// Decode the claims of `token` without verifying its signature.
pub fn decode_unverified(token: &str) -> Result<DecodedClaims, AuthError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::Decode("expected three token segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::Decode(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Decode(format!("payload is not a claims object: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn signed(claims: &serde_json::Value) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"unrelated-secret"),
        )
        .unwrap()
    }

    #[test]
    fn decodes_signed_token_payload() {
        let token = signed(&json!({
            "sub": "u-42",
            "name": "Ada",
            "email": "ada@example.com",
            "realm_access": { "roles": ["admin"] },
            "exp": 4_000_000_000_i64
        }));

        let claims = decode_unverified(&token).unwrap();
        assert_eq!(claims.sub, "u-42");
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert_eq!(claims.roles, vec!["admin"]);
        assert_eq!(claims.exp, Some(4_000_000_000));
    }

    #[test]
    fn tolerates_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(br#"{"sub":"p"}"#);
        assert!(payload.ends_with('='), "fixture must be padded: {payload}");
        let claims = decode_unverified(&format!("h.{payload}.s")).unwrap();
        assert_eq!(claims.sub, "p");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(matches!(decode_unverified("a.b"), Err(AuthError::Decode(_))));
        assert!(matches!(decode_unverified("a.b.c.d"), Err(AuthError::Decode(_))));
        assert!(matches!(decode_unverified(""), Err(AuthError::Decode(_))));
    }

    #[test]
    fn rejects_non_base64_payload() {
        assert!(matches!(
            decode_unverified("h.!!!.s"),
            Err(AuthError::Decode(_))
        ));
    }

    #[test]
    fn rejects_payload_without_subject() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"email":"x@y.z"}"#);
        assert!(matches!(
            decode_unverified(&format!("h.{payload}.s")),
            Err(AuthError::Decode(_))
        ));
    }
}
