//! Identity exchange with the external identity provider.
//!
//! Sends the submitted credentials to the configured login endpoint,
//! receives the token pair and decodes the access token's claims into an
//! [`IdentityResult`]. Callers only learn whether the exchange succeeded;
//! failure causes are logged here and go no further.

use backoffice_models::{Credentials, IdentityResult, IdentityToken, LoginVariant};
use chrono::Utc;
use tracing::{info, warn};

use crate::claims;
use crate::config::AppConfig;
use crate::error::AuthError;

/// Client for the identity provider's credential login.
#[derive(Debug, Clone)]
pub struct IdentityExchange {
    http: reqwest::Client,
    api_base: Option<String>,
    variant: LoginVariant,
}

impl IdentityExchange {
    /// Create an exchange against `api_base` (`None` fails every login).
    pub fn new(http: reqwest::Client, api_base: Option<String>, variant: LoginVariant) -> Self {
        Self {
            http,
            api_base,
            variant,
        }
    }

    /// Create an exchange from the gateway configuration.
    pub fn from_config(http: reqwest::Client, config: &AppConfig) -> Self {
        Self::new(http, config.api_base_url.clone(), config.login_variant)
    }

    /// Login endpoint URL, if an API base is configured.
    pub fn login_url(&self) -> Option<String> {
        self.api_base
            .as_deref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), self.variant.path()))
    }

    /// Exchange credentials for an identity, or `None` on any failure.
    pub async fn authorize(&self, credentials: &Credentials) -> Option<IdentityResult> {
        match self.exchange(credentials).await {
            Ok(identity) => {
                info!(
                    variant = %self.variant,
                    sub = %identity.id,
                    roles = identity.roles.len(),
                    "identity exchange succeeded"
                );
                Some(identity)
            }
            Err(e) => {
                warn!(variant = %self.variant, error = %e, "identity exchange failed");
                None
            }
        }
    }

    /// Exchange credentials for an identity, reporting why it failed.
    pub async fn exchange(&self, credentials: &Credentials) -> Result<IdentityResult, AuthError> {
        // 1. Reject blank input before touching the network
        credentials.validate()?;

        let url = self
            .login_url()
            .ok_or(AuthError::NotConfigured("API_BASE_URL"))?;

        // 2. Forward the credentials
        let res = self
            .http
            .post(&url)
            .json(&credentials.login_body(self.variant))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AuthError::ExchangeFailed(format!(
                "provider returned {status}: {text}"
            )));
        }

        let received_at = Utc::now().timestamp();
        let token: IdentityToken = res.json().await?;

        // 3. Read the claims carried by the access token
        let claims = claims::decode_unverified(&token.access_token)?;
        let expires_at = token.expires_at(received_at);

        Ok(IdentityResult::from_claims(
            claims,
            credentials.identifier.trim(),
            token.access_token,
            expires_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(api_base: Option<&str>) -> IdentityExchange {
        IdentityExchange::new(
            reqwest::Client::new(),
            api_base.map(String::from),
            LoginVariant::Email,
        )
    }

    #[test]
    fn login_url_follows_variant() {
        let email = exchange(Some("http://api.local/"));
        assert_eq!(email.login_url().as_deref(), Some("http://api.local/Auth/login"));

        let username = IdentityExchange::new(
            reqwest::Client::new(),
            Some("http://api.local".into()),
            LoginVariant::Username,
        );
        assert_eq!(username.login_url().as_deref(), Some("http://api.local/auth/login"));
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_network() {
        // Port 9 (discard) is never contacted because validation fails first.
        let err = exchange(Some("http://127.0.0.1:9"))
            .exchange(&Credentials::new("", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn missing_api_base_fails_closed() {
        let exchange = exchange(None);
        let creds = Credentials::new("a@b.com", "secret");

        assert!(matches!(
            exchange.exchange(&creds).await,
            Err(AuthError::NotConfigured("API_BASE_URL"))
        ));
        assert!(exchange.authorize(&creds).await.is_none());
    }
}
