//! Thin OpenID Connect glue: discovery, authorize-redirect URL building, and
//! the authorization-code-for-token exchange. Handshake correctness beyond the
//! plain code exchange is the provider's problem, not ours.

use super::{RelayConfig, RelayError};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// The slice of the provider's discovery document the relay needs
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
}

/// Client for the provider's OpenID Connect endpoints
#[derive(Debug, Clone)]
pub struct OidcClient {
    http: reqwest::Client,
    metadata: ProviderMetadata,
    config: RelayConfig,
}

impl OidcClient {
    /// Fetch the provider's discovery document and build a client from it
    pub async fn discover(config: RelayConfig) -> Result<Self, RelayError> {
        let discovery_url = config.discovery_url();
        Self::discover_from(config, &discovery_url).await
    }

    /// Fetch a discovery document from an explicit URL
    pub async fn discover_from(config: RelayConfig, discovery_url: &str) -> Result<Self, RelayError> {
        let http = reqwest::Client::new();
        debug!(url = %discovery_url, "Fetching OpenID Connect discovery document");

        let metadata: ProviderMetadata = http
            .get(discovery_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Self {
            http,
            metadata,
            config,
        })
    }

    /// Build a client from already-known metadata (used by tests)
    pub fn with_metadata(config: RelayConfig, metadata: ProviderMetadata) -> Self {
        Self {
            http: reqwest::Client::new(),
            metadata,
            config,
        }
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// URL of the provider's authorization endpoint with the relay's
    /// parameters attached
    pub fn authorize_url(&self, state: &str) -> Result<String, RelayError> {
        let mut url = Url::parse(&self.metadata.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url())
            .append_pair("scope", "openid profile email")
            .append_pair("state", state);
        Ok(url.into())
    }

    /// Exchange an authorization code for the provider's token payload.
    /// The full JSON payload is returned untouched; the caller stores it in
    /// the session as-is.
    pub async fn exchange_code(&self, code: &str) -> Result<serde_json::Value, RelayError> {
        debug!("Exchanging authorization code for tokens");

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("code", code),
            ("redirect_uri", &self.config.callback_url()),
        ];

        let response = self
            .http
            .post(&self.metadata.token_endpoint)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::TokenExchange(format!("{status}: {body}")));
        }

        Ok(response.json().await?)
    }

    /// Provider logout URL with `returnTo` and `client_id` URL-encoded as
    /// query parameters
    pub fn logout_url(&self) -> Result<String, RelayError> {
        let mut url = Url::parse(&format!("https://{}/v2/logout", self.config.domain))?;
        url.query_pairs_mut()
            .append_pair("returnTo", &self.config.home_url())
            .append_pair("client_id", &self.config.client_id);
        Ok(url.into())
    }
}
