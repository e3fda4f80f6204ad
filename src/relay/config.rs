use super::RelayError;

/// Environment-sourced settings for the login relay. Mirrors the provider's
/// application settings: tenant domain, client credentials, and a secret used
/// to sign session cookies.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Provider tenant domain, e.g. `dev-xyz.us.auth0.com`
    pub domain: String,
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Secret used to sign session cookies
    pub secret_key: String,
    /// Externally reachable base URL of this relay (no trailing slash)
    pub base_url: String,
}

impl RelayConfig {
    /// Build the relay configuration from the environment. `fallback_base_url`
    /// is used when `APP_BASE_URL` is not set (typically derived from the
    /// listen address).
    pub fn from_env(fallback_base_url: &str) -> Result<Self, RelayError> {
        let base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| fallback_base_url.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            domain: require_env("AUTH0_DOMAIN")?,
            client_id: require_env("AUTH0_CLIENT_ID")?,
            client_secret: require_env("AUTH0_CLIENT_SECRET")?,
            secret_key: require_env("APP_SECRET_KEY")?,
            base_url,
        })
    }

    /// URL of the provider's OpenID Connect discovery document
    pub fn discovery_url(&self) -> String {
        format!("https://{}/.well-known/openid-configuration", self.domain)
    }

    /// Callback URL registered with the provider
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.base_url)
    }

    /// Home URL used as the post-logout return target
    pub fn home_url(&self) -> String {
        format!("{}/", self.base_url)
    }
}

fn require_env(name: &'static str) -> Result<String, RelayError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(RelayError::MissingEnv(name))
}
