//! Login relay: a five-route HTTP front for an OpenID Connect provider.
//!
//! The relay delegates authentication entirely to the provider; it only
//! redirects the browser out, exchanges the returned authorization code for a
//! token, and keeps that token in an in-memory session.

pub mod config;
pub mod oidc;
pub mod routes;
pub mod session;

pub use config::RelayConfig;
pub use oidc::{OidcClient, ProviderMetadata};
pub use routes::{AppState, create_router, serve};
pub use session::{SESSION_COOKIE, SessionStore};

/// Relay error. There is deliberately no taxonomy here: provider and library
/// failures surface as the serving layer's default error response.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("No session for request")]
    MissingSession,
    #[error("State parameter mismatch")]
    StateMismatch,
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
