//! The five relay routes and the axum plumbing around them.

use super::{OidcClient, RelayError, SessionStore};
use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Scenesmith</title></head>
<body>
  <h1>Scenesmith</h1>
  <p>Generate Manim animations with a little help from a language model.</p>
  <p><a href="/login">Log in</a></p>
</body>
</html>
"#;

const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Scenesmith - Ready</title></head>
<body>
  <h1>You're in</h1>
  <p>Your session is ready. Head back to the CLI to generate scenes.</p>
  <p><a href="/logout">Log out</a></p>
</body>
</html>
"#;

/// Shared state for the relay handlers
#[derive(Clone)]
pub struct AppState {
    pub oidc: Arc<OidcClient>,
    pub sessions: Arc<SessionStore>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // No user-facing translation: everything surfaces as the serving
        // layer's default error response
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Build the relay router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/chat", get(chat))
        .route("/logout", get(logout))
        .with_state(state)
}

/// Bind and serve the relay until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Login relay listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    // Re-entering /login with a live session must not leak a fresh entry
    let session_id = session_from_headers(&headers, &state.sessions)
        .unwrap_or_else(|| state.sessions.create());
    let oauth_state = Uuid::new_v4().to_string();
    state.sessions.set_pending_state(session_id, &oauth_state);

    let authorize_url = state.oidc.authorize_url(&oauth_state)?;
    debug!(url = %authorize_url, "Redirecting to authorization endpoint");

    let cookie = state.sessions.set_cookie_header(session_id);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::to(&authorize_url),
    )
        .into_response())
}

#[derive(Deserialize)]
struct CallbackParams {
    code: String,
    #[serde(default)]
    state: Option<String>,
}

async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<Redirect, RelayError> {
    let session_id = session_from_headers(&headers, &state.sessions)
        .ok_or(RelayError::MissingSession)?;

    let expected_state = state
        .sessions
        .take_pending_state(session_id)
        .ok_or(RelayError::StateMismatch)?;
    if params.state.as_deref() != Some(expected_state.as_str()) {
        return Err(RelayError::StateMismatch);
    }

    let token = state.oidc.exchange_code(&params.code).await?;
    state.sessions.set_user(session_id, token);
    debug!("Token payload stored in session");

    Ok(Redirect::to("/chat"))
}

async fn chat() -> Html<&'static str> {
    // Reachability is the only gate here; no session-presence check is made
    Html(CHAT_PAGE)
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, RelayError> {
    if let Some(session_id) = session_from_headers(&headers, &state.sessions) {
        state.sessions.clear(session_id);
        debug!("Session cleared");
    }

    let logout_url = state.oidc.logout_url()?;
    Ok(Redirect::to(&logout_url))
}

/// Pull the session id out of the request's Cookie header, if it carries a
/// validly signed session cookie
fn session_from_headers(headers: &HeaderMap, sessions: &SessionStore) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == super::SESSION_COOKIE {
            sessions.verify_cookie(value)
        } else {
            None
        }
    })
}
