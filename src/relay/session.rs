//! In-memory, per-browser sessions. A session holds the provider's token
//! payload and lives until explicit clear or process restart - there is no
//! persistence by design.
//!
//! The cookie carries `<id>.<sig>` where `sig = sha256(secret || "." || id)`.
//! A bad signature or an unknown id is treated as "no session".

use parking_lot::Mutex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "scenesmith_session";

#[derive(Debug, Default, Clone)]
struct Session {
    /// Full token payload from the provider, keyed as the active user
    user: Option<Value>,
    /// OAuth `state` issued at /login, awaiting the /callback round-trip
    pending_state: Option<String>,
}

/// Transient session store shared across request handlers
pub struct SessionStore {
    secret: String,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a fresh session and return its id
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.lock().insert(id, Session::default());
        id
    }

    /// Signed cookie value for a session id
    pub fn cookie_value(&self, id: Uuid) -> String {
        format!("{id}.{}", self.sign(id))
    }

    /// Full `Set-Cookie` header value for a session id
    pub fn set_cookie_header(&self, id: Uuid) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_value(id)
        )
    }

    /// Verify a cookie value and return the session id if the signature is
    /// valid and the session exists
    pub fn verify_cookie(&self, cookie_value: &str) -> Option<Uuid> {
        let (id_part, sig_part) = cookie_value.split_once('.')?;
        let id: Uuid = id_part.parse().ok()?;
        if self.sign(id) != sig_part {
            return None;
        }
        self.sessions.lock().contains_key(&id).then_some(id)
    }

    /// Record the OAuth state issued at /login
    pub fn set_pending_state(&self, id: Uuid, state: &str) {
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.pending_state = Some(state.to_string());
        }
    }

    /// Take (and clear) the pending OAuth state
    pub fn take_pending_state(&self, id: Uuid) -> Option<String> {
        self.sessions
            .lock()
            .get_mut(&id)
            .and_then(|s| s.pending_state.take())
    }

    /// Store the provider's full token payload as the active user session
    pub fn set_user(&self, id: Uuid, token: Value) {
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.user = Some(token);
        }
    }

    /// Token payload for a session, if authenticated
    pub fn user(&self, id: Uuid) -> Option<Value> {
        self.sessions.lock().get(&id).and_then(|s| s.user.clone())
    }

    /// Drop a session entirely
    pub fn clear(&self, id: Uuid) {
        self.sessions.lock().remove(&id);
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    fn sign(&self, id: Uuid) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b".");
        hasher.update(id.as_bytes());
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}
