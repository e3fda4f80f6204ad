use mockito::Matcher;
use scenesmith::relay::{
    AppState, OidcClient, ProviderMetadata, RelayConfig, SESSION_COOKIE, SessionStore,
    create_router,
};
use serde_json::json;
use std::sync::Arc;
use url::Url;

fn relay_config(base_url: &str) -> RelayConfig {
    RelayConfig {
        domain: "tenant.example.auth0.com".to_string(),
        client_id: "client123".to_string(),
        client_secret: "s3cret".to_string(),
        secret_key: "cookie-secret".to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
    }
}

fn test_metadata(server_url: &str) -> ProviderMetadata {
    ProviderMetadata {
        authorization_endpoint: format!("{server_url}/authorize"),
        token_endpoint: format!("{server_url}/oauth/token"),
    }
}

/// Spin up the relay on an ephemeral port; returns its base URL and a handle
/// to the session store
async fn start_relay(oidc: OidcClient) -> (String, Arc<SessionStore>) {
    let sessions = Arc::new(SessionStore::new("cookie-secret"));
    let state = AppState {
        oidc: Arc::new(oidc),
        sessions: Arc::clone(&sessions),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Relay server failed");
    });

    (format!("http://{addr}"), sessions)
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Extract the session cookie value from a Set-Cookie header
fn session_cookie(response: &reqwest::Response) -> String {
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Expected a Set-Cookie header")
        .to_str()
        .expect("Set-Cookie should be valid UTF-8");
    let pair = set_cookie
        .split(';')
        .next()
        .expect("Set-Cookie should have a value");
    let (name, value) = pair.split_once('=').expect("Cookie pair should have '='");
    assert_eq!(name, SESSION_COOKIE);
    value.to_string()
}

#[test]
fn test_authorize_url_carries_oauth_parameters() {
    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata("https://tenant.example.auth0.com"),
    );

    let url = oidc
        .authorize_url("state-abc")
        .expect("Failed to build authorize URL");
    let parsed = Url::parse(&url).expect("Authorize URL should parse");
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
    assert!(pairs.contains(&("client_id".to_string(), "client123".to_string())));
    assert!(pairs.contains(&(
        "redirect_uri".to_string(),
        "http://localhost:3000/callback".to_string()
    )));
    assert!(pairs.contains(&("scope".to_string(), "openid profile email".to_string())));
    assert!(pairs.contains(&("state".to_string(), "state-abc".to_string())));
}

#[test]
fn test_logout_url_has_encoded_return_to_and_client_id() {
    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata("https://tenant.example.auth0.com"),
    );

    let url = oidc.logout_url().expect("Failed to build logout URL");
    assert!(url.starts_with("https://tenant.example.auth0.com/v2/logout?"));
    // Both parameters present, URL-encoded
    assert!(url.contains("returnTo=http%3A%2F%2Flocalhost%3A3000%2F"));
    assert!(url.contains("client_id=client123"));

    let parsed = Url::parse(&url).expect("Logout URL should parse");
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert!(pairs.contains(&(
        "returnTo".to_string(),
        "http://localhost:3000/".to_string()
    )));
    assert!(pairs.contains(&("client_id".to_string(), "client123".to_string())));
}

#[tokio::test]
async fn test_discovery_reads_provider_metadata() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/.well-known/openid-configuration")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "authorization_endpoint": format!("{}/authorize", server.url()),
                "token_endpoint": format!("{}/oauth/token", server.url()),
                "issuer": server.url()
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = relay_config("http://localhost:3000");
    let discovery_url = format!("{}/.well-known/openid-configuration", server.url());
    let oidc = OidcClient::discover_from(config, &discovery_url)
        .await
        .expect("Discovery should succeed");

    assert_eq!(
        oidc.metadata().authorization_endpoint,
        format!("{}/authorize", server.url())
    );
    assert_eq!(
        oidc.metadata().token_endpoint,
        format!("{}/oauth/token", server.url())
    );
}

#[tokio::test]
async fn test_exchange_code_posts_expected_form_fields() {
    let mut server = mockito::Server::new_async().await;
    let token_payload = json!({
        "access_token": "at-123",
        "id_token": "idt-456",
        "token_type": "Bearer",
        "expires_in": 86400
    });

    let mock = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".to_string(), "authorization_code".to_string()),
            Matcher::UrlEncoded("client_id".to_string(), "client123".to_string()),
            Matcher::UrlEncoded("client_secret".to_string(), "s3cret".to_string()),
            Matcher::UrlEncoded("code".to_string(), "auth-code".to_string()),
            Matcher::UrlEncoded(
                "redirect_uri".to_string(),
                "http://localhost:3000/callback".to_string(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_payload.to_string())
        .create_async()
        .await;

    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata(&server.url()),
    );

    let payload = oidc
        .exchange_code("auth-code")
        .await
        .expect("Token exchange should succeed");
    assert_eq!(payload, token_payload);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_exchange_code_failure_propagates() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/oauth/token")
        .with_status(403)
        .with_body("invalid_grant")
        .create_async()
        .await;

    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata(&server.url()),
    );

    let err = oidc
        .exchange_code("bad-code")
        .await
        .expect_err("Failed exchange should propagate");
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_home_and_chat_render_without_session() {
    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata("https://tenant.example.auth0.com"),
    );
    let (base, _sessions) = start_relay(oidc).await;
    let client = no_redirect_client();

    let home = client.get(format!("{base}/")).send().await.expect("home");
    assert!(home.status().is_success());
    assert!(home.text().await.expect("body").contains("/login"));

    // Reachability is the only gate on the protected page
    let chat = client.get(format!("{base}/chat")).send().await.expect("chat");
    assert!(chat.status().is_success());
}

#[tokio::test]
async fn test_login_callback_flow_stores_full_token_payload() {
    let mut server = mockito::Server::new_async().await;
    let token_payload = json!({
        "access_token": "at-123",
        "id_token": "idt-456",
        "token_type": "Bearer"
    });
    let _mock = server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_payload.to_string())
        .create_async()
        .await;

    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata(&server.url()),
    );
    let (base, sessions) = start_relay(oidc).await;
    let client = no_redirect_client();

    // /login issues a session cookie and redirects to the provider
    let login = client
        .get(format!("{base}/login"))
        .send()
        .await
        .expect("login");
    assert!(login.status().is_redirection());
    let cookie = session_cookie(&login);
    let location = login
        .headers()
        .get("location")
        .expect("login should redirect")
        .to_str()
        .expect("location should be UTF-8")
        .to_string();
    let state = Url::parse(&location)
        .expect("authorize URL should parse")
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .expect("authorize URL should carry state");

    // /callback exchanges the code and stores the payload in the session
    let callback = client
        .get(format!("{base}/callback?code=auth-code&state={state}"))
        .header("cookie", format!("{SESSION_COOKIE}={cookie}"))
        .send()
        .await
        .expect("callback");
    assert!(callback.status().is_redirection());
    assert_eq!(
        callback
            .headers()
            .get("location")
            .expect("callback should redirect")
            .to_str()
            .expect("location should be UTF-8"),
        "/chat"
    );

    let session_id = sessions
        .verify_cookie(&cookie)
        .expect("Session cookie should still verify");
    assert_eq!(
        sessions.user(session_id),
        Some(token_payload),
        "Full token payload should be stored in the session"
    );
}

#[tokio::test]
async fn test_repeated_logins_reuse_the_session() {
    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata("https://tenant.example.auth0.com"),
    );
    let (base, sessions) = start_relay(oidc).await;
    let client = no_redirect_client();

    let first = client
        .get(format!("{base}/login"))
        .send()
        .await
        .expect("first login");
    let first_cookie = session_cookie(&first);
    assert_eq!(sessions.len(), 1);

    let second = client
        .get(format!("{base}/login"))
        .header("cookie", format!("{SESSION_COOKIE}={first_cookie}"))
        .send()
        .await
        .expect("second login");
    let second_cookie = session_cookie(&second);

    assert_eq!(
        second_cookie, first_cookie,
        "A live session must be reused on repeated logins"
    );
    assert_eq!(sessions.len(), 1, "Repeated logins must not leak sessions");
}

#[tokio::test]
async fn test_callback_with_wrong_state_fails() {
    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata("https://tenant.example.auth0.com"),
    );
    let (base, _sessions) = start_relay(oidc).await;
    let client = no_redirect_client();

    let login = client
        .get(format!("{base}/login"))
        .send()
        .await
        .expect("login");
    let cookie = session_cookie(&login);

    let callback = client
        .get(format!("{base}/callback?code=auth-code&state=wrong"))
        .header("cookie", format!("{SESSION_COOKIE}={cookie}"))
        .send()
        .await
        .expect("callback");
    assert!(callback.status().is_server_error());
}

#[tokio::test]
async fn test_logout_clears_session_and_redirects_to_provider() {
    let oidc = OidcClient::with_metadata(
        relay_config("http://localhost:3000"),
        test_metadata("https://tenant.example.auth0.com"),
    );
    let (base, sessions) = start_relay(oidc).await;
    let client = no_redirect_client();

    let login = client
        .get(format!("{base}/login"))
        .send()
        .await
        .expect("login");
    let cookie = session_cookie(&login);
    assert_eq!(sessions.len(), 1);

    let logout = client
        .get(format!("{base}/logout"))
        .header("cookie", format!("{SESSION_COOKIE}={cookie}"))
        .send()
        .await
        .expect("logout");
    assert!(logout.status().is_redirection());

    let location = logout
        .headers()
        .get("location")
        .expect("logout should redirect")
        .to_str()
        .expect("location should be UTF-8");
    assert!(location.starts_with("https://tenant.example.auth0.com/v2/logout?"));
    assert!(location.contains("returnTo=http%3A%2F%2Flocalhost%3A3000%2F"));
    assert!(location.contains("client_id=client123"));

    assert!(sessions.is_empty(), "Logout should clear the session");
}
