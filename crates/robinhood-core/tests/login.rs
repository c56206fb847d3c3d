//! Login and logout against a mock API server.

mod common;

use robinhood_core::{CredentialStore, DeviceToken, Error, GetMode, LoginOptions, LoginSource};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, store_tokens, token_body, ScriptedPrompter};

fn credentials() -> LoginOptions {
    LoginOptions::with_credentials("alice@example.com", "secret123")
}

// ============================================================================
// Stored tokens
// ============================================================================

#[tokio::test]
async fn test_valid_stored_token_skips_password_grant() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    store_tokens(dir.path(), "cached-access");

    Mock::given(method("GET"))
        .and(path("/positions/"))
        .and(header("authorization", "Bearer cached-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "next": null})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let prompter = ScriptedPrompter::new(&[]);
    let response = client
        .login_with_prompter(&LoginOptions::default(), &prompter)
        .await
        .unwrap();

    assert_eq!(response.source, LoginSource::CachedToken);
    assert!(response.detail.starts_with("logged in using authentication in"));
    assert_eq!(response.access_token, "cached-access");
    assert!(client.is_logged_in().await);
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn test_expired_stored_token_falls_back_to_password_grant() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let stored = store_tokens(dir.path(), "expired-access");

    Mock::given(method("GET"))
        .and(path("/positions/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})))
        .expect(1)
        .mount(&server)
        .await;

    // The device token of the first login is reused
    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .and(body_string_contains(format!("device_token={}", stored.device_token)))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-access")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let prompter = ScriptedPrompter::new(&[]);
    let response = client.login_with_prompter(&credentials(), &prompter).await.unwrap();

    assert_eq!(response.source, LoginSource::PasswordGrant);
    assert_eq!(response.detail, "logged in with brand new authentication code.");
    assert_eq!(
        client.transport().session_header("authorization").await.as_deref(),
        Some("Bearer fresh-access")
    );

    let saved = CredentialStore::new(dir.path()).load("").unwrap().unwrap();
    assert_eq!(saved.access_token, "fresh-access");
    assert_eq!(saved.refresh_token.as_deref(), Some("fresh-refresh"));
    assert_eq!(saved.device_token, stored.device_token);
}

#[tokio::test]
async fn test_opting_out_of_storage_deletes_token_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    store_tokens(dir.path(), "cached-access");

    Mock::given(method("GET"))
        .and(path("/positions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-access")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let options = LoginOptions {
        store_session: false,
        ..credentials()
    };
    let response = client
        .login_with_prompter(&options, &ScriptedPrompter::new(&[]))
        .await
        .unwrap();

    assert_eq!(response.source, LoginSource::PasswordGrant);
    assert!(!CredentialStore::new(dir.path()).exists(""));
}

// ============================================================================
// Password grant
// ============================================================================

#[tokio::test]
async fn test_fresh_login_persists_new_device_token() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .and(body_string_contains("username=alice%40example.com"))
        .and(body_string_contains("challenge_type=sms"))
        .and(body_string_contains("scope=internal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-access")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let response = client
        .login_with_prompter(&credentials(), &ScriptedPrompter::new(&[]))
        .await
        .unwrap();

    assert_eq!(response.access_token, "fresh-access");
    assert!(client.is_logged_in().await);

    let saved = CredentialStore::new(dir.path()).load("").unwrap().unwrap();
    assert!(DeviceToken::is_well_formed(saved.device_token.as_str()));
}

#[tokio::test]
async fn test_missing_credentials_are_prompted_for() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .and(body_string_contains("username=bob"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-access")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let prompter = ScriptedPrompter::new(&["bob", "hunter2"]);
    client
        .login_with_prompter(&LoginOptions::default(), &prompter)
        .await
        .unwrap();

    assert_eq!(
        prompter.asked(),
        vec!["Robinhood username: ", "Robinhood password: "]
    );
}

#[tokio::test]
async fn test_bad_credentials_surface_server_detail() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Unable to log in with provided credentials."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let result = client
        .login_with_prompter(&credentials(), &ScriptedPrompter::new(&[]))
        .await;

    match result {
        Err(Error::Authentication(detail)) => {
            assert_eq!(detail, "Unable to log in with provided credentials.")
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
    assert!(!client.is_logged_in().await);
    assert!(!CredentialStore::new(dir.path()).exists(""));
}

#[tokio::test]
async fn test_unreachable_server_is_connectivity_error() {
    let dir = tempfile::tempdir().unwrap();

    // Bind then drop a listener so nothing is accepting on the port
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = robinhood_core::ClientConfig::default()
        .with_base_url(format!("http://127.0.0.1:{}", port))
        .with_token_dir(dir.path());
    let client = robinhood_core::RobinhoodClient::new(config).unwrap();

    let result = client
        .login_with_prompter(&credentials(), &ScriptedPrompter::new(&[]))
        .await;

    assert!(matches!(result, Err(Error::Connectivity(_))), "{result:?}");
}

// ============================================================================
// MFA and challenges
// ============================================================================

#[tokio::test]
async fn test_mfa_prompts_until_code_accepted() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .and(body_string_contains("mfa_code=good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("mfa-access")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .and(body_string_contains("mfa_code=bad"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Please enter a valid code."
        })))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mfa_required": true,
            "mfa_type": "app"
        })))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let prompter = ScriptedPrompter::new(&["bad", "bad", "bad", "good"]);
    let response = client.login_with_prompter(&credentials(), &prompter).await.unwrap();

    assert_eq!(response.access_token, "mfa-access");
    assert!(client.is_logged_in().await);

    let asked = prompter.asked();
    assert_eq!(asked.len(), 4);
    assert_eq!(asked[0], "Please type in the MFA code: ");
    assert!(asked[1].starts_with("That MFA code was not correct"));
}

#[tokio::test]
async fn test_challenge_is_answered_then_grant_retried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .and(header_exists("x-robinhood-challenge-response-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("challenge-access")))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "challenge": {"id": "ch-1", "remaining_attempts": 3, "type": "sms", "status": "issued"}
        })))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/challenge/ch-1/respond/"))
        .and(body_string_contains("response=111111"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "challenge": {"id": "ch-1", "remaining_attempts": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/challenge/ch-1/respond/"))
        .and(body_string_contains("response=222222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ch-1",
            "status": "validated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let prompter = ScriptedPrompter::new(&["111111", "222222"]);
    let response = client.login_with_prompter(&credentials(), &prompter).await.unwrap();

    assert_eq!(response.access_token, "challenge-access");
    assert_eq!(
        client
            .transport()
            .session_header("x-robinhood-challenge-response-id")
            .await
            .as_deref(),
        Some("ch-1")
    );
    assert!(prompter.asked()[1].contains("2 tries remaining"));
}

#[tokio::test]
async fn test_exhausted_challenge_fails_login() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "challenge": {"id": "ch-2", "remaining_attempts": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/challenge/ch-2/respond/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "challenge": {"id": "ch-2", "remaining_attempts": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    let result = client
        .login_with_prompter(&credentials(), &ScriptedPrompter::new(&["000000"]))
        .await;

    assert!(matches!(result, Err(Error::Authentication(_))), "{result:?}");
    assert!(!client.is_logged_in().await);
}

// ============================================================================
// Logout and login-required operations
// ============================================================================

#[tokio::test]
async fn test_logout_requires_login() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server, dir.path());

    assert!(matches!(client.logout().await, Err(Error::LoginRequired("logout"))));
    assert!(matches!(
        client.get_open_stock_positions(None).await,
        Err(Error::LoginRequired("get_open_stock_positions"))
    ));
}

#[tokio::test]
async fn test_logout_clears_and_closes_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-access")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, dir.path());
    client
        .login_with_prompter(&credentials(), &ScriptedPrompter::new(&[]))
        .await
        .unwrap();
    client.logout().await.unwrap();

    assert!(!client.is_logged_in().await);
    assert!(client.transport().is_closed().await);
    assert_eq!(client.transport().session_header("authorization").await, None);

    let url = client.urls().markets();
    assert_eq!(client.transport().get(&url, GetMode::Results, &[]).await, Some(json!([])));
    assert!(matches!(
        client.transport().post(&client.urls().login(), None, false).await,
        Err(Error::SessionClosed)
    ));
}
