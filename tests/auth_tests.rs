use edu_admin::auth::{AuthStatus, Credentials, OtpRequest, SignupInfo, NO_TOKEN_MESSAGE};
use edu_admin::error::{Error, SESSION_EXPIRED_MESSAGE};
use edu_admin::session::{FileStorage, MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};
use edu_admin::Console;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_reply(verified: bool) -> serde_json::Value {
    json!({
        "token": "tok-123",
        "user": {
            "_id": "u1",
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "admin",
            "contact": "+44 20 7946 0000",
            "isVerified": verified,
            "verificationToken": "654321"
        }
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_reply(true)))
        .expect(1)
        .mount(server)
        .await;
}

fn signup_info() -> SignupInfo {
    SignupInfo {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        contact: "+44 20 7946 0000".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    }
}

#[tokio::test]
async fn test_login_and_logout_round_trip() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let storage = Arc::new(MemoryStorage::new());
    let console = Console::new(&server.uri(), storage.clone()).unwrap();
    let auth = console.auth();

    let profile = auth
        .login(&Credentials::new("ada@example.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(profile.id, "u1");
    assert_eq!(auth.token().as_deref(), Some("tok-123"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));
    let stored_user = storage.get(USER_KEY).unwrap().unwrap();
    assert!(stored_user.contains("\"id\":\"u1\""));
    assert_eq!(auth.status(), AuthStatus::Verified);
    assert!(!auth.loading());

    auth.logout();

    assert_eq!(auth.token(), None);
    assert_eq!(auth.user(), None);
    assert_eq!(auth.status(), AuthStatus::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);

    auth.logout();
    assert_eq!(auth.status(), AuthStatus::Anonymous);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let dir = tempfile::tempdir().unwrap();

    {
        let storage = FileStorage::new(dir.path()).unwrap();
        let console = Console::new(&server.uri(), Arc::new(storage)).unwrap();
        console
            .auth()
            .login(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();
    }

    let storage = FileStorage::new(dir.path()).unwrap();
    let console = Console::new(&server.uri(), Arc::new(storage)).unwrap();

    assert!(console.auth().is_authenticated());
    assert_eq!(console.auth().token().as_deref(), Some("tok-123"));
    assert_eq!(console.auth().user().unwrap().display_name(), "Ada Lovelace");
}

#[tokio::test]
async fn test_failed_login_records_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid credentials" })))
        .mount(&server)
        .await;

    let console = Console::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();
    let auth = console.auth();

    let err = auth
        .login(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(auth.error().as_deref(), Some("Invalid credentials"));
    assert!(!auth.loading());
    assert!(!auth.is_authenticated());

    auth.clear_error();
    assert_eq!(auth.error(), None);
}

#[tokio::test]
async fn test_login_reply_without_user_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-123",
            "user": { "email": "ada@example.com" }
        })))
        .mount(&server)
        .await;

    let console = Console::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();
    let err = console
        .auth()
        .login(&Credentials::new("ada@example.com", "secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(console.auth().token(), None);
}

#[tokio::test]
async fn test_signup_then_verify_otp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .and(body_partial_json(json!({ "firstName": "Ada", "confirmPassword": "secret1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(login_reply(false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/otp"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(body_json(json!({ "token": "654321" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Email verified",
            "user": {
                "isVerified": true,
                "verificationToken": null,
                "lastLogin": "2024-05-01T10:00:00.000Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let console = Console::new(&server.uri(), storage.clone()).unwrap();
    let auth = console.auth();

    auth.signup(&signup_info()).await.unwrap();
    assert_eq!(auth.status(), AuthStatus::Unverified);

    let profile = auth.verify_otp(&OtpRequest::new("654321")).await.unwrap();

    assert!(profile.is_verified);
    assert_eq!(profile.first_name, "Ada");
    assert_eq!(profile.contact.as_deref(), Some("+44 20 7946 0000"));
    assert_eq!(profile.last_login.as_deref(), Some("2024-05-01T10:00:00.000Z"));
    assert_eq!(profile.verification_token, None);
    assert_eq!(auth.status(), AuthStatus::Verified);
    assert_eq!(auth.token().as_deref(), Some("tok-123"));
    assert!(storage.get(USER_KEY).unwrap().unwrap().contains("\"isVerified\":true"));
}

#[tokio::test]
async fn test_invalid_signup_is_not_sent() {
    let server = MockServer::start().await;
    let console = Console::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();

    let info = SignupInfo {
        confirm_password: "different".to_string(),
        ..signup_info()
    };
    let err = console.auth().signup(&info).await.unwrap_err();

    assert_eq!(err.to_string(), "Passwords do not match");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_verify_otp_needs_a_session() {
    let server = MockServer::start().await;
    let console = Console::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();

    let err = console
        .auth()
        .verify_otp(&OtpRequest::new("654321"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), NO_TOKEN_MESSAGE);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_expired_token_during_otp_logs_out() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/otp"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": SESSION_EXPIRED_MESSAGE })))
        .mount(&server)
        .await;

    let console = Console::new(&server.uri(), Arc::new(MemoryStorage::new())).unwrap();
    let auth = console.auth();
    auth.login(&Credentials::new("ada@example.com", "secret1"))
        .await
        .unwrap();

    let err = auth.verify_otp(&OtpRequest::new("000000")).await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(auth.status(), AuthStatus::Anonymous);
    assert_eq!(auth.error().as_deref(), Some(SESSION_EXPIRED_MESSAGE));
}

#[tokio::test]
async fn test_reload_picks_up_external_logout() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(USER_KEY, &json!({ "id": "u1", "email": "ada@example.com", "isVerified": false }).to_string())
        .unwrap();
    storage.set(TOKEN_KEY, "tok").unwrap();

    let console = Console::new("http://localhost:3000", storage.clone()).unwrap();
    assert_eq!(console.auth().status(), AuthStatus::Unverified);

    storage.remove(USER_KEY).unwrap();
    storage.remove(TOKEN_KEY).unwrap();
    console.auth().reload();

    assert_eq!(console.auth().status(), AuthStatus::Anonymous);
}
