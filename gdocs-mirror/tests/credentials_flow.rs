//! Credential reuse and refresh against a wiremock token endpoint.

use chrono::{Duration, Utc};
use gdocs_mirror::credentials::AuthorizedUser;
use gdocs_mirror::load_config::CredentialsSection;
use gdocs_mirror::oauth::{get_or_generate_credentials, refresh};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cached_user(token_uri: String, expiry_offset: Duration) -> AuthorizedUser {
    AuthorizedUser {
        token: "old-access".to_string(),
        refresh_token: Some("keep-me".to_string()),
        token_uri,
        client_id: "cid".to_string(),
        client_secret: "cs".to_string(),
        scopes: vec!["https://www.googleapis.com/auth/drive.readonly".to_string()],
        expiry: Some(Utc::now() + expiry_offset),
    }
}

#[tokio::test]
async fn valid_cached_token_is_used_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let section = CredentialsSection {
        client_secrets: dir.path().join("does-not-exist.json"),
        token_file: dir.path().join("token.json"),
    };
    let user = cached_user(format!("{}/token", server.uri()), Duration::hours(1));
    user.save(&section.token_file).unwrap();

    let got = get_or_generate_credentials(&reqwest::Client::new(), &section)
        .await
        .unwrap();
    assert_eq!(got, user);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=keep-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let section = CredentialsSection {
        client_secrets: dir.path().join("does-not-exist.json"),
        token_file: dir.path().join("token.json"),
    };
    cached_user(format!("{}/token", server.uri()), -Duration::minutes(5))
        .save(&section.token_file)
        .unwrap();

    let got = get_or_generate_credentials(&reqwest::Client::new(), &section)
        .await
        .unwrap();

    assert_eq!(got.token, "new-access");
    assert_eq!(got.refresh_token.as_deref(), Some("keep-me"));
    assert!(got.is_valid());
    let on_disk = AuthorizedUser::load(&section.token_file).unwrap().unwrap();
    assert_eq!(on_disk, got);
}

#[tokio::test]
async fn refresh_surfaces_token_endpoint_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let user = cached_user(format!("{}/token", server.uri()), -Duration::minutes(5));
    let err = refresh(&reqwest::Client::new(), &user).await.unwrap_err();

    assert!(err.to_string().contains("invalid_grant"), "got: {err}");
}

#[tokio::test]
async fn missing_token_and_missing_client_secrets_fails_cleanly() {
    let dir = tempdir().unwrap();
    let section = CredentialsSection {
        client_secrets: dir.path().join("credentials.json"),
        token_file: dir.path().join("token.json"),
    };

    let err = get_or_generate_credentials(&reqwest::Client::new(), &section)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("client secrets"), "got: {err}");
    assert!(!section.token_file.exists());
}
