//! OAuth 2.0 for installed applications.
//!
//! Handles:
//! - Reusing a cached token when it is still valid
//! - Refresh token grants when it has expired
//! - The interactive loopback flow (PKCE S256) when there is nothing to
//!   refresh, after which the new token is persisted
//!
//! The loopback redirect is served by a single-route axum router on an
//! ephemeral port. Requests without a `state` parameter (favicon probes,
//! preconnects) are answered and ignored; the first request carrying `state`
//! ends the flow.
//!
//! There is no locking around the token file; two concurrent runs may both
//! re-authorize and the last writer wins.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use base64::Engine;
use chrono::{Duration, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use url::Url;

use crate::credentials::{AuthorizedUser, ClientSecrets};
use crate::load_config::CredentialsSection;

/// Read-only access to file metadata and content.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Token endpoint response for both grant types.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token endpoint error body.
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Return usable credentials, refreshing or re-authorizing as needed.
///
/// The token file is only written when the credentials changed.
pub async fn get_or_generate_credentials(
    http: &reqwest::Client,
    section: &CredentialsSection,
) -> Result<AuthorizedUser> {
    let cached = AuthorizedUser::load(&section.token_file)?;

    if let Some(user) = &cached {
        if user.is_valid() {
            tracing::info!(token_file = ?section.token_file, "Using cached credentials");
            return Ok(user.clone());
        }
    }

    let user = match cached {
        Some(user) if user.refresh_token.is_some() => {
            tracing::info!(token_file = ?section.token_file, "Cached credentials expired, refreshing");
            refresh(http, &user).await?
        }
        _ => {
            tracing::info!(client_secrets = ?section.client_secrets, "No usable credentials, starting authorization flow");
            let secrets = ClientSecrets::load(&section.client_secrets)?;
            run_installed_app_flow(http, &secrets, &[DRIVE_READONLY_SCOPE]).await?
        }
    };

    user.save(&section.token_file)?;
    tracing::info!(token_file = ?section.token_file, "Saved credentials for the next run");
    Ok(user)
}

/// Exchange the refresh token for a new access token.
pub async fn refresh(http: &reqwest::Client, user: &AuthorizedUser) -> Result<AuthorizedUser> {
    let refresh_token = user
        .refresh_token
        .as_deref()
        .context("Credentials have no refresh token")?;

    let response = post_token(
        http,
        &user.token_uri,
        &[
            ("client_id", user.client_id.as_str()),
            ("client_secret", user.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await?;

    Ok(AuthorizedUser {
        token: response.access_token,
        // Refresh responses usually omit the refresh token; keep ours.
        refresh_token: response
            .refresh_token
            .or_else(|| user.refresh_token.clone()),
        token_uri: user.token_uri.clone(),
        client_id: user.client_id.clone(),
        client_secret: user.client_secret.clone(),
        scopes: response
            .scope
            .map(|s| split_scopes(&s))
            .unwrap_or_else(|| user.scopes.clone()),
        expiry: response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

/// Run the loopback authorization flow: print the consent URL, wait for the
/// browser redirect on an ephemeral local port, then exchange the code.
pub async fn run_installed_app_flow(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    scopes: &[&str],
) -> Result<AuthorizedUser> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .context("Failed to bind loopback listener for the OAuth redirect")?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://127.0.0.1:{port}/");

    let verifier = format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    );
    let state = uuid::Uuid::new_v4().simple().to_string();
    let url = authorization_url(secrets, scopes, &redirect_uri, &state, &pkce_challenge(&verifier))?;

    println!("Please visit this URL to authorize this application: {url}");
    tracing::info!(port, "Waiting for the OAuth redirect");

    let code = wait_for_redirect(listener, &state).await?;
    let response = post_token(
        http,
        &secrets.token_uri,
        &[
            ("code", code.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("code_verifier", verifier.as_str()),
        ],
    )
    .await?;

    Ok(AuthorizedUser {
        token: response.access_token,
        refresh_token: response.refresh_token,
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
        scopes: response
            .scope
            .map(|s| split_scopes(&s))
            .unwrap_or_else(|| scopes.iter().map(|s| s.to_string()).collect()),
        expiry: response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

/// BASE64URL(SHA256(verifier)) without padding.
pub fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

/// Consent page URL for the given client and redirect target.
pub fn authorization_url(
    secrets: &ClientSecrets,
    scopes: &[&str],
    redirect_uri: &str,
    state: &str,
    code_challenge: &str,
) -> Result<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .with_context(|| format!("Invalid auth_uri {:?}", secrets.auth_uri))
}

/// Query parameters the authorization server appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

type RedirectSlot = Arc<Mutex<Option<oneshot::Sender<RedirectParams>>>>;

/// Serve the redirect URI on `listener` until a request carrying `state`
/// arrives, then shut the server down gracefully and return the checked
/// authorization code.
pub async fn wait_for_redirect(listener: TcpListener, expected_state: &str) -> Result<String> {
    let (params_tx, params_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let slot: RedirectSlot = Arc::new(Mutex::new(Some(params_tx)));
    let app = Router::new()
        .route("/", get(redirect_handler))
        .with_state(slot);

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            })
            .await
    });

    let params = params_rx
        .await
        .context("OAuth redirect listener stopped before the redirect arrived")?;
    shutdown_tx.send(()).ok();
    server
        .await
        .context("OAuth redirect listener task failed")?
        .context("OAuth redirect listener failed")?;

    check_redirect(params, expected_state)
}

async fn redirect_handler(
    State(slot): State<RedirectSlot>,
    Query(params): Query<RedirectParams>,
) -> (StatusCode, &'static str) {
    if params.state.is_none() {
        tracing::debug!("Ignoring request without OAuth state");
        return (
            StatusCode::BAD_REQUEST,
            "Waiting for the authorization redirect.",
        );
    }

    let failed = params.error.is_some();
    let Some(sender) = slot.lock().await.take() else {
        return (
            StatusCode::CONFLICT,
            "The authentication flow has already completed.",
        );
    };
    sender.send(params).ok();

    if failed {
        (
            StatusCode::OK,
            "The authentication flow failed. Check the terminal for details.",
        )
    } else {
        (
            StatusCode::OK,
            "The authentication flow has completed. You may close this window.",
        )
    }
}

/// Extract the authorization code from the redirect parameters, checking
/// `state`.
pub fn check_redirect(params: RedirectParams, expected_state: &str) -> Result<String> {
    if let Some(error) = params.error {
        bail!("Authorization was denied: {error}");
    }
    if params.state.as_deref() != Some(expected_state) {
        bail!("OAuth redirect state mismatch");
    }
    params
        .code
        .context("OAuth redirect carried no authorization code")
}

fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

async fn post_token(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http
        .post(token_uri)
        .form(form)
        .send()
        .await
        .with_context(|| format!("Failed to reach token endpoint {token_uri}"))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        let detail = serde_json::from_str::<TokenErrorBody>(&text)
            .map(|e| match e.error_description {
                Some(desc) => format!("{}: {}", e.error, desc),
                None => e.error,
            })
            .unwrap_or(text);
        tracing::error!(%status, token_uri, "Token endpoint returned an error");
        bail!("Token endpoint returned {status}: {detail}");
    }

    serde_json::from_str(&text).context("Failed to parse token endpoint response")
}
