//! OAuth 2.0 for installed applications.
//!
//! Credentials come from two files next to the project:
//! `credentials.json` (the client secret downloaded from the provider
//! console) and `token.json` (the authorized-user cache written after the
//! first consent). A cached token is used as-is until it expires, then
//! refreshed with its refresh token. Only when no usable cache exists does
//! [`authorize`] open the browser for consent.

use crate::{ClientError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

// ─── Client secrets ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read a console-issued `credentials.json` (`installed` or `web` key).
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            ClientError::MissingCredential(format!("{}: {e}", path.display()))
        })?;
        let file: SecretsFile = serde_json::from_str(&data)?;
        file.installed.or(file.web).ok_or_else(|| {
            ClientError::OAuth(format!(
                "{} has neither an 'installed' nor a 'web' client",
                path.display()
            ))
        })
    }

    /// Browser URL asking the user to grant `scope`.
    pub fn consent_url(&self, redirect_uri: &str, scope: &str, state: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )?;
        Ok(url)
    }
}

// ─── Authorized user ──────────────────────────────────────────────────────

/// Contents of `token.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUser {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

// ─── TokenCache ───────────────────────────────────────────────────────────

/// The on-disk `token.json`.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached user, or `None` when the file is absent or unreadable.
    pub fn load(&self) -> Option<AuthorizedUser> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable token cache");
                None
            }
        }
    }

    pub fn save(&self, user: &AuthorizedUser) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    /// Delete the cache (no-op if absent).
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ─── Flow ─────────────────────────────────────────────────────────────────

/// Credentials for `scope`, from the cache when possible.
pub async fn authorize(
    http: &reqwest::Client,
    secrets_path: &Path,
    cache: &TokenCache,
    scope: &str,
) -> Result<AuthorizedUser> {
    if let Some(user) = cache.load() {
        if !user.is_expired(Utc::now()) {
            return Ok(user);
        }
        if user.refresh_token.is_some() {
            tracing::debug!("refreshing expired mail token");
            match refresh(http, &user).await {
                Ok(refreshed) => {
                    cache.save(&refreshed)?;
                    return Ok(refreshed);
                }
                // Revoked or expired grant: start over with consent.
                Err(ClientError::Api { status, body }) if (400..500).contains(&status) => {
                    tracing::warn!(status, body = %body, "mail refresh token rejected, clearing cache");
                    cache.clear()?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    let secret = ClientSecret::from_file(secrets_path)?;
    let user = run_installed_flow(http, &secret, scope).await?;
    cache.save(&user)?;
    tracing::info!(path = %cache.path().display(), "saved mail authorization");
    Ok(user)
}

/// Exchange the refresh token for a new access token.
pub async fn refresh(http: &reqwest::Client, user: &AuthorizedUser) -> Result<AuthorizedUser> {
    let refresh_token = user
        .refresh_token
        .as_deref()
        .ok_or_else(|| ClientError::OAuth("token cache has no refresh token".into()))?;
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
        refresh_token: response
            .refresh_token
            .or_else(|| user.refresh_token.clone()),
        expiry: expiry_from(response.expires_in),
        ..user.clone()
    })
}

/// Trade an authorization code for tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    secret: &ClientSecret,
    code: &str,
    redirect_uri: &str,
    scope: &str,
) -> Result<AuthorizedUser> {
    let response = post_token(
        http,
        &secret.token_uri,
        &[
            ("code", code),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await?;
    Ok(AuthorizedUser {
        token: response.access_token,
        refresh_token: response.refresh_token,
        token_uri: secret.token_uri.clone(),
        client_id: secret.client_id.clone(),
        client_secret: secret.client_secret.clone(),
        scopes: vec![scope.to_string()],
        expiry: expiry_from(response.expires_in),
    })
}

async fn post_token(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http.post(token_uri).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

fn expiry_from(expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in.map(|secs| Utc::now() + Duration::seconds(secs))
}

/// Open the consent page and wait for the provider to redirect back to a
/// one-shot listener on localhost.
async fn run_installed_flow(
    http: &reqwest::Client,
    secret: &ClientSecret,
    scope: &str,
) -> Result<AuthorizedUser> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://localhost:{port}/");
    let state = uuid::Uuid::new_v4().simple().to_string();
    let url = secret.consent_url(&redirect_uri, scope, &state)?;

    tracing::info!(%url, "waiting for mail authorization in the browser");
    if let Err(e) = open::that(url.as_str()) {
        tracing::warn!(error = %e, "could not open a browser; visit the URL manually");
    }

    let (stream, _) = listener.accept().await?;
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let outcome = parse_callback(&request_line, &state);
    let page = match &outcome {
        Ok(_) => "Authorization complete. You can close this window.",
        Err(_) => "Authorization failed. Return to the application for details.",
    };
    let reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{page}",
        page.len()
    );
    let mut stream = reader.into_inner();
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;

    let code = outcome?;
    exchange_code(http, secret, &code, &redirect_uri, scope).await
}

/// Pull the authorization code out of the redirect's request line
/// (`GET /?state=..&code=.. HTTP/1.1`), checking `state`.
pub fn parse_callback(request_line: &str, expected_state: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ClientError::OAuth("malformed redirect request".into()))?;
    let url = Url::parse("http://localhost")?.join(target)?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(ClientError::OAuth(format!("consent denied: {value}"))),
            _ => {}
        }
    }
    if state.as_deref() != Some(expected_state) {
        return Err(ClientError::OAuth("state mismatch in redirect".into()));
    }
    code.ok_or_else(|| ClientError::OAuth("redirect carried no authorization code".into()))
}

// ─── Tests ────────────────────────────────────────────────────────────────
