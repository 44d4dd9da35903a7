use crate::mime::{self, Attachment, Message};
use crate::oauth::{self, TokenCache, GMAIL_SEND_SCOPE};
use crate::{endpoint, ClientError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Sends one message with one file attached.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str, attachment: &Path) -> Result<()>;
}

/// Gmail API sender authorized through the installed-app OAuth flow.
pub struct GmailMailer {
    client: reqwest::Client,
    api_base: String,
    credentials_file: PathBuf,
    cache: TokenCache,
}

impl GmailMailer {
    pub fn new(
        api_base: impl Into<String>,
        credentials_file: impl Into<PathBuf>,
        token_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            credentials_file: credentials_file.into(),
            cache: TokenCache::new(token_file),
        }
    }
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(&self, to: &str, subject: &str, body: &str, attachment: &Path) -> Result<()> {
        let data = tokio::fs::read(attachment).await?;
        let file_name = attachment
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment.txt");

        let creds =
            oauth::authorize(&self.client, &self.credentials_file, &self.cache, GMAIL_SEND_SCOPE)
                .await?;

        let raw = Message {
            to,
            subject,
            body,
            attachment: Some(Attachment {
                file_name,
                data: &data,
            }),
        }
        .render(&mime::new_boundary());

        let url = endpoint(&self.api_base, "gmail/v1/users/me/messages/send");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&creds.token)
            .json(&json!({ "raw": URL_SAFE.encode(raw.as_bytes()) }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(to, file = file_name, "sent mail");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::AuthorizedUser;
    use chrono::{Duration, Utc};
    use mockito::Matcher;
    use tempfile::TempDir;

    fn cached_token(dir: &Path) -> PathBuf {
        let path = dir.join("token.json");
        TokenCache::new(&path)
            .save(&AuthorizedUser {
                token: "access-1".into(),
                refresh_token: Some("refresh-1".into()),
                token_uri: "http://127.0.0.1:1/token".into(),
                client_id: "cid".into(),
                client_secret: "cs".into(),
                scopes: vec![GMAIL_SEND_SCOPE.into()],
                expiry: Some(Utc::now() + Duration::hours(1)),
            })
            .unwrap();
        path
    }

    #[tokio::test]
    async fn sends_raw_message_with_cached_token() {
        let dir = TempDir::new().unwrap();
        let token = cached_token(dir.path());
        let attachment = dir.path().join("Login_2024-05-01_10-00-00.txt");
        std::fs::write(&attachment, "1. Open the login page").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .match_header("authorization", "Bearer access-1")
            .match_body(Matcher::Regex(r#"^\{"raw":"[A-Za-z0-9_\-=]+"\}$"#.into()))
            .with_status(200)
            .with_body(r#"{"id":"18f","threadId":"18f","labelIds":["SENT"]}"#)
            .create_async()
            .await;

        let mailer = GmailMailer::new(server.url(), dir.path().join("credentials.json"), token);
        mailer
            .send("qa@example.com", "Your Test Cases", "see attached", &attachment)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_failure_carries_status_and_body() {
        let dir = TempDir::new().unwrap();
        let token = cached_token(dir.path());
        let attachment = dir.path().join("out.txt");
        std::fs::write(&attachment, "x").unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .with_status(403)
            .with_body("insufficient permissions")
            .create_async()
            .await;

        let mailer = GmailMailer::new(server.url(), dir.path().join("credentials.json"), token);
        let err = mailer
            .send("qa@example.com", "s", "b", &attachment)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("insufficient permissions"), "{err}");
    }

    #[tokio::test]
    async fn missing_attachment_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mailer = GmailMailer::new("http://127.0.0.1:1", "credentials.json", "token.json");
        assert!(matches!(
            mailer
                .send("a@b.c", "s", "b", &dir.path().join("missing.txt"))
                .await,
            Err(ClientError::Io(_))
        ));
    }
}
