use crate::{endpoint, AuthError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The account returned by a successful sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub email: String,
    pub local_id: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
}

/// Email/password accounts through the Identity Toolkit REST API.
pub struct FirebaseIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseIdentity {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn call(&self, method: &str, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let url = endpoint(&self.base_url, &format!("accounts:{method}"));
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::Unavailable(format!("status {status}")));
        }
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            let err = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => AuthError::from_code(&envelope.error.message),
                Err(_) => AuthError::Rejected(format!("status {status}: {text}")),
            };
            tracing::debug!(method, error = %err, "identity request refused");
            return Err(err);
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.call("signUp", email, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const OK_BODY: &str = r#"{
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-42",
        "email": "ada@example.com",
        "idToken": "id-tok",
        "refreshToken": "ref-tok",
        "expiresIn": "3600"
    }"#;

    fn error_body(message: &str) -> String {
        json!({ "error": { "code": 400, "message": message, "errors": [] } }).to_string()
    }

    #[tokio::test]
    async fn sign_in_returns_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "web-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "email": "ada@example.com",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(OK_BODY)
            .create_async()
            .await;

        let identity = FirebaseIdentity::new(server.url(), "web-key");
        let user = identity.sign_in("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.local_id, "uid-42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bad_password_is_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(error_body("INVALID_LOGIN_CREDENTIALS"))
            .create_async()
            .await;

        let identity = FirebaseIdentity::new(server.url(), "k");
        assert!(matches!(
            identity.sign_in("ada@example.com", "nope").await,
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn sign_up_distinguishes_existing_email_and_weak_password() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/accounts:signUp")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({ "email": "taken@example.com" })))
            .with_status(400)
            .with_body(error_body("EMAIL_EXISTS"))
            .create_async()
            .await;
        server
            .mock("POST", "/accounts:signUp")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({ "email": "new@example.com" })))
            .with_status(400)
            .with_body(error_body(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ))
            .create_async()
            .await;

        let identity = FirebaseIdentity::new(server.url(), "k");
        assert_eq!(
            identity.sign_up("taken@example.com", "long-enough").await,
            Err(AuthError::EmailExists)
        );
        assert!(matches!(
            identity.sign_up("new@example.com", "123").await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let identity = FirebaseIdentity::new(server.url(), "k");
        let err = identity.sign_in("a@b.c", "pw").await.unwrap_err();
        assert!(err.is_service_failure());
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        let identity = FirebaseIdentity::new("http://127.0.0.1:1", "k");
        let err = identity.sign_in("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }
}
