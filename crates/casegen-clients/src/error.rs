use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Why the identity service refused a sign-in or sign-up.
///
/// The detail is kept for logs only. Users see one fixed message per
/// operation regardless of kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("an account with this email already exists")]
    EmailExists,

    #[error("password too weak: {0}")]
    WeakPassword(String),

    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    #[error("identity service rejected the request: {0}")]
    Rejected(String),
}

impl AuthError {
    /// Failures caused by the service rather than by what the user typed.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, AuthError::Unavailable(_))
    }

    /// Classify an Identity Toolkit error message such as `EMAIL_EXISTS` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_code(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" | "USER_DISABLED" | "MISSING_PASSWORD" | "MISSING_EMAIL" => {
                AuthError::InvalidCredentials(message.to_string())
            }
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "WEAK_PASSWORD" => AuthError::WeakPassword(message.to_string()),
            c if c.starts_with("TOO_MANY_ATTEMPTS") => AuthError::Unavailable(message.to_string()),
            _ => AuthError::Rejected(message.to_string()),
        }
    }
}
