//! `casegen-clients`: thin async clients for the hosted services casegen
//! glues together.
//!
//! ```text
//! ChatModel         ← OpenAiChat       POST {base}/chat/completions
//! IdentityProvider  ← FirebaseIdentity POST {base}/accounts:signInWithPassword | accounts:signUp
//! Mailer            ← GmailMailer      POST {api}/gmail/v1/users/me/messages/send
//!                        └─ oauth      token.json cache + installed-app consent flow
//! ```
//!
//! Every client is behind an `async_trait` so callers can swap in fakes.
//! None of them retry or set timeouts of their own: a failed call is
//! returned to the caller as-is.

pub mod chat;
pub mod error;
pub mod identity;
pub mod mail;
pub mod mime;
pub mod oauth;

pub use chat::{ChatModel, OpenAiChat};
pub use error::{AuthError, ClientError};
pub use identity::{AuthUser, FirebaseIdentity, IdentityProvider};
pub use mail::{GmailMailer, Mailer};

pub type Result<T> = std::result::Result<T, ClientError>;

/// Join `base` and `path` with exactly one slash between them.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::endpoint;

    #[test]
    fn endpoint_normalizes_slashes() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(endpoint("http://x", "a"), "http://x/a");
    }
}
