use casegen_clients::{
    ChatModel, ClientError, FirebaseIdentity, GmailMailer, IdentityProvider, Mailer, OpenAiChat,
};
use casegen_core::config::Config;
use casegen_core::record::ProjectStore;
use casegen_core::session::{Notice, NoticeLevel, SessionContext, SessionEvent, UserSession};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The hosted services a running server talks to.
#[derive(Clone)]
pub struct Services {
    pub chat: Arc<dyn ChatModel>,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn Mailer>,
}

impl Services {
    /// Real clients configured from `config`, with API keys read from the
    /// environment variables it names.
    pub fn from_config(root: &Path, config: &Config) -> Result<Self, ClientError> {
        let model_key = env_key(&config.model.api_key_env)?;
        let identity_key = env_key(&config.identity.api_key_env)?;
        Ok(Self {
            chat: Arc::new(OpenAiChat::new(
                &config.model.base_url,
                &config.model.model,
                config.model.temperature,
                model_key,
            )),
            identity: Arc::new(FirebaseIdentity::new(
                &config.identity.base_url,
                identity_key,
            )),
            mailer: Arc::new(GmailMailer::new(
                &config.mail.api_base,
                config.credentials_path(root),
                config.token_path(root),
            )),
        })
    }
}

fn env_key(name: &str) -> Result<String, ClientError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ClientError::MissingCredential(format!("environment variable {name} is not set"))
        })
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub store: ProjectStore,
    pub services: Services,
    /// UI sessions keyed by cookie token. Process memory only.
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config, services: Services) -> Self {
        let store = ProjectStore::from_config(&root, &config);
        Self {
            root,
            config: Arc::new(config),
            store,
            services,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn session(&self, token: &str) -> Option<SessionContext> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Start a session for a freshly signed-in user. Returns the cookie token.
    pub async fn open_session(&self, user: UserSession) -> (String, Vec<Notice>) {
        let token = uuid::Uuid::new_v4().to_string();
        let (ctx, notices) = SessionContext::default().apply(SessionEvent::SignedIn(user));
        self.sessions.write().await.insert(token.clone(), ctx);
        (token, notices)
    }

    pub async fn close_session(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Feed `event` to the session's reducer and store the result. Tokens
    /// that no longer exist (signed out mid-request) get the reducer's
    /// notices but nothing is stored for them.
    pub async fn dispatch(&self, token: &str, event: SessionEvent) -> Vec<Notice> {
        apply_event(&mut *self.sessions.write().await, token, event)
    }

    /// Mark an email send as pending for the session. Returns the busy
    /// warning when another send is already in flight; otherwise a guard
    /// that clears the pending mark when finished or dropped.
    pub async fn begin_email(&self, token: &str, recipient: String) -> Result<PendingEmail, Notice> {
        let notices = self
            .dispatch(token, SessionEvent::EmailRequested { recipient })
            .await;
        if let Some(busy) = notices.into_iter().find(|n| n.level == NoticeLevel::Warning) {
            return Err(busy);
        }
        Ok(PendingEmail {
            sessions: Arc::clone(&self.sessions),
            token: Some(token.to_string()),
        })
    }
}

fn apply_event(
    sessions: &mut HashMap<String, SessionContext>,
    token: &str,
    event: SessionEvent,
) -> Vec<Notice> {
    match sessions.get_mut(token) {
        Some(ctx) => {
            let (next, notices) = std::mem::take(ctx).apply(event);
            *ctx = next;
            notices
        }
        None => SessionContext::default().apply(event).1,
    }
}

/// An email send in flight for one session.
///
/// [`PendingEmail::finish`] records the outcome. If the request is dropped
/// first (client gone, OAuth consent abandoned) the pending mark is cleared
/// as a failed send so later requests are not refused.
pub struct PendingEmail {
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
    token: Option<String>,
}

impl PendingEmail {
    pub async fn finish(mut self, event: SessionEvent) -> Vec<Notice> {
        match self.token.take() {
            Some(token) => apply_event(&mut *self.sessions.write().await, &token, event),
            None => Vec::new(),
        }
    }
}

impl Drop for PendingEmail {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        let event = SessionEvent::EmailFailed(CANCELLED.to_string());
        if let Ok(mut sessions) = self.sessions.try_write() {
            apply_event(&mut sessions, &token, event);
            return;
        }
        let sessions = Arc::clone(&self.sessions);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    apply_event(&mut *sessions.write().await, &token, event);
                });
            }
            Err(_) => tracing::warn!("pending email left set: no runtime to clear it"),
        }
    }
}

const CANCELLED: &str = "request cancelled";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_token_is_not_stored() {
        let mut sessions = HashMap::new();
        let notices = apply_event(&mut sessions, "gone", SessionEvent::EmailSent);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert!(sessions.is_empty());
    }

    #[test]
    fn known_token_is_updated_in_place() {
        let mut sessions = HashMap::new();
        sessions.insert("t".to_string(), SessionContext::default());
        apply_event(
            &mut sessions,
            "t",
            SessionEvent::EmailRequested {
                recipient: "qa@example.com".into(),
            },
        );
        assert_eq!(sessions["t"].pending_email.as_deref(), Some("qa@example.com"));
    }
}
