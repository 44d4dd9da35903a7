//! Per-user UI session state.
//!
//! Handlers never mutate session state directly: they perform their I/O,
//! then feed the outcome to [`SessionContext::apply`], which returns the next
//! context together with the notices to show the user.

use crate::record::ProjectRecord;
use serde::{Deserialize, Serialize};

pub const LOGIN_OK: &str = "Logged in successfully!";
pub const LOGIN_FAILED: &str = "Login failed. Check credentials.";
pub const SIGNUP_OK: &str = "Account created. Now log in.";
pub const SIGNUP_FAILED: &str = "Signup failed. Try different email or stronger password.";
pub const PROJECT_SAVED: &str = "Project saved.";
pub const EMAIL_SENT: &str = "Email sent successfully!";
pub const EMAIL_FAILED_PREFIX: &str = "Failed to send email: ";

/// The signed-in user, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub email: String,
    pub uid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message for the user produced by a state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserSession),
    SignInFailed,
    SignedUp,
    SignUpFailed,
    SignedOut,
    Generated(Box<ProjectRecord>),
    EmailRequested { recipient: String },
    EmailSent,
    EmailFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub user: Option<UserSession>,
    /// Most recent generation in this session, offered for export.
    pub last_record: Option<ProjectRecord>,
    /// Recipient of an email send that has not finished yet.
    pub pending_email: Option<String>,
}

impl SessionContext {
    pub fn apply(self, event: SessionEvent) -> (Self, Vec<Notice>) {
        match event {
            SessionEvent::SignedIn(user) => (
                Self {
                    user: Some(user),
                    ..Self::default()
                },
                vec![Notice::success(LOGIN_OK)],
            ),
            SessionEvent::SignInFailed => (self, vec![Notice::error(LOGIN_FAILED)]),
            SessionEvent::SignedUp => (self, vec![Notice::success(SIGNUP_OK)]),
            SessionEvent::SignUpFailed => (self, vec![Notice::error(SIGNUP_FAILED)]),
            SessionEvent::SignedOut => (Self::default(), Vec::new()),
            SessionEvent::Generated(record) => (
                Self {
                    last_record: Some(*record),
                    ..self
                },
                vec![Notice::success(PROJECT_SAVED)],
            ),
            SessionEvent::EmailRequested { recipient } => {
                if self.pending_email.is_some() {
                    return (
                        self,
                        vec![Notice::warning("An email is already being sent.")],
                    );
                }
                (
                    Self {
                        pending_email: Some(recipient),
                        ..self
                    },
                    Vec::new(),
                )
            }
            SessionEvent::EmailSent => (
                Self {
                    pending_email: None,
                    ..self
                },
                vec![Notice::success(EMAIL_SENT)],
            ),
            SessionEvent::EmailFailed(detail) => (
                Self {
                    pending_email: None,
                    ..self
                },
                vec![Notice::error(format!("{EMAIL_FAILED_PREFIX}{detail}"))],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FormatType, TestType};

    fn user() -> UserSession {
        UserSession {
            email: "ada@x.io".into(),
            uid: "uid-1".into(),
        }
    }

    fn record() -> ProjectRecord {
        ProjectRecord {
            title: "Login".into(),
            author: "Ada".into(),
            author_email: "ada@x.io".into(),
            timestamp: "2024-05-01_10-00-00".into(),
            test_type: TestType::Functional,
            format_type: FormatType::ManualOnly,
            framework: None,
            style: None,
            expected_result: None,
            severity: None,
            category: None,
            user_story: "story".into(),
            output: "1. step".into(),
        }
    }

    #[test]
    fn sign_in_replaces_previous_state() {
        let (ctx, _) = SessionContext::default().apply(SessionEvent::SignedIn(user()));
        let (ctx, _) = ctx.apply(SessionEvent::Generated(Box::new(record())));
        let (ctx, notices) = ctx.apply(SessionEvent::SignedIn(UserSession {
            email: "bob@x.io".into(),
            uid: "uid-2".into(),
        }));
        assert_eq!(ctx.user.unwrap().email, "bob@x.io");
        assert!(ctx.last_record.is_none());
        assert_eq!(notices, vec![Notice::success(LOGIN_OK)]);
    }

    #[test]
    fn failed_sign_in_keeps_state_and_reports_fixed_message() {
        let (ctx, notices) = SessionContext::default().apply(SessionEvent::SignInFailed);
        assert!(ctx.user.is_none());
        assert_eq!(notices, vec![Notice::error(LOGIN_FAILED)]);
    }

    #[test]
    fn generated_sets_last_record() {
        let (ctx, _) = SessionContext::default().apply(SessionEvent::SignedIn(user()));
        let (ctx, notices) = ctx.apply(SessionEvent::Generated(Box::new(record())));
        assert_eq!(ctx.last_record.unwrap().title, "Login");
        assert_eq!(notices[0].message, PROJECT_SAVED);
    }

    #[test]
    fn email_flow_sets_and_clears_pending() {
        let (ctx, _) = SessionContext::default().apply(SessionEvent::SignedIn(user()));
        let (ctx, notices) = ctx.apply(SessionEvent::EmailRequested {
            recipient: "qa@x.io".into(),
        });
        assert!(notices.is_empty());
        assert_eq!(ctx.pending_email.as_deref(), Some("qa@x.io"));

        let (busy, notices) = ctx.clone().apply(SessionEvent::EmailRequested {
            recipient: "other@x.io".into(),
        });
        assert_eq!(busy.pending_email.as_deref(), Some("qa@x.io"));
        assert_eq!(notices[0].level, NoticeLevel::Warning);

        let (ctx, notices) = ctx.apply(SessionEvent::EmailFailed("quota exceeded".into()));
        assert!(ctx.pending_email.is_none());
        assert_eq!(
            notices,
            vec![Notice::error("Failed to send email: quota exceeded")]
        );
    }

    #[test]
    fn sign_out_clears_everything() {
        let (ctx, _) = SessionContext::default().apply(SessionEvent::SignedIn(user()));
        let (ctx, _) = ctx.apply(SessionEvent::Generated(Box::new(record())));
        let (ctx, notices) = ctx.apply(SessionEvent::SignedOut);
        assert_eq!(ctx, SessionContext::default());
        assert!(notices.is_empty());
    }
}
