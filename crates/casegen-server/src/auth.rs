use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use casegen_core::session::UserSession;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "casegen_session";

/// The signed-in caller, inserted into request extensions by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: UserSession,
}

/// Axum middleware that rejects requests without a live session cookie.
///
/// API paths get a JSON 401; anything else gets a plain-text one.
pub async fn require_session(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = session_token(req.headers()) {
        if let Some(user) = app.session(&token).await.and_then(|ctx| ctx.user) {
            req.extensions_mut().insert(CurrentUser { token, user });
            return next.run(req).await;
        }
    }

    let (content_type, body) = if req.uri().path().starts_with("/api/") {
        ("application/json", r#"{"error":"unauthorized"}"#)
    } else {
        ("text/plain; charset=utf-8", "sign in required")
    };
    Response::builder()
        .status(401)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .expect("infallible: all header values are valid ASCII")
}

/// Value of the session cookie, if the request carries one.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|part| {
            part.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
