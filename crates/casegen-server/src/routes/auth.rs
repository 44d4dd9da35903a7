use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use casegen_core::session::{Notice, SessionContext, SessionEvent, UserSession};
use serde_json::json;

use crate::auth::{expired_cookie, session_cookie, session_token};
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/sign-in
pub async fn sign_in(State(app): State<AppState>, Json(body): Json<Credentials>) -> Response {
    match app
        .services
        .identity
        .sign_in(body.email.trim(), &body.password)
        .await
    {
        Ok(user) => {
            let session = UserSession {
                email: user.email,
                uid: user.local_id,
            };
            tracing::info!(email = %session.email, "signed in");
            let user = json!(session);
            let (token, notices) = app.open_session(session).await;
            (
                [(header::SET_COOKIE, session_cookie(&token))],
                Json(json!({ "user": user, "notices": notices })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, service_failure = e.is_service_failure(), "sign-in refused");
            let (_, notices) = SessionContext::default().apply(SessionEvent::SignInFailed);
            refusal(StatusCode::UNAUTHORIZED, notices)
        }
    }
}

/// POST /api/auth/sign-up
pub async fn sign_up(State(app): State<AppState>, Json(body): Json<Credentials>) -> Response {
    let outcome = app
        .services
        .identity
        .sign_up(body.email.trim(), &body.password)
        .await;
    let event = match &outcome {
        Ok(_) => SessionEvent::SignedUp,
        Err(e) => {
            tracing::warn!(error = %e, service_failure = e.is_service_failure(), "sign-up refused");
            SessionEvent::SignUpFailed
        }
    };
    let (_, notices) = SessionContext::default().apply(event);
    match outcome {
        Ok(_) => Json(json!({ "notices": notices })).into_response(),
        Err(_) => refusal(StatusCode::BAD_REQUEST, notices),
    }
}

/// POST /api/auth/sign-out
pub async fn sign_out(State(app): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        app.close_session(&token).await;
    }
    (
        [(header::SET_COOKIE, expired_cookie())],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

/// Error body whose message is the first notice.
fn refusal(status: StatusCode, notices: Vec<Notice>) -> Response {
    let message = notices
        .first()
        .map(|n| n.message.clone())
        .unwrap_or_default();
    (
        status,
        Json(json!({ "error": message, "notices": notices })),
    )
        .into_response()
}
