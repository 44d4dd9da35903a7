use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use casegen_clients::ClientError;
use casegen_core::CasegenError;

// ---------------------------------------------------------------------------
// Sentinels for explicit statuses
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 401 through the `anyhow::Error` chain.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

/// Carries an explicit HTTP 409 through the `anyhow::Error` chain.
#[derive(Debug)]
struct ConflictError(String);

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConflictError {}

/// Carries an explicit HTTP 404 through the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. The body is always
/// `{"error": "<message>"}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CasegenError::Validation(msg.into()).into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(ConflictError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<UnauthorizedError>().is_some() {
            return StatusCode::UNAUTHORIZED;
        }
        if self.0.downcast_ref::<ConflictError>().is_some() {
            return StatusCode::CONFLICT;
        }
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        if let Some(e) = self.0.downcast_ref::<CasegenError>() {
            return match e {
                CasegenError::NotInitialized
                | CasegenError::Validation(_)
                | CasegenError::InvalidTimestamp(_)
                | CasegenError::InvalidTestType(_)
                | CasegenError::InvalidFormatType(_)
                | CasegenError::InvalidFramework(_)
                | CasegenError::InvalidStyle(_) => StatusCode::BAD_REQUEST,
                CasegenError::RecordNotFound(_) => StatusCode::NOT_FOUND,
                CasegenError::RecordExists(_) => StatusCode::CONFLICT,
                CasegenError::Io(_)
                | CasegenError::Yaml(_)
                | CasegenError::Json(_)
                | CasegenError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if let Some(e) = self.0.downcast_ref::<ClientError>() {
            return match e {
                ClientError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
