use axum::extract::State;
use axum::{Extension, Json};
use casegen_core::form::GenerateForm;
use casegen_core::prompt::build_prompt;
use casegen_core::types::{
    AutomationStyle, FormatType, Framework, TestType, CATEGORIES, SEVERITIES,
};
use serde_json::json;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/options
pub async fn options() -> Json<serde_json::Value> {
    Json(json!({
        "test_types": TestType::all().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "format_types": FormatType::all().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "frameworks": Framework::all().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "styles": AutomationStyle::all().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "severities": SEVERITIES,
        "categories": CATEGORIES,
    }))
}

/// GET /api/session
pub async fn session(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Json<serde_json::Value> {
    let ctx = app.session(&current.token).await.unwrap_or_default();
    Json(json!({
        "user": ctx.user,
        "last_record": ctx.last_record.as_ref().map(|r| json!({
            "title": r.title,
            "timestamp": r.timestamp,
        })),
        "email_pending": ctx.pending_email.is_some(),
    }))
}

/// POST /api/prompt
pub async fn prompt(Json(form): Json<GenerateForm>) -> Result<Json<serde_json::Value>, AppError> {
    let validated = form.validate_for_prompt()?;
    Ok(Json(json!({ "prompt": build_prompt(&validated.prompt_input()) })))
}
