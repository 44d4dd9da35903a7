use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use casegen_core::form::GenerateForm;
use casegen_core::prompt::build_prompt;
use casegen_core::record::timestamp_now;
use casegen_core::render::extract_code_blocks;
use casegen_core::session::{Notice, SessionEvent};
use casegen_core::CasegenError;
use serde_json::json;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

const NOT_SAVED: &str =
    "A project with this title was saved at the same moment. This output was not saved.";

/// POST /api/generate
///
/// Validate the form, ask the model, persist the record, and return it with
/// its extracted code blocks. Nothing is sent to the model when validation
/// fails. If a record with the same title and timestamp already exists the
/// response is a 409 that still carries the unsaved output.
pub async fn generate(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(form): Json<GenerateForm>,
) -> Result<Response, AppError> {
    let validated = form.validate()?;
    let prompt = build_prompt(&validated.prompt_input());

    tracing::info!(title = %validated.title, format = %validated.format_type, "generating test cases");
    let output = app.services.chat.complete(&prompt).await?;

    let record = validated.into_record(&current.user.email, timestamp_now(), output);
    let store = app.store.clone();
    let saved = record.clone();
    let result = tokio::task::spawn_blocking(move || store.save(&saved))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    let blocks = extract_code_blocks(&record.output);
    match result {
        Ok(_) => {}
        Err(CasegenError::RecordExists(key)) => {
            tracing::warn!(%key, "generated output not saved, record exists");
            let body = json!({
                "error": format!("record already exists: {key}"),
                "record": record,
                "code_blocks": blocks,
                "notices": [Notice::warning(NOT_SAVED)],
            });
            return Ok((StatusCode::CONFLICT, Json(body)).into_response());
        }
        Err(e) => return Err(e.into()),
    }

    let notices = app
        .dispatch(&current.token, SessionEvent::Generated(Box::new(record.clone())))
        .await;

    Ok(Json(json!({
        "record": record,
        "code_blocks": blocks,
        "notices": notices,
    }))
    .into_response())
}

