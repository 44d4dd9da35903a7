use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use casegen_core::export;
use casegen_core::record::{group_by_title, ProjectRecord, ProjectStore};
use casegen_core::render::extract_code_blocks;
use casegen_core::session::SessionEvent;
use casegen_core::CasegenError;
use serde_json::json;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Load a record, reporting records owned by someone else as missing.
fn load_owned(
    store: &ProjectStore,
    title: &str,
    timestamp: &str,
    owner: &str,
) -> Result<ProjectRecord, AppError> {
    let record = store.load(title, timestamp)?;
    if record.author_email != owner {
        return Err(CasegenError::RecordNotFound(format!("{title} @ {timestamp}")).into());
    }
    Ok(record)
}

async fn owned(
    app: &AppState,
    current: &CurrentUser,
    title: String,
    timestamp: String,
) -> Result<ProjectRecord, AppError> {
    let store = app.store.clone();
    let owner = current.user.email.clone();
    tokio::task::spawn_blocking(move || load_owned(&store, &title, &timestamp, &owner))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
}

/// GET /api/projects
pub async fn list_projects(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let owner = current.user.email.clone();
    let records = tokio::task::spawn_blocking(move || store.list(&owner))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let projects: Vec<serde_json::Value> = group_by_title(records)
        .into_iter()
        .map(|(title, versions)| {
            let versions: Vec<serde_json::Value> = versions
                .into_iter()
                .map(|(timestamp, record)| json!({ "timestamp": timestamp, "record": record }))
                .collect();
            json!({ "title": title, "versions": versions })
        })
        .collect();

    Ok(Json(json!({ "projects": projects })))
}

/// GET /api/projects/{title}/{timestamp}
pub async fn get_project(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((title, timestamp)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = owned(&app, &current, title, timestamp).await?;
    let blocks = extract_code_blocks(&record.output);
    Ok(Json(json!({ "record": record, "code_blocks": blocks })))
}

#[derive(serde::Deserialize)]
pub struct DownloadParams {
    pub format: Option<String>,
}

/// GET /api/projects/{title}/{timestamp}/download?format=txt|csv
pub async fn download_project(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((title, timestamp)): Path<(String, String)>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    let format = params.format.as_deref().unwrap_or("txt").to_ascii_lowercase();
    let record = owned(&app, &current, title, timestamp).await?;

    let (content_type, body) = match format.as_str() {
        "txt" => ("text/plain; charset=utf-8", record.output.clone()),
        "csv" => {
            let csv = export::to_csv(&record.output)?.ok_or_else(|| {
                AppError::bad_request("output has no numbered test cases to export")
            })?;
            ("text/csv; charset=utf-8", csv)
        }
        other => return Err(AppError::bad_request(format!("unknown download format: {other}"))),
    };

    let name = export::download_name(&record, &format);
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /api/projects/{title}/{timestamp}/share
pub async fn share_project(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((title, timestamp)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = owned(&app, &current, title, timestamp).await?;
    Ok(Json(json!({
        "subject": export::SHARE_SUBJECT,
        "mailto": export::mailto_link(&record.output),
        "preview": export::email_preview(&record.output),
    })))
}

#[derive(serde::Deserialize)]
pub struct EmailBody {
    #[serde(default)]
    pub to: String,
}

/// POST /api/projects/{title}/{timestamp}/email
///
/// Writes the output to a `.txt` next to the record and mails it. Only one
/// send per session may be in flight.
pub async fn email_project(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((title, timestamp)): Path<(String, String)>,
    Json(body): Json<EmailBody>,
) -> Result<Response, AppError> {
    let to = body.to.trim().to_string();
    if to.is_empty() || !to.contains('@') {
        return Err(AppError::bad_request("Enter a recipient email address."));
    }

    let record = owned(&app, &current, title, timestamp).await?;
    let store = app.store.clone();
    let attachment = tokio::task::spawn_blocking(move || store.write_attachment(&record))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let pending = app
        .begin_email(&current.token, to.clone())
        .await
        .map_err(|busy| AppError::conflict(busy.message))?;

    let mail = &app.config.mail;
    let sent = app
        .services
        .mailer
        .send(&to, &mail.subject, &mail.body, &attachment)
        .await;

    let (event, ok) = match sent {
        Ok(()) => (SessionEvent::EmailSent, true),
        Err(e) => {
            tracing::warn!(error = %e, to = %to, "mail send failed");
            (SessionEvent::EmailFailed(e.to_string()), false)
        }
    };
    let notices = pending.finish(event).await;
    if ok {
        return Ok(Json(json!({ "notices": notices })).into_response());
    }
    let message = notices
        .first()
        .map(|n| n.message.clone())
        .unwrap_or_default();
    Ok((
        axum::http::StatusCode::BAD_GATEWAY,
        Json(json!({ "error": message, "notices": notices })),
    )
        .into_response())
}
