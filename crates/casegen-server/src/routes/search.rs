use axum::extract::{Query, State};
use axum::{Extension, Json};
use casegen_core::export::preview;
use casegen_core::filter::RecordFilter;
use casegen_core::types::TestType;
use serde_json::json;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 400;

#[derive(serde::Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub title: Option<String>,
    pub test_type: Option<String>,
}

/// GET /api/search?q=<keyword>&title=<substring>&test_type=<type>
pub async fn search(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let test_type = params
        .test_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"))
        .map(str::parse::<TestType>)
        .transpose()?;
    let filter = RecordFilter {
        title: params.title,
        test_type,
        keyword: params.q,
    };

    let store = app.store.clone();
    let owner = current.user.email.clone();
    let records = tokio::task::spawn_blocking(move || store.list(&owner))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let results: Vec<serde_json::Value> = filter
        .apply(records)
        .iter()
        .map(|r| {
            json!({
                "title": r.title,
                "timestamp": r.timestamp,
                "test_type": r.test_type,
                "author": r.author,
                "preview": preview(&r.output, PREVIEW_CHARS),
            })
        })
        .collect();

    Ok(Json(json!({ "count": results.len(), "results": results })))
}
