//! Sheet CRUD and export endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use ec_common::{db, serialize_for_export, SheetRecord, SheetSummary, StoredSheet};
use tracing::info;

use super::error::ApiError;
use crate::AppState;

/// GET /api/sheets
///
/// Saved sheets, most recently updated first.
pub async fn list_sheets(State(state): State<AppState>) -> Result<Json<Vec<SheetSummary>>, ApiError> {
    Ok(Json(db::list_sheets(&state.db).await?))
}

/// POST /api/sheets
pub async fn create_sheet(
    State(state): State<AppState>,
    Json(record): Json<SheetRecord>,
) -> Result<(StatusCode, Json<StoredSheet>), ApiError> {
    let stored = db::insert_sheet(&state.db, &record).await?;
    info!(sheet_id = %stored.id, title = %stored.record.title, "Created sheet");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/sheets/:id
pub async fn get_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredSheet>, ApiError> {
    Ok(Json(db::get_sheet(&state.db, &id).await?))
}

/// PUT /api/sheets/:id
pub async fn update_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<SheetRecord>,
) -> Result<Json<StoredSheet>, ApiError> {
    let stored = db::update_sheet(&state.db, &id, &record).await?;
    info!(sheet_id = %stored.id, title = %stored.record.title, "Updated sheet");
    Ok(Json(stored))
}

/// DELETE /api/sheets/:id
pub async fn delete_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    db::delete_sheet(&state.db, &id).await?;
    info!(sheet_id = %id, "Deleted sheet");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sheets/:id/export
///
/// Plain-text report for share/print facilities.
pub async fn export_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = db::get_sheet(&state.db, &id).await?;
    let grid = stored.record.grid()?;
    let report = serialize_for_export(&grid, stored.record.bpm);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report,
    ))
}
