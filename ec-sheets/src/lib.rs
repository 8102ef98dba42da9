//! ec-sheets library - Sheet store service
//!
//! Persists eight-count sheets in SQLite and serves them over HTTP,
//! including the plain-text export used for sharing.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let sheets = Router::new()
        .route("/api/sheets", get(api::list_sheets).post(api::create_sheet))
        .route(
            "/api/sheets/:id",
            get(api::get_sheet)
                .put(api::update_sheet)
                .delete(api::delete_sheet),
        )
        .route("/api/sheets/:id/export", get(api::export_sheet))
        .route("/api/grid", post(api::build_grid));

    Router::new()
        .merge(sheets)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
