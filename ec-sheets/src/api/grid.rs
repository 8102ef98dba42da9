//! Blank grid construction endpoint
//!
//! Lets a thin client size a new sheet without carrying the grid
//! arithmetic itself.

use axum::Json;
use ec_common::grid::BeatGrid;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Request body for POST /api/grid
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRequest {
    pub duration_seconds: f64,
    pub bpm: u32,
}

/// Response body for POST /api/grid
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub bpm: u32,
    pub eight_counts: Vec<String>,
}

/// POST /api/grid
pub async fn build_grid(Json(request): Json<GridRequest>) -> Result<Json<GridResponse>, ApiError> {
    let grid = BeatGrid::build(request.duration_seconds, request.bpm)?;
    Ok(Json(GridResponse {
        bpm: request.bpm,
        eight_counts: grid.to_strings(),
    }))
}
