//! Audio-features lookup endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use ec_common::{LookupError, TrackFeatures};
use serde::Deserialize;
use tracing::info;

use super::error::LookupFailure;
use crate::AppState;

/// Query parameters for GET /api/audio-features
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesQuery {
    pub track_id: Option<String>,
    pub access_token: Option<String>,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET /api/audio-features?trackId=..&accessToken=..
///
/// Returns `{bpm, duration}` with duration in seconds.
pub async fn get_audio_features(
    State(state): State<AppState>,
    Query(query): Query<FeaturesQuery>,
) -> Result<Json<TrackFeatures>, LookupFailure> {
    let (track_id, access_token) = match (required(&query.track_id), required(&query.access_token)) {
        (Some(track_id), Some(access_token)) => (track_id, access_token),
        _ => return Err(LookupError::MissingParameters.into()),
    };

    let features = state.client.audio_features(track_id, access_token).await?;
    info!(
        track_id = %track_id,
        bpm = features.bpm,
        duration = features.duration,
        "Resolved audio features"
    );

    Ok(Json(features))
}
