//! Tempo-lookup types shared by the proxy service and its clients

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Error, Result};

/// Tempo and length of a streaming track, as returned by the lookup proxy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    /// Beats per minute, possibly fractional
    pub bpm: f64,
    /// Track length in seconds
    pub duration: f64,
}

impl TrackFeatures {
    /// Validate and convert to `(duration_seconds, bpm)` grid parameters.
    ///
    /// The tempo is rounded to a whole BPM. Missing, non-positive or
    /// non-finite values are rejected; no default tempo is substituted.
    pub fn grid_params(&self) -> Result<(f64, u32)> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "track duration must be positive, got {}",
                self.duration
            )));
        }
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "track tempo must be positive, got {}",
                self.bpm
            )));
        }

        let bpm = self.bpm.round();
        if bpm < 1.0 || bpm > u32::MAX as f64 {
            return Err(Error::InvalidInput(format!(
                "track tempo {} does not round to a usable BPM",
                self.bpm
            )));
        }
        Ok((self.duration, bpm as u32))
    }
}

/// Song URI recorded for a streaming track
pub fn song_uri_for_track(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}

/// Failure modes of a track lookup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("Missing trackId or accessToken")]
    MissingParameters,

    #[error("Track not found or no audio features available")]
    TrackNotFound,

    /// Upstream answered with a non-success status
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Unable to reach music API")]
    Unreachable,

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl LookupError {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::MissingParameters => 400,
            LookupError::TrackNotFound => 404,
            LookupError::Upstream { status, .. } => *status,
            LookupError::Unreachable => 503,
            LookupError::Unexpected(_) => 500,
        }
    }
}
