//! Streaming-music API client
//!
//! Fetches a track's audio features (tempo and length) with the caller's
//! OAuth access token. The token is passed through untouched and never
//! logged.

use std::time::Duration;

use ec_common::{LookupError, TrackFeatures};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("eightcount-tempo/", env!("CARGO_PKG_VERSION"));

/// Audio-features payload; only the fields the grid needs
#[derive(Debug, Deserialize)]
struct AudioFeatures {
    /// Estimated tempo in BPM
    tempo: f64,
    /// Track length in milliseconds
    duration_ms: f64,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

/// Music API client
pub struct MusicApiClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl MusicApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LookupError::Unexpected(format!("Invalid upstream URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::Unexpected(format!(
                "Upstream URL {} cannot be a base",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Unexpected(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn features_url(&self, track_id: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Unexpected("Upstream URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("audio-features")
            .push(track_id);
        Ok(url)
    }

    /// Look up tempo and duration for `track_id`
    pub async fn audio_features(
        &self,
        track_id: &str,
        access_token: &str,
    ) -> Result<TrackFeatures, LookupError> {
        let url = self.features_url(track_id)?;
        debug!(track_id = %track_id, url = %url, "Requesting audio features");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    LookupError::Unexpected(e.to_string())
                } else {
                    warn!(track_id = %track_id, "Music API unreachable: {}", e);
                    LookupError::Unreachable
                }
            })?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::TrackNotFound);
        }

        if !status.is_success() {
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Upstream error")
                        .to_string()
                });
            warn!(track_id = %track_id, status = status.as_u16(), "Music API error: {}", message);
            return Err(LookupError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let features: Option<AudioFeatures> = response
            .json()
            .await
            .map_err(|e| LookupError::Unexpected(format!("Malformed audio features: {}", e)))?;

        let features = features.ok_or(LookupError::TrackNotFound)?;

        Ok(TrackFeatures {
            bpm: features.tempo,
            duration: features.duration_ms / 1000.0,
        })
    }
}
