//! ec-tempo library - Tempo lookup proxy
//!
//! Forwards a track lookup to the streaming-music API's audio-features
//! endpoint and answers with the `{bpm, duration}` pair a beat grid is built
//! from.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;

pub use client::MusicApiClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream music API client
    pub client: Arc<MusicApiClient>,
}

impl AppState {
    /// Create new application state
    pub fn new(client: MusicApiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/audio-features", get(api::get_audio_features))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
