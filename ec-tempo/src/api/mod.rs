//! HTTP API handlers for ec-tempo

pub mod error;
pub mod features;
pub mod health;

pub use error::LookupFailure;
pub use features::get_audio_features;
pub use health::health_routes;
