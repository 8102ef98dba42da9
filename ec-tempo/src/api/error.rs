//! HTTP mapping for lookup failures
//!
//! Error bodies are `{"error": message}`, the shape existing clients of the
//! lookup function parse.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ec_common::LookupError;
use serde_json::json;

/// Response wrapper for [`LookupError`]
#[derive(Debug)]
pub struct LookupFailure(pub LookupError);

impl From<LookupError> for LookupFailure {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

impl IntoResponse for LookupFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            LookupError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
