//! # Eight-Count Common Library
//!
//! Shared code for the eight-count services:
//! - Tap-tempo estimation
//! - Beat grid construction and cell editing
//! - Plain-text sheet export
//! - Sheet records and the editing session
//! - Tempo-lookup types
//! - Configuration loading
//! - Database initialization and sheet queries

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod export;
pub mod grid;
pub mod lookup;
pub mod sheet;
pub mod tempo;
pub mod time;

pub use error::{Error, Result};
pub use export::serialize_for_export;
pub use grid::{BeatGrid, CountCell, EightCount};
pub use lookup::{LookupError, TrackFeatures};
pub use sheet::{SheetRecord, SheetSession, SheetSummary, StoredSheet};
pub use tempo::TapTempoEstimator;
