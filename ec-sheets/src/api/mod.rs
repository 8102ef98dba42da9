//! HTTP API handlers for ec-sheets

pub mod error;
pub mod grid;
pub mod health;
pub mod sheets;

pub use error::ApiError;
pub use grid::build_grid;
pub use health::health_routes;
pub use sheets::{create_sheet, delete_sheet, export_sheet, get_sheet, list_sheets, update_sheet};
