//! Database initialization and sheet queries

pub mod init;
pub mod sheets;

pub use init::*;
pub use sheets::*;
