//! HTTP transport for the export pipeline.
//!
//! - `GET /ping`: liveness check.
//! - `GET /export/xlsx`, `POST /export/xlsx`: spreadsheet download.
//! - `GET /export/pdf`, `POST /export/pdf`: streamed PDF download.

pub mod api;
pub mod error;
pub mod request;
pub mod sample;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, serve, serve_on};
pub use state::AppState;
