//! HTTP-facing error type.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tally_docs::DocsError;

pub const XLSX_FAILURE_MESSAGE: &str = "Failed to generate XLSX file";
pub const PDF_FAILURE_MESSAGE: &str = "Failed to generate PDF";

/// Errors returned by the export handlers.
///
/// Generation failures answer with a fixed message; the underlying cause is
/// logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("XLSX export failed: {0}")]
    Xlsx(#[source] DocsError),

    #[error("PDF export failed: {0}")]
    Pdf(#[source] DocsError),

    /// The request body describes an invalid document.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Classify a workbook failure: schema problems are the caller's fault.
    pub fn xlsx(err: DocsError) -> Self {
        if err.is_invalid_input() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Xlsx(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Xlsx(_) | Self::Pdf(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Malformed or incomplete request bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Xlsx(_) => {
                tracing::error!("{self}");
                XLSX_FAILURE_MESSAGE.to_string()
            }
            Self::Pdf(_) => {
                tracing::error!("{self}");
                PDF_FAILURE_MESSAGE.to_string()
            }
            Self::BadRequest(msg) => {
                tracing::debug!("Rejected export request: {msg}");
                msg.clone()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_errors_hide_detail() {
        let err = ApiError::xlsx(DocsError::Io(std::io::Error::other("disk on fire")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Xlsx(_)));

        let err = ApiError::Pdf(DocsError::Stream("gone".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = ApiError::xlsx(DocsError::Build("columns must not be empty".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("columns must not be empty"));

        let err = ApiError::xlsx(DocsError::InvalidContent("font size".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
