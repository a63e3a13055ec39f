//! Route handlers.

use std::io;

use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tally_docs::pdf::{self, ContentBlock, PDF_CONTENT_TYPE, PdfStreamOptions};
use tally_docs::{DocsError, XLSX_CONTENT_TYPE};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::ApiError;
use crate::request::{PdfExportRequest, XlsxExportRequest};
use crate::sample;
use crate::state::AppState;

pub async fn ping() -> &'static str {
    "pong\n"
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

/// `GET /export/xlsx`: the built-in product catalog.
pub async fn export_sample_xlsx() -> Result<Response, ApiError> {
    let bytes = tally_docs::export_spreadsheet(
        sample::product_columns(),
        sample::product_records(),
        sample::PRODUCTS_SHEET.to_string(),
    )
    .await
    .map_err(ApiError::Xlsx)?;
    Ok(xlsx_response(bytes, sample::PRODUCTS_FILENAME))
}

/// `POST /export/xlsx`: a workbook built from the request body.
pub async fn export_xlsx(
    payload: Result<Json<XlsxExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let filename = attachment_filename(req.filename.as_deref(), &req.sheet_name, "xlsx");
    let bytes = tally_docs::export_spreadsheet(req.columns, req.data, req.sheet_name)
        .await
        .map_err(ApiError::xlsx)?;
    Ok(xlsx_response(bytes, &filename))
}

fn xlsx_response(bytes: Vec<u8>, filename: &str) -> Response {
    info!(bytes = bytes.len(), filename, "XLSX export complete");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
        ],
        bytes,
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// `GET /export/pdf`: the built-in demo report.
pub async fn export_sample_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let options = state.pdf_options().with_title(sample::REPORT_TITLE);
    stream_pdf(sample::report_blocks(), options, sample::REPORT_FILENAME, false).await
}

/// `POST /export/pdf`: a report built from the request's block list.
pub async fn export_pdf(
    State(state): State<AppState>,
    payload: Result<Json<PdfExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let filename = attachment_filename(req.filename.as_deref(), "report", "pdf");
    let mut options = state.pdf_options();
    if let Some(page) = req.page {
        options.page = page;
    }
    if let Some(title) = &req.title {
        options = options.with_title(title.clone());
    }
    stream_pdf(req.into_blocks(), options, &filename, true).await
}

/// Start rendering and respond once the first chunk is available.
///
/// A failure before that point becomes an error response; after it, the
/// body stream ends with an error and the connection is aborted.
async fn stream_pdf(
    blocks: Vec<ContentBlock>,
    options: PdfStreamOptions,
    filename: &str,
    client_input: bool,
) -> Result<Response, ApiError> {
    let mut rx = pdf::export_pdf_stream(blocks, options);

    let first = match rx.recv().await {
        Some(Ok(chunk)) => chunk,
        Some(Err(e)) if client_input && e.kind() == io::ErrorKind::InvalidInput => {
            return Err(ApiError::BadRequest(e.to_string()));
        }
        Some(Err(e)) => return Err(ApiError::Pdf(DocsError::Io(e))),
        None => {
            return Err(ApiError::Pdf(DocsError::Stream(
                "renderer stopped before producing output".into(),
            )));
        }
    };

    info!(filename, "PDF stream started");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
        ],
        Body::from_stream(chunk_stream(first, rx)),
    )
        .into_response())
}

/// The already-received first chunk followed by the rest of the channel.
fn chunk_stream(
    first: Bytes,
    rx: mpsc::Receiver<io::Result<Bytes>>,
) -> impl futures::Stream<Item = io::Result<Bytes>> {
    let rest = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    });
    futures::StreamExt::chain(futures::stream::once(async move { Ok(first) }), rest)
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Pick a safe attachment name: the requested one with anything outside
/// printable ASCII, quotes, backslashes and path separators replaced, or
/// `fallback`, always ending in `.{extension}`.
pub fn attachment_filename(requested: Option<&str>, fallback: &str, extension: &str) -> String {
    let clean = |raw: &str| -> String {
        raw.trim()
            .chars()
            .map(|c| match c {
                '"' | '\\' | '/' => '_',
                c if c.is_ascii_graphic() || c == ' ' => c,
                _ => '_',
            })
            .collect()
    };

    let mut name = requested.map(clean).unwrap_or_default();
    if name.trim_matches(['_', '.', ' ']).is_empty() {
        name = clean(fallback);
    }
    if name.trim_matches(['_', '.', ' ']).is_empty() {
        name = "export".to_string();
    }

    let suffix = format!(".{extension}");
    if !name.to_ascii_lowercase().ends_with(&suffix) {
        name.push_str(&suffix);
    }
    name
}

pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}
