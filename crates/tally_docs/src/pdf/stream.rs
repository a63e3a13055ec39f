//! Running a block list through a [`PdfDocument`] into a channel or file.

use std::io;
use std::path::Path;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::DocsError;
use crate::pdf::block::ContentBlock;
use crate::pdf::document::{PdfDocument, PdfSummary};
use crate::pdf::layout::PageSetup;
use crate::pdf::sink::{ChannelSink, PdfSink, WriterSink};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Chunks (pages) buffered between producer and consumer.
pub const DEFAULT_STREAM_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub struct PdfStreamOptions {
    pub page: PageSetup,
    pub title: Option<String>,
    pub capacity: usize,
}

impl Default for PdfStreamOptions {
    fn default() -> Self {
        Self {
            page: PageSetup::a4(),
            title: None,
            capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

impl PdfStreamOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Append every block in order, then finish the document.
pub async fn render_to_sink<S: PdfSink>(
    sink: S,
    blocks: Vec<ContentBlock>,
    options: &PdfStreamOptions,
) -> Result<PdfSummary, DocsError> {
    let mut doc = PdfDocument::new(options.page, sink)?;
    if let Some(title) = &options.title {
        doc = doc.with_title(title.clone());
    }
    for block in blocks {
        doc.append(block).await?;
    }
    doc.finish().await
}

/// Render `blocks` on a background task, yielding the file as a stream of
/// chunks.
///
/// The channel holds at most `options.capacity` chunks, so a slow reader
/// pauses production. Dropping the receiver stops the task at its next
/// write. A generation failure is delivered as a final `Err` item, with
/// [`io::ErrorKind::InvalidInput`] when a block was rejected.
pub fn export_pdf_stream(
    blocks: Vec<ContentBlock>,
    options: PdfStreamOptions,
) -> mpsc::Receiver<io::Result<Bytes>> {
    spawn_pdf_stream(blocks, options).0
}

/// [`export_pdf_stream`], also returning the producer task's handle.
pub(crate) fn spawn_pdf_stream(
    blocks: Vec<ContentBlock>,
    options: PdfStreamOptions,
) -> (
    mpsc::Receiver<io::Result<Bytes>>,
    JoinHandle<Result<PdfSummary, DocsError>>,
) {
    let (tx, rx) = mpsc::channel(options.capacity.max(1));
    let sink = ChannelSink::new(tx.clone());

    let handle = tokio::spawn(async move {
        let result = render_to_sink(sink, blocks, &options).await;
        match &result {
            Ok(summary) => {
                info!(pages = summary.pages, bytes = summary.bytes, "PDF stream complete");
            }
            Err(DocsError::Stream(reason)) => {
                warn!(%reason, "PDF stream aborted");
            }
            Err(e) => {
                error!(error = %e, "PDF generation failed");
                let kind = if e.is_invalid_input() {
                    io::ErrorKind::InvalidInput
                } else {
                    io::ErrorKind::Other
                };
                let _ = tx.send(Err(io::Error::new(kind, e.to_string()))).await;
            }
        }
        result
    });

    (rx, handle)
}

/// Render `blocks` straight to a file, page by page.
pub async fn save_pdf_to_file(
    blocks: Vec<ContentBlock>,
    options: &PdfStreamOptions,
    path: impl AsRef<Path>,
) -> Result<PdfSummary, DocsError> {
    let path = path.as_ref();
    let file = tokio::fs::File::create(path).await?;
    let summary = render_to_sink(WriterSink::new(file), blocks, options).await?;
    info!(path = %path.display(), pages = summary.pages, "PDF written");
    Ok(summary)
}
