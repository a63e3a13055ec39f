//! Error types for document generation.

/// Errors produced while building, encoding or streaming a document.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// The column schema or sheet definition is invalid.
    #[error("Invalid workbook definition: {0}")]
    Build(String),

    /// The spreadsheet encoder rejected the model.
    #[error("Spreadsheet encoding failed: {0}")]
    Encoding(#[from] rust_xlsxwriter::XlsxError),

    /// A filesystem read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The downstream consumer went away or refused a chunk.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A PDF content block carries unusable parameters.
    #[error("Invalid content block: {0}")]
    InvalidContent(String),

    /// Content was appended to a document after `finish()`.
    #[error("PDF document already finished")]
    Finished,

    /// A blocking encoder task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DocsError {
    /// Whether the error was caused by the caller's input rather than the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Build(_) | Self::InvalidContent(_))
    }
}
