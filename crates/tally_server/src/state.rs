use std::sync::Arc;

use tally_core::ServerConfig;
use tally_docs::pdf::PdfStreamOptions;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Stream options for one PDF response.
    pub fn pdf_options(&self) -> PdfStreamOptions {
        PdfStreamOptions::default().with_capacity(self.config.pdf_stream_capacity)
    }
}
