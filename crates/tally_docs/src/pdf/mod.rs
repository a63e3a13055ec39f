//! Streaming PDF 1.4 generation.
//!
//! [`PdfDocument`] lays out [`ContentBlock`]s page by page and writes every
//! finished page to a [`PdfSink`]. No external PDF library is involved: the
//! file uses the standard Helvetica fonts and uncompressed content streams.

mod block;
mod document;
mod font;
mod layout;
mod sink;
mod stream;
mod writer;

pub use block::{ContentBlock, DEFAULT_TABLE_FONT_SIZE, Edges, RowStyle, RowStyleFn, TableBlock};
pub use document::{PdfDocument, PdfSummary};
pub use font::Font;
pub use layout::{Margins, PageSetup, TextAlign};
pub use sink::{ChannelSink, PdfSink, WriterSink};
pub use stream::{
    DEFAULT_STREAM_CAPACITY, PDF_CONTENT_TYPE, PdfStreamOptions, export_pdf_stream,
    render_to_sink, save_pdf_to_file,
};
