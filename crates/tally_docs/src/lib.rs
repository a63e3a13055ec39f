//! Document generation: spreadsheet workbooks and streamed PDF reports.

pub mod color;
pub mod error;
pub mod pdf;
pub mod schema;
pub mod workbook;
pub mod xlsx;

pub use color::Rgb;
pub use error::DocsError;
pub use schema::{
    Alignment, BorderStyle, Borders, CellStyle, CellValue, ColumnSpec, FontStyle,
    HorizontalAlign, Record, VerticalAlign,
};
pub use workbook::{WorkbookModel, build};
pub use xlsx::{
    WorkbookEncoder, XLSX_CONTENT_TYPE, XlsxEncoder, export_spreadsheet, serialize_to_buffer,
    serialize_to_file,
};
