use std::path::Path;

use rust_xlsxwriter::{
    Color, DocProperties, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet,
    XlsxError,
};
use tracing::{error, info};

use crate::error::DocsError;
use crate::schema::{
    BorderStyle, CellStyle, CellValue, ColumnSpec, HorizontalAlign, Record, VerticalAlign,
};
use crate::workbook::{self, WorkbookModel};

/// MIME type of an `.xlsx` workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const DEFAULT_AUTHOR: &str = "Tally";
const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";
const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Widest column Excel accepts, in characters.
const MAX_EXCEL_COLUMN_WIDTH: u32 = 255;

/// Turns a [`WorkbookModel`] into the bytes of a spreadsheet file.
pub trait WorkbookEncoder {
    fn encode(&self, model: &WorkbookModel) -> Result<Vec<u8>, DocsError>;
}

/// [`WorkbookEncoder`] producing Office Open XML (`.xlsx`) via `rust_xlsxwriter`.
///
/// Output is not byte-for-byte reproducible: the encoder stamps the current
/// time into the document properties.
#[derive(Debug, Clone)]
pub struct XlsxEncoder {
    author: String,
}

impl XlsxEncoder {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }
}

impl Default for XlsxEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}

impl WorkbookEncoder for XlsxEncoder {
    fn encode(&self, model: &WorkbookModel) -> Result<Vec<u8>, DocsError> {
        let mut workbook = Workbook::new();
        let properties = DocProperties::new()
            .set_author(&self.author)
            .set_comment("Generated by Tally");
        workbook.set_properties(&properties);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(model.sheet_name())?;

        // Header row, widths
        let header_format = cell_format(model.header_style());
        for (col_idx, column) in model.columns().iter().enumerate() {
            let col = col_num(col_idx)?;
            worksheet.write_string_with_format(0, col, column.header(), &header_format)?;
            worksheet.set_column_width(col, column.width().min(MAX_EXCEL_COLUMN_WIDTH))?;
        }

        // Data rows
        let formats: Vec<ColumnFormats> = model
            .columns()
            .iter()
            .map(|c| ColumnFormats::new(c.style()))
            .collect();
        for (row_idx, row) in model.rows().iter().enumerate() {
            let excel_row = row_num(row_idx + 1)?;
            for (col_idx, value) in row.iter().enumerate() {
                write_cell(
                    worksheet,
                    excel_row,
                    col_num(col_idx)?,
                    value,
                    &formats[col_idx],
                )?;
            }
        }

        let bytes = workbook.save_to_buffer()?;
        Ok(bytes)
    }
}

/// Encode `model` fully in memory.
pub fn serialize_to_buffer(model: &WorkbookModel) -> Result<Vec<u8>, DocsError> {
    XlsxEncoder::default().encode(model).inspect_err(|e| {
        error!(sheet = model.sheet_name(), "Failed to encode workbook: {e}");
    })
}

/// Encode `model` and write it to `path`, replacing any existing file.
///
/// The parent directory must already exist.
pub async fn serialize_to_file(model: &WorkbookModel, path: impl AsRef<Path>) -> Result<(), DocsError> {
    let path = path.as_ref();
    let bytes = serialize_to_buffer(model)?;
    tokio::fs::write(path, &bytes).await.inspect_err(|e| {
        error!("Failed to write workbook to {}: {e}", path.display());
    })?;
    info!("Workbook saved to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Build and encode a workbook on the blocking pool.
///
/// This is the entry point for request handlers: the CPU-bound encode does
/// not hold up other tasks on the runtime.
pub async fn export_spreadsheet(
    columns: Vec<ColumnSpec>,
    data: Vec<Record>,
    sheet_name: String,
) -> Result<Vec<u8>, DocsError> {
    let bytes = tokio::task::spawn_blocking(move || {
        let model = workbook::build(&sheet_name, &columns, &data)?;
        serialize_to_buffer(&model)
    })
    .await??;
    info!("Workbook buffer generated ({} bytes)", bytes.len());
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Cell writing
// ---------------------------------------------------------------------------

/// Formats derived from one column's style.
struct ColumnFormats {
    value: Option<Format>,
    date: Format,
    datetime: Format,
}

impl ColumnFormats {
    fn new(style: Option<&CellStyle>) -> Self {
        let base = style.map(cell_format);
        let has_num_format = style.is_some_and(|s| s.num_format.is_some());
        let with_default = |num_format: &str| {
            let format = base.clone().unwrap_or_else(Format::new);
            if has_num_format {
                format
            } else {
                format.set_num_format(num_format)
            }
        };
        Self {
            date: with_default(DEFAULT_DATE_FORMAT),
            datetime: with_default(DEFAULT_DATETIME_FORMAT),
            value: base,
        }
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &ColumnFormats,
) -> Result<(), XlsxError> {
    match (value, &formats.value) {
        (CellValue::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Bool(b), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Text(s), Some(format)) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        (CellValue::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::Date(d), _) => {
            worksheet.write_datetime_with_format(row, col, d, &formats.date)?;
        }
        (CellValue::DateTime(dt), _) => {
            worksheet.write_datetime_with_format(row, col, dt, &formats.datetime)?;
        }
    }
    Ok(())
}

fn row_num(idx: usize) -> Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(idx: usize) -> Result<u16, XlsxError> {
    u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

// ---------------------------------------------------------------------------
// Style mapping
// ---------------------------------------------------------------------------

fn cell_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(name) = &font.name {
            format = format.set_font_name(name);
        }
        if let Some(size) = font.size {
            format = format.set_font_size(size);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if let Some(color) = font.color {
            format = format.set_font_color(Color::RGB(color.value()));
        }
    }

    if let Some(fill) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill.value()));
    }

    if let Some(alignment) = style.alignment {
        if let Some(horizontal) = alignment.horizontal {
            format = format.set_align(horizontal_align(horizontal));
        }
        if let Some(vertical) = alignment.vertical {
            format = format.set_align(vertical_align(vertical));
        }
    }

    if let Some(border) = style.border {
        format = format
            .set_border_top(border_style(border.top))
            .set_border_right(border_style(border.right))
            .set_border_bottom(border_style(border.bottom))
            .set_border_left(border_style(border.left));
    }

    if let Some(num_format) = &style.num_format {
        format = format.set_num_format(num_format);
    }

    format
}

fn horizontal_align(align: HorizontalAlign) -> FormatAlign {
    match align {
        HorizontalAlign::Left => FormatAlign::Left,
        HorizontalAlign::Center => FormatAlign::Center,
        HorizontalAlign::Right => FormatAlign::Right,
        HorizontalAlign::Justify => FormatAlign::Justify,
        HorizontalAlign::Fill => FormatAlign::Fill,
    }
}

fn vertical_align(align: VerticalAlign) -> FormatAlign {
    match align {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Middle => FormatAlign::VerticalCenter,
        VerticalAlign::Bottom => FormatAlign::Bottom,
    }
}

fn border_style(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx};

    use super::*;
    use crate::schema::ColumnSpec;
    use crate::workbook::build;

    fn read_sheet(bytes: &[u8], sheet: &str) -> Vec<Vec<Data>> {
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        let range = workbook.worksheet_range(sheet).unwrap();
        range.rows().map(|r| r.to_vec()).collect()
    }

    fn product_model() -> WorkbookModel {
        let columns = vec![
            ColumnSpec::new("ID", "id"),
            ColumnSpec::new("Product Name", "name"),
            ColumnSpec::new("Price", "price")
                .with_style(CellStyle::default().with_num_format("$#,##0.00")),
            ColumnSpec::new("In Stock", "inStock"),
        ];
        let data = vec![
            Record::new()
                .with("id", 1)
                .with("name", "Laptop Pro 15\"")
                .with("price", 1499.99)
                .with("inStock", true),
            Record::new()
                .with("id", 2)
                .with("name", "Wireless Ergonomic Mouse")
                .with("price", 75.5)
                .with("inStock", false),
        ];
        build("Products", &columns, &data).unwrap()
    }

    #[test]
    fn test_buffer_is_zip_container() {
        let bytes = serialize_to_buffer(&product_model()).unwrap();
        // XLSX files start with PK (zip format)
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_round_trip_values() {
        let model = product_model();
        let rows = read_sheet(&serialize_to_buffer(&model).unwrap(), "Products");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Data::String("ID".into()));
        assert_eq!(rows[0][3], Data::String("In Stock".into()));
        assert_eq!(rows[1][0], Data::Float(1.0));
        assert_eq!(rows[1][1], Data::String("Laptop Pro 15\"".into()));
        assert_eq!(rows[1][2], Data::Float(1499.99));
        assert_eq!(rows[1][3], Data::Bool(true));
        assert_eq!(rows[2][2], Data::Float(75.5));
        assert_eq!(rows[2][3], Data::Bool(false));
    }

    #[test]
    fn test_round_trip_id_name_scenario() {
        let columns = vec![ColumnSpec::new("ID", "id"), ColumnSpec::new("Name", "name")];
        let data = vec![
            Record::new().with("id", 1).with("name", "A"),
            Record::new().with("id", 2).with("name", "B"),
        ];
        let model = build("Sheet1", &columns, &data).unwrap();
        let rows = read_sheet(&serialize_to_buffer(&model).unwrap(), "Sheet1");

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 2));
        assert_eq!(rows[1][0].to_string(), "1");
        assert_eq!(rows[1][1].to_string(), "A");
        assert_eq!(rows[2][0].to_string(), "2");
        assert_eq!(rows[2][1].to_string(), "B");
    }

    #[test]
    fn test_missing_values_stay_in_place() {
        let columns = vec![
            ColumnSpec::new("A", "a"),
            ColumnSpec::new("B", "b"),
            ColumnSpec::new("C", "c"),
        ];
        let data = vec![
            Record::new().with("a", "left").with("c", "right"),
            Record::new().with("a", "x").with("b", "y").with("c", "z"),
        ];
        let model = build("Gaps", &columns, &data).unwrap();
        let rows = read_sheet(&serialize_to_buffer(&model).unwrap(), "Gaps");

        assert_eq!(rows[1][0], Data::String("left".into()));
        assert_eq!(rows[1][1], Data::Empty);
        assert_eq!(rows[1][2], Data::String("right".into()));
        assert_eq!(rows[2][1], Data::String("y".into()));
    }

    #[test]
    fn test_dates_written_as_date_cells() {
        let columns = vec![ColumnSpec::new("When", "when")];
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let data = vec![Record::new().with("when", date)];
        let model = build("Dates", &columns, &data).unwrap();
        let rows = read_sheet(&serialize_to_buffer(&model).unwrap(), "Dates");

        match &rows[1][0] {
            Data::DateTime(dt) => {
                let decoded = dt.as_datetime().unwrap().date();
                assert_eq!(decoded, date);
            }
            other => panic!("expected a date cell, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_workbook() {
        let columns = vec![ColumnSpec::new("Col1", "a"), ColumnSpec::new("Col2", "b")];
        let model = build("Empty", &columns, &[]).unwrap();
        let rows = read_sheet(&serialize_to_buffer(&model).unwrap(), "Empty");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn test_large_dataset() {
        let columns = vec![ColumnSpec::new("ID", "id"), ColumnSpec::new("Value", "value")];
        let data: Vec<Record> = (0..1000)
            .map(|i| Record::new().with("id", i).with("value", i as f64 * 1.5))
            .collect();
        let model = build("Big", &columns, &data).unwrap();
        let rows = read_sheet(&serialize_to_buffer(&model).unwrap(), "Big");
        assert_eq!(rows.len(), 1001);
        assert_eq!(rows[1000][1], Data::Float(999.0 * 1.5));
    }

    #[tokio::test]
    async fn test_serialize_to_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.xlsx");
        std::fs::write(&path, b"stale").unwrap();

        serialize_to_file(&product_model(), &path).await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
        assert_eq!(read_sheet(&bytes, "Products").len(), 3);
    }

    #[tokio::test]
    async fn test_serialize_to_file_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist").join("out.xlsx");

        let err = serialize_to_file(&product_model(), &path).await.unwrap_err();
        assert!(matches!(err, DocsError::Io(_)));
    }

    #[tokio::test]
    async fn test_export_spreadsheet_validates_schema() {
        let err = export_spreadsheet(Vec::new(), Vec::new(), "Sheet".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsError::Build(_)));
    }

    #[tokio::test]
    async fn test_export_spreadsheet_produces_workbook() {
        let columns = vec![ColumnSpec::new("Name", "name")];
        let data = vec![Record::new().with("name", "Widget")];
        let bytes = export_spreadsheet(columns, data, "Items".into()).await.unwrap();
        let rows = read_sheet(&bytes, "Items");
        assert_eq!(rows[1][0], Data::String("Widget".into()));
    }
}
