//! In-memory workbook model: one sheet, a styled header row and data rows.
//!
//! [`build`] is the whole pipeline: validate the schema, lay out the header,
//! append records in input order, then auto-fit every column. Nothing here
//! touches the filesystem; see [`crate::xlsx`] for encoding.

use tracing::debug;

use crate::color::Rgb;
use crate::error::DocsError;
use crate::schema::{
    Alignment, BorderStyle, Borders, CellStyle, CellValue, ColumnSpec, FontStyle, HorizontalAlign,
    Record, VerticalAlign,
};

/// Narrowest width auto-fit will ever assign, in characters.
pub const MIN_COLUMN_WIDTH: u32 = 10;

/// Extra characters added to the widest cell of a column.
const AUTOFIT_PADDING: u32 = 2;

/// Excel's sheet name limit.
const MAX_SHEET_NAME_LEN: usize = 31;

const HEADER_FONT: &str = "Calibri";
const HEADER_FONT_SIZE: f64 = 12.0;
const HEADER_FILL: Rgb = Rgb::new(0x4472C4);

/// The fixed header row style: bold white Calibri 12 on a solid blue fill,
/// centered, with a thin border on every edge.
pub fn header_style() -> CellStyle {
    CellStyle::default()
        .with_font(FontStyle {
            name: Some(HEADER_FONT.to_string()),
            bold: true,
            italic: false,
            size: Some(HEADER_FONT_SIZE),
            color: Some(Rgb::WHITE),
        })
        .with_fill(HEADER_FILL)
        .with_alignment(Alignment {
            horizontal: Some(HorizontalAlign::Center),
            vertical: Some(VerticalAlign::Middle),
        })
        .with_border(Borders::all(BorderStyle::Thin))
}

/// A column after layout: header, key, resolved width and data style.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    header: String,
    key: String,
    width: u32,
    style: Option<CellStyle>,
}

impl Column {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Width in characters. Final once [`WorkbookModel::autofit`] has run.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn style(&self) -> Option<&CellStyle> {
        self.style.as_ref()
    }
}

/// A single-sheet workbook held in memory.
///
/// Every data row has exactly one value per column. Header text cannot be
/// changed after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookModel {
    sheet_name: String,
    columns: Vec<Column>,
    header_style: CellStyle,
    rows: Vec<Vec<CellValue>>,
}

impl WorkbookModel {
    /// Create an empty sheet with a header row derived from `columns`.
    pub fn new(sheet_name: &str, columns: &[ColumnSpec]) -> Result<Self, DocsError> {
        validate_sheet_name(sheet_name)?;
        if columns.is_empty() {
            return Err(DocsError::Build("at least one column is required".into()));
        }

        let columns = columns
            .iter()
            .map(|spec| {
                if spec.width == Some(0) {
                    return Err(DocsError::Build(format!(
                        "column '{}' has a zero width hint",
                        spec.header
                    )));
                }
                Ok(Column {
                    header: spec.header.clone(),
                    key: spec.key.clone(),
                    width: spec.width.unwrap_or(MIN_COLUMN_WIDTH),
                    style: spec.style.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            sheet_name: sheet_name.to_string(),
            columns,
            header_style: header_style(),
            rows: Vec::new(),
        })
    }

    /// Append one row per record, preserving input order.
    ///
    /// Keys missing from a record become empty cells.
    pub fn append_records(&mut self, data: &[Record]) -> Result<(), DocsError> {
        self.rows.reserve(data.len());
        for record in data {
            let row = self
                .columns
                .iter()
                .map(|column| {
                    let value = record.get(&column.key).cloned().unwrap_or_default();
                    if let CellValue::Number(n) = value
                        && !n.is_finite()
                    {
                        return Err(DocsError::Build(format!(
                            "non-finite number in column '{}' at data row {}",
                            column.header,
                            self.rows.len() + 1
                        )));
                    }
                    Ok(value)
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.rows.push(row);
        }
        Ok(())
    }

    /// Recompute every column width from its content.
    ///
    /// Width is `max(10, longest rendered cell + 2)`, counting the header.
    /// Any width hint is overwritten.
    pub fn autofit(&mut self) {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            let longest = self
                .rows
                .iter()
                .map(|row| rendered_len(&row[idx]))
                .chain(std::iter::once(column.header.chars().count()))
                .max()
                .unwrap_or(0);
            let longest = u32::try_from(longest).unwrap_or(u32::MAX);
            column.width = longest.saturating_add(AUTOFIT_PADDING).max(MIN_COLUMN_WIDTH);
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn header_style(&self) -> &CellStyle {
        &self.header_style
    }

    /// Header labels in column order.
    pub fn header(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    /// Data rows, header excluded.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Total rows on the sheet, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rendered text of a cell, zero-based, row 0 being the header.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        if row == 0 {
            return self.columns.get(col).map(|c| c.header.clone());
        }
        self.rows.get(row - 1)?.get(col).map(CellValue::render)
    }
}

/// Build a styled, auto-fitted workbook model from a schema and records.
pub fn build(
    sheet_name: &str,
    columns: &[ColumnSpec],
    data: &[Record],
) -> Result<WorkbookModel, DocsError> {
    let mut model = WorkbookModel::new(sheet_name, columns)?;
    model.append_records(data)?;
    model.autofit();

    debug!(
        sheet = sheet_name,
        rows = model.row_count(),
        columns = model.column_count(),
        "Built workbook model"
    );
    Ok(model)
}

fn rendered_len(value: &CellValue) -> usize {
    match value {
        CellValue::Empty => 0,
        CellValue::Text(s) => s.chars().count(),
        other => other.render().chars().count(),
    }
}

fn validate_sheet_name(name: &str) -> Result<(), DocsError> {
    if name.trim().is_empty() {
        return Err(DocsError::Build("sheet name must not be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(DocsError::Build(format!(
            "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
        return Err(DocsError::Build(format!(
            "sheet name '{name}' contains invalid character '{c}'"
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(DocsError::Build(format!(
            "sheet name '{name}' must not start or end with an apostrophe"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_name_columns() -> Vec<ColumnSpec> {
        vec![ColumnSpec::new("ID", "id"), ColumnSpec::new("Name", "name")]
    }

    #[test]
    fn test_build_id_name_scenario() {
        let data = vec![
            Record::new().with("id", 1).with("name", "A"),
            Record::new().with("id", 2).with("name", "B"),
        ];
        let model = build("Sheet1", &id_name_columns(), &data).unwrap();

        assert_eq!(model.row_count(), 3);
        assert_eq!(model.column_count(), 2);
        assert_eq!(model.cell_text(1, 0).as_deref(), Some("1"));
        assert_eq!(model.cell_text(1, 1).as_deref(), Some("A"));
        assert_eq!(model.cell_text(2, 0).as_deref(), Some("2"));
        assert_eq!(model.cell_text(2, 1).as_deref(), Some("B"));
        assert!(model.columns().iter().all(|c| c.width() >= MIN_COLUMN_WIDTH));
    }

    #[test]
    fn test_build_preserves_row_order() {
        let data: Vec<Record> = (0..50)
            .rev()
            .map(|i| Record::new().with("id", i).with("name", format!("row-{i}")))
            .collect();
        let model = build("Order", &id_name_columns(), &data).unwrap();

        assert_eq!(model.row_count(), 51);
        for (idx, record) in data.iter().enumerate() {
            assert_eq!(model.rows()[idx][0], *record.get("id").unwrap());
            assert_eq!(model.rows()[idx][1], *record.get("name").unwrap());
        }
    }

    #[test]
    fn test_missing_key_yields_empty_cell() {
        let data = vec![
            Record::new().with("name", "only-name"),
            Record::new().with("id", 7),
        ];
        let model = build("Gaps", &id_name_columns(), &data).unwrap();

        assert_eq!(model.rows()[0], vec![CellValue::Empty, "only-name".into()]);
        assert_eq!(model.rows()[1], vec![CellValue::Number(7.0), CellValue::Empty]);
        assert!(model.rows().iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_autofit_uses_longest_cell_plus_padding() {
        let columns = vec![
            ColumnSpec::new("Short", "a"),
            ColumnSpec::new("Description", "b").with_width(40),
        ];
        let data = vec![
            Record::new().with("a", "x").with("b", "a fairly long description text"),
            Record::new().with("a", "yy").with("b", "short"),
        ];
        let model = build("Fit", &columns, &data).unwrap();

        // "Short" is 5 chars, so the minimum wins.
        assert_eq!(model.columns()[0].width(), MIN_COLUMN_WIDTH);
        // 30 chars + 2, overriding the hint of 40.
        assert_eq!(model.columns()[1].width(), 32);
    }

    #[test]
    fn test_width_invariant_holds_for_every_column() {
        let columns = vec![
            ColumnSpec::new("Price", "price"),
            ColumnSpec::new("Flag", "flag"),
            ColumnSpec::new("When", "when"),
        ];
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let data = vec![
            Record::new().with("price", 123456789.125).with("flag", false).with("when", date),
        ];
        let model = build("Widths", &columns, &data).unwrap();

        for (idx, column) in model.columns().iter().enumerate() {
            let longest = (0..model.row_count())
                .filter_map(|r| model.cell_text(r, idx))
                .map(|s| s.chars().count() as u32)
                .max()
                .unwrap();
            assert!(column.width() >= MIN_COLUMN_WIDTH);
            assert!(column.width() >= longest + 2);
        }
    }

    #[test]
    fn test_header_style_is_fixed_policy() {
        let model = build("Styled", &id_name_columns(), &[]).unwrap();
        let style = model.header_style();
        let font = style.font.as_ref().unwrap();

        assert!(font.bold);
        assert_eq!(font.color, Some(Rgb::WHITE));
        assert_eq!(style.fill, Some(Rgb::new(0x4472C4)));
        assert_eq!(style.border, Some(Borders::all(BorderStyle::Thin)));
        assert_eq!(model.header().count(), 2);
    }

    #[test]
    fn test_empty_columns_rejected() {
        let err = build("Sheet1", &[], &[]).unwrap_err();
        assert!(matches!(err, DocsError::Build(_)));
    }

    #[test]
    fn test_invalid_sheet_names_rejected() {
        let columns = id_name_columns();
        for name in ["", "   ", "a/b", "what?", "'quoted'", "this sheet name is far too long to fit"] {
            let err = build(name, &columns, &[]).unwrap_err();
            assert!(matches!(err, DocsError::Build(_)), "accepted {name:?}");
        }
    }

    #[test]
    fn test_zero_width_hint_rejected() {
        let columns = vec![ColumnSpec::new("ID", "id").with_width(0)];
        assert!(matches!(build("S", &columns, &[]), Err(DocsError::Build(_))));
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let data = vec![Record::new().with("id", f64::NAN)];
        let err = build("S", &id_name_columns(), &data).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_duplicate_keys_allowed() {
        let columns = vec![ColumnSpec::new("ID", "id"), ColumnSpec::new("ID again", "id")];
        let data = vec![Record::new().with("id", 3)];
        let model = build("Dupes", &columns, &data).unwrap();
        assert_eq!(model.rows()[0][0], model.rows()[0][1]);
    }
}
