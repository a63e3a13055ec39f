//! Column schema, cell values and records.
//!
//! These are plain data types shared by the workbook builder and the HTTP
//! layer. Field names serialize in camelCase so request bodies read like
//! `{ "header": "Price", "key": "price", "style": { "numFormat": "$#,##0.00" } }`.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A scalar cell value.
///
/// In JSON, `null` is empty, strings shaped like `2024-05-01` or
/// `2024-05-01T10:30:00` become dates, any other string stays text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The string a spreadsheet shows for this value by default.
    ///
    /// Used for column auto-fit, so it ignores number formats.
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of input data: a flat mapping from key to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(HashMap<String, CellValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// Declarative description of one output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Display label written in the header row.
    pub header: String,
    /// Lookup key into each [`Record`].
    pub key: String,
    /// Starting width in characters. Auto-fit replaces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Style applied to every data cell of the column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
            width: None,
            style: None,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = Some(style);
        self
    }
}

// ---------------------------------------------------------------------------
// Cell styles
// ---------------------------------------------------------------------------

/// Formatting for a cell: font, solid fill, alignment, borders, number format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Borders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_format: Option<String>,
}

impl CellStyle {
    pub fn with_num_format(mut self, num_format: impl Into<String>) -> Self {
        self.num_format = Some(num_format.into());
        self
    }

    pub fn with_font(mut self, font: FontStyle) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_fill(mut self, fill: Rgb) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_border(mut self, border: Borders) -> Self {
        self.border = Some(border);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub bold: bool,
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    Justify,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Per-edge border styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub top: BorderStyle,
    pub right: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
}

impl Borders {
    pub fn all(style: BorderStyle) -> Self {
        Self {
            top: style,
            right: style,
            bottom: style,
            left: style,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_numbers_like_a_spreadsheet() {
        assert_eq!(CellValue::from(1).render(), "1");
        assert_eq!(CellValue::from(120.0).render(), "120");
        assert_eq!(CellValue::from(75.5).render(), "75.5");
        assert_eq!(CellValue::from(1499.99).render(), "1499.99");
        assert_eq!(CellValue::from(true).render(), "true");
        assert_eq!(CellValue::Empty.render(), "");
    }

    #[test]
    fn test_render_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(CellValue::from(date).render(), "2024-05-01");
        let dt = date.and_hms_opt(9, 15, 0).unwrap();
        assert_eq!(CellValue::from(dt).render(), "2024-05-01 09:15:00");
    }

    #[test]
    fn test_cell_value_from_json() {
        let values: Vec<CellValue> =
            serde_json::from_str(r#"[null, true, 3.5, 7, "2024-05-01", "2024-05-01T10:30:00", "plain"]"#)
                .unwrap();
        assert_eq!(values[0], CellValue::Empty);
        assert_eq!(values[1], CellValue::Bool(true));
        assert_eq!(values[2], CellValue::Number(3.5));
        assert_eq!(values[3], CellValue::Number(7.0));
        assert!(matches!(values[4], CellValue::Date(_)));
        assert!(matches!(values[5], CellValue::DateTime(_)));
        assert_eq!(values[6], CellValue::Text("plain".into()));
    }

    #[test]
    fn test_record_builder_and_lookup() {
        let record = Record::new().with("id", 1).with("name", "A");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("id"), Some(&CellValue::Number(1.0)));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_column_spec_from_json() {
        let column: ColumnSpec = serde_json::from_str(
            r##"{"header": "Price", "key": "price", "style": {"numFormat": "$#,##0.00", "fill": "#FFEEDD"}}"##,
        )
        .unwrap();
        assert_eq!(column.header, "Price");
        assert_eq!(column.width, None);
        let style = column.style.unwrap();
        assert_eq!(style.num_format.as_deref(), Some("$#,##0.00"));
        assert_eq!(style.fill, Some(Rgb::new(0xFFEEDD)));
    }

    #[test]
    fn test_borders_all() {
        let borders = Borders::all(BorderStyle::Thin);
        assert_eq!(borders.left, BorderStyle::Thin);
        assert_eq!(borders.bottom, BorderStyle::Thin);
    }
}
