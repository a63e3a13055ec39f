//! Content blocks accepted by [`PdfDocument::append`](crate::pdf::PdfDocument::append).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::pdf::layout::TextAlign;

/// Font size used for table cells unless overridden.
pub const DEFAULT_TABLE_FONT_SIZE: f32 = 12.0;

/// A pure mapping from table row index to that row's style.
pub type RowStyleFn = Arc<dyn Fn(usize) -> RowStyle + Send + Sync>;

/// Per-edge measurements in points, ordered top, right, bottom, left.
///
/// Serializes as a four-element array: `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Edges = Edges::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl From<[f32; 4]> for Edges {
    fn from([top, right, bottom, left]: [f32; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

impl From<Edges> for [f32; 4] {
    fn from(e: Edges) -> Self {
        [e.top, e.right, e.bottom, e.left]
    }
}

/// How one table row is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowStyle {
    /// Border line widths per cell edge; zero draws nothing.
    pub border: Edges,
    pub border_color: Rgb,
    pub padding: Edges,
    /// Render the row's text in the bold face.
    pub bold: bool,
}

impl Default for RowStyle {
    fn default() -> Self {
        Self {
            border: Edges::all(1.0),
            border_color: Rgb::BLACK,
            padding: Edges::all(4.0),
            bold: false,
        }
    }
}

/// A table: rows of cell text plus a row style function.
///
/// Columns share the printable width evenly; the column count is the
/// length of the longest row.
#[derive(Clone)]
pub struct TableBlock {
    pub rows: Vec<Vec<String>>,
    pub font_size: f32,
    row_style: RowStyleFn,
}

impl TableBlock {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            font_size: DEFAULT_TABLE_FONT_SIZE,
            row_style: Arc::new(|_| RowStyle::default()),
        }
    }

    pub fn with_row_style<F>(mut self, style: F) -> Self
    where
        F: Fn(usize) -> RowStyle + Send + Sync + 'static,
    {
        self.row_style = Arc::new(style);
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn style_for(&self, row: usize) -> RowStyle {
        (self.row_style)(row)
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl fmt::Debug for TableBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBlock")
            .field("rows", &self.rows)
            .field("font_size", &self.font_size)
            .finish_non_exhaustive()
    }
}

/// One renderable unit of a PDF document.
#[derive(Debug, Clone)]
pub enum ContentBlock {
    /// Bold text.
    Heading {
        text: String,
        size: f32,
        align: TextAlign,
    },
    Paragraph {
        text: String,
        size: f32,
        align: TextAlign,
    },
    Table(TableBlock),
    /// Vertical space measured in lines of the last used font size.
    Spacer { lines: f32 },
    /// Start a new page unconditionally.
    PageBreak,
}

impl ContentBlock {
    pub fn heading(text: impl Into<String>, size: f32, align: TextAlign) -> Self {
        Self::Heading {
            text: text.into(),
            size,
            align,
        }
    }

    pub fn paragraph(text: impl Into<String>, size: f32, align: TextAlign) -> Self {
        Self::Paragraph {
            text: text.into(),
            size,
            align,
        }
    }

    pub fn spacer(lines: f32) -> Self {
        Self::Spacer { lines }
    }
}
