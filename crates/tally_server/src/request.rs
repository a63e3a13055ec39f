//! JSON bodies accepted by the `POST /export/*` routes.

use serde::Deserialize;
use tally_docs::pdf::{ContentBlock, PageSetup, RowStyle, TableBlock, TextAlign};
use tally_docs::{ColumnSpec, Record};

const DEFAULT_HEADING_SIZE: f32 = 25.0;
const DEFAULT_PARAGRAPH_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XlsxExportRequest {
    pub sheet_name: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub data: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page: Option<PageSetup>,
    pub blocks: Vec<BlockSpec>,
}

/// Declarative form of a [`ContentBlock`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BlockSpec {
    Heading {
        text: String,
        #[serde(default = "default_heading_size")]
        size: f32,
        #[serde(default)]
        align: TextAlign,
    },
    Paragraph {
        text: String,
        #[serde(default = "default_paragraph_size")]
        size: f32,
        #[serde(default)]
        align: TextAlign,
    },
    Spacer {
        #[serde(default = "default_spacer_lines")]
        lines: f32,
    },
    PageBreak,
    Table {
        rows: Vec<Vec<String>>,
        /// Style of the first `header_rows` rows.
        #[serde(default)]
        header_style: Option<RowStyle>,
        #[serde(default)]
        body_style: Option<RowStyle>,
        #[serde(default = "default_header_rows")]
        header_rows: usize,
        #[serde(default)]
        font_size: Option<f32>,
    },
}

fn default_heading_size() -> f32 {
    DEFAULT_HEADING_SIZE
}

fn default_paragraph_size() -> f32 {
    DEFAULT_PARAGRAPH_SIZE
}

fn default_spacer_lines() -> f32 {
    1.0
}

fn default_header_rows() -> usize {
    1
}

impl From<BlockSpec> for ContentBlock {
    fn from(spec: BlockSpec) -> Self {
        match spec {
            BlockSpec::Heading { text, size, align } => ContentBlock::heading(text, size, align),
            BlockSpec::Paragraph { text, size, align } => {
                ContentBlock::paragraph(text, size, align)
            }
            BlockSpec::Spacer { lines } => ContentBlock::spacer(lines),
            BlockSpec::PageBreak => ContentBlock::PageBreak,
            BlockSpec::Table {
                rows,
                header_style,
                body_style,
                header_rows,
                font_size,
            } => {
                let header = header_style.unwrap_or(RowStyle {
                    bold: true,
                    ..RowStyle::default()
                });
                let body = body_style.unwrap_or_default();
                let mut table = TableBlock::new(rows).with_row_style(move |i| {
                    if i < header_rows { header } else { body }
                });
                if let Some(size) = font_size {
                    table = table.with_font_size(size);
                }
                ContentBlock::Table(table)
            }
        }
    }
}

impl PdfExportRequest {
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks.into_iter().map(ContentBlock::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_docs::CellValue;

    #[test]
    fn test_parse_xlsx_request() {
        let req: XlsxExportRequest = serde_json::from_str(
            r#"{
                "sheetName": "People",
                "columns": [
                    {"header": "ID", "key": "id"},
                    {"header": "Name", "key": "name", "width": 20}
                ],
                "data": [{"id": 1, "name": "A"}, {"id": 2}]
            }"#,
        )
        .unwrap();
        assert_eq!(req.sheet_name, "People");
        assert!(req.filename.is_none());
        assert_eq!(req.columns[1].width, Some(20));
        assert_eq!(req.data.len(), 2);
        assert_eq!(req.data[0].get("id"), Some(&CellValue::Number(1.0)));
        assert!(req.data[1].get("name").is_none());
    }

    #[test]
    fn test_parse_pdf_blocks() {
        let req: PdfExportRequest = serde_json::from_str(
            r##"{
                "filename": "out.pdf",
                "blocks": [
                    {"type": "heading", "text": "Title", "align": "center"},
                    {"type": "paragraph", "text": "Body", "size": 14, "align": "justify"},
                    {"type": "spacer"},
                    {"type": "pageBreak"},
                    {"type": "table", "rows": [["a", "b"], ["1", "2"]],
                     "headerStyle": {"border": [0, 0, 2, 0]},
                     "bodyStyle": {"border": [0, 0, 1, 0], "borderColor": "#aaa"}}
                ]
            }"##,
        )
        .unwrap();

        let blocks = req.into_blocks();
        assert_eq!(blocks.len(), 5);
        assert!(matches!(
            &blocks[0],
            ContentBlock::Heading { size, align: TextAlign::Center, .. } if *size == 25.0
        ));
        assert!(matches!(&blocks[2], ContentBlock::Spacer { lines } if *lines == 1.0));
        assert!(matches!(blocks[3], ContentBlock::PageBreak));

        let ContentBlock::Table(table) = &blocks[4] else {
            panic!("expected a table");
        };
        assert_eq!(table.style_for(0).border.bottom, 2.0);
        assert_eq!(table.style_for(1).border.bottom, 1.0);
        assert_eq!(table.style_for(5).border_color.to_string(), "#AAAAAA");
    }

    #[test]
    fn test_table_defaults_to_bold_header() {
        let spec: BlockSpec =
            serde_json::from_str(r#"{"type": "table", "rows": [["h"], ["v"]]}"#).unwrap();
        let ContentBlock::Table(table) = ContentBlock::from(spec) else {
            panic!("expected a table");
        };
        assert!(table.style_for(0).bold);
        assert!(!table.style_for(1).bold);
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let result = serde_json::from_str::<BlockSpec>(r#"{"type": "image", "src": "x.png"}"#);
        assert!(result.is_err());
    }
}
