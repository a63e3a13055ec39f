//! The built-in product catalog and demo report served by the `GET` routes
//! and written by the standalone `sample` command.

use std::path::{Path, PathBuf};

use tally_docs::pdf::{self, ContentBlock, Edges, PdfStreamOptions, RowStyle, TableBlock, TextAlign};
use tally_docs::{CellStyle, ColumnSpec, DocsError, Record};
use tracing::info;

pub const PRODUCTS_SHEET: &str = "Products";
pub const PRODUCTS_FILENAME: &str = "products.xlsx";
pub const REPORT_FILENAME: &str = "report.pdf";
pub const REPORT_TITLE: &str = "Here is your PDF Report";

pub fn product_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("ID", "id"),
        ColumnSpec::new("Product Name", "name"),
        ColumnSpec::new("Category", "category"),
        ColumnSpec::new("Price", "price").with_style(CellStyle::default().with_num_format("$#,##0.00")),
        ColumnSpec::new("In Stock", "inStock"),
    ]
}

pub fn product_records() -> Vec<Record> {
    let rows: [(i64, &str, &str, f64, bool); 5] = [
        (1, "Laptop Pro 15\"", "Electronics", 1499.99, true),
        (2, "Wireless Ergonomic Mouse", "Accessories", 75.50, true),
        (3, "Mechanical RGB Keyboard", "Accessories", 120.00, false),
        (4, "27-inch 4K UHD Monitor", "Monitors", 399.00, true),
        (5, "HD Webcam with Ring Light", "Peripherals", 55.25, false),
    ];
    rows.into_iter()
        .map(|(id, name, category, price, in_stock)| {
            Record::new()
                .with("id", id)
                .with("name", name)
                .with("category", category)
                .with("price", price)
                .with("inStock", in_stock)
        })
        .collect()
}

/// Heavy rule under the first row, light grey rules with extra top padding
/// under the rest.
pub fn report_row_style(index: usize) -> RowStyle {
    if index < 1 {
        RowStyle {
            border: Edges::new(0.0, 0.0, 2.0, 0.0),
            border_color: tally_docs::Rgb::BLACK,
            ..RowStyle::default()
        }
    } else {
        RowStyle {
            border: Edges::new(0.0, 0.0, 1.0, 0.0),
            border_color: tally_docs::Rgb::new(0xAAAAAA),
            padding: Edges::new(10.0, 0.0, 5.0, 0.0),
            bold: false,
        }
    }
}

/// Two pages: a title, an intro paragraph and a small table, then a closing
/// line on page two.
pub fn report_blocks() -> Vec<ContentBlock> {
    let table = TableBlock::new(vec![
        vec!["Column 1".into(), "Column 2".into(), "Column 3".into()],
        vec![
            "One value goes here".into(),
            "Another one here".into(),
            "OK?".into(),
        ],
    ])
    .with_row_style(report_row_style);

    vec![
        ContentBlock::heading(REPORT_TITLE, 25.0, TextAlign::Center),
        ContentBlock::spacer(1.0),
        ContentBlock::paragraph(
            "This is a sample PDF file generated on the fly by a Tally server. \
             You can add text, tables, and page breaks to create complex documents.",
            12.0,
            TextAlign::Justify,
        ),
        ContentBlock::spacer(1.0),
        ContentBlock::Table(table),
        ContentBlock::PageBreak,
        ContentBlock::paragraph("This is the second page.", 16.0, TextAlign::Left),
    ]
}

/// Write `products.xlsx` into `dir`, creating the directory if needed.
pub async fn write_sample_workbook(dir: &Path) -> Result<PathBuf, DocsError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(PRODUCTS_FILENAME);
    let model = tally_docs::build(PRODUCTS_SHEET, &product_columns(), &product_records())?;
    tally_docs::serialize_to_file(&model, &path).await?;
    info!(path = %path.display(), rows = model.row_count(), "Sample workbook written");
    Ok(path)
}

/// Write `report.pdf` into `dir`, creating the directory if needed.
pub async fn write_sample_report(dir: &Path) -> Result<PathBuf, DocsError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(REPORT_FILENAME);
    let options = PdfStreamOptions::default().with_title(REPORT_TITLE);
    pdf::save_pdf_to_file(report_blocks(), &options, &path).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};

    #[test]
    fn test_report_row_style_policy() {
        assert_eq!(report_row_style(0).border.bottom, 2.0);
        assert_eq!(report_row_style(0).border.top, 0.0);
        let body = report_row_style(1);
        assert_eq!(body.border.bottom, 1.0);
        assert_eq!(body.padding.top, 10.0);
        assert_eq!(body.border_color.to_string(), "#AAAAAA");
    }

    #[tokio::test]
    async fn test_write_sample_workbook_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("output");
        let path = write_sample_workbook(&dir).await.unwrap();
        assert_eq!(path, dir.join("products.xlsx"));

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Products").unwrap();
        assert_eq!(range.get_size(), (6, 5));
        assert_eq!(
            range.get_value((0, 1)),
            Some(&Data::String("Product Name".into()))
        );
        assert_eq!(range.get_value((2, 3)), Some(&Data::Float(75.5)));
        assert_eq!(range.get_value((3, 4)), Some(&Data::Bool(false)));
    }

    #[tokio::test]
    async fn test_write_sample_report_has_two_pages() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_sample_report(tmp.path()).await.unwrap();
        let doc = lopdf::Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
