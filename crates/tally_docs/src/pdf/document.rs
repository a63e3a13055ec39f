//! Append-driven PDF builder.
//!
//! Blocks are laid out as they are appended. Whenever a page is complete it
//! is serialized and handed to the sink, so the consumer sees the first page
//! long before the document is finished.

use tracing::debug;

use crate::color::Rgb;
use crate::error::DocsError;
use crate::pdf::block::{ContentBlock, RowStyle, TableBlock};
use crate::pdf::font::Font;
use crate::pdf::layout::{
    ASCENT_FACTOR, LINE_HEIGHT_FACTOR, Line, PageSetup, TextAlign, validate_font_size,
    wrap_text,
};
use crate::pdf::sink::PdfSink;
use crate::pdf::writer::{ObjectWriter, fmt_num, push_string};

/// Font size assumed by `move_down` before any text has been placed.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Returned by [`PdfDocument::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfSummary {
    pub pages: usize,
    pub bytes: u64,
}

/// One table row, measured and styled, ready to draw.
struct RowLayout {
    style: RowStyle,
    font: Font,
    cells: Vec<Vec<Line>>,
    height: f32,
}

/// Content stream of the page currently being filled.
struct Canvas {
    content: Vec<u8>,
    /// Top of the next line box, in PDF user space.
    cursor: f32,
    has_content: bool,
}

impl Canvas {
    fn new(top: f32) -> Self {
        Self {
            content: Vec::new(),
            cursor: top,
            has_content: false,
        }
    }
}

pub struct PdfDocument<S: PdfSink> {
    setup: PageSetup,
    sink: S,
    writer: ObjectWriter,
    canvas: Canvas,
    page_ids: Vec<u32>,
    last_line_height: f32,
    title: Option<String>,
    finished: bool,
}

impl<S: PdfSink> PdfDocument<S> {
    /// Start a document. Nothing reaches the sink until the first page is
    /// complete.
    pub fn new(setup: PageSetup, sink: S) -> Result<Self, DocsError> {
        setup.validate()?;
        let mut writer = ObjectWriter::new();
        writer.write_header();
        Ok(Self {
            setup,
            sink,
            writer,
            canvas: Canvas::new(setup.content_top()),
            page_ids: Vec::new(),
            last_line_height: DEFAULT_FONT_SIZE * LINE_HEIGHT_FACTOR,
            title: None,
            finished: false,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_setup(&self) -> &PageSetup {
        &self.setup
    }

    /// Pages already written to the sink.
    pub fn pages_emitted(&self) -> usize {
        self.page_ids.len()
    }

    pub fn bytes_emitted(&self) -> u64 {
        self.writer.bytes_written()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub async fn append(&mut self, block: ContentBlock) -> Result<(), DocsError> {
        self.ensure_open()?;
        match block {
            ContentBlock::Heading { text, size, align } => {
                self.render_text(&text, Font::Bold, size, align).await
            }
            ContentBlock::Paragraph { text, size, align } => {
                self.render_text(&text, Font::Regular, size, align).await
            }
            ContentBlock::Table(table) => self.render_table(&table).await,
            ContentBlock::Spacer { lines } => self.move_down(lines),
            ContentBlock::PageBreak => self.emit_page().await,
        }
    }

    pub async fn add_heading(
        &mut self,
        text: &str,
        size: f32,
        align: TextAlign,
    ) -> Result<(), DocsError> {
        self.ensure_open()?;
        self.render_text(text, Font::Bold, size, align).await
    }

    pub async fn add_paragraph(
        &mut self,
        text: &str,
        size: f32,
        align: TextAlign,
    ) -> Result<(), DocsError> {
        self.ensure_open()?;
        self.render_text(text, Font::Regular, size, align).await
    }

    /// Render `rows` as a table; `row_style` is called once per row.
    pub async fn add_table<F>(&mut self, rows: Vec<Vec<String>>, row_style: F) -> Result<(), DocsError>
    where
        F: Fn(usize) -> RowStyle + Send + Sync + 'static,
    {
        self.ensure_open()?;
        let table = TableBlock::new(rows).with_row_style(row_style);
        self.render_table(&table).await
    }

    /// Emit the current page, even if empty, and start a new one.
    pub async fn add_page_break(&mut self) -> Result<(), DocsError> {
        self.ensure_open()?;
        self.emit_page().await
    }

    /// Skip `lines` lines of the most recently used font size.
    pub fn move_down(&mut self, lines: f32) -> Result<(), DocsError> {
        self.ensure_open()?;
        if !lines.is_finite() || lines < 0.0 {
            return Err(DocsError::InvalidContent(format!(
                "spacer lines must be a non-negative number, got {lines}"
            )));
        }
        if lines == 0.0 {
            return Ok(());
        }
        let bottom = self.setup.content_bottom();
        self.canvas.cursor = (self.canvas.cursor - lines * self.last_line_height).max(bottom);
        self.canvas.has_content = true;
        Ok(())
    }

    /// Flush the last page, write the document trailer and close the sink.
    pub async fn finish(&mut self) -> Result<PdfSummary, DocsError> {
        self.ensure_open()?;
        self.finished = true;
        // The last page and the trailer go out as one chunk.
        self.close_page();

        let creation_date = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let mut info = vec![("Producer", "Tally"), ("CreationDate", creation_date.as_str())];
        if let Some(title) = &self.title {
            info.push(("Title", title.as_str()));
        }
        self.writer.write_trailer(&self.page_ids, &info);
        self.flush().await?;
        self.sink.close().await?;

        let summary = PdfSummary {
            pages: self.page_ids.len(),
            bytes: self.writer.bytes_written(),
        };
        debug!(pages = summary.pages, bytes = summary.bytes, "PDF finished");
        Ok(summary)
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn ensure_open(&self) -> Result<(), DocsError> {
        if self.finished {
            Err(DocsError::Finished)
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------------

    /// Start a new page when `height` does not fit below the cursor. An empty
    /// page never breaks; oversized content is drawn past the bottom margin.
    async fn reserve(&mut self, height: f32) -> Result<(), DocsError> {
        let fits = self.canvas.cursor - height >= self.setup.content_bottom() - f32::EPSILON;
        if !fits && self.canvas.has_content {
            self.emit_page().await?;
        }
        Ok(())
    }

    async fn emit_page(&mut self) -> Result<(), DocsError> {
        self.close_page();
        self.flush().await
    }

    /// Serialize the current page into the writer without flushing it.
    fn close_page(&mut self) {
        let canvas = std::mem::replace(&mut self.canvas, Canvas::new(self.setup.content_top()));
        let page_id = self.writer.allocate();
        let content_id = self.writer.allocate();
        self.writer.write_stream(content_id, &canvas.content);
        self.writer
            .write_page(page_id, content_id, self.setup.width, self.setup.height);
        self.page_ids.push(page_id);
        debug!(page = self.page_ids.len(), "PDF page complete");
    }

    async fn flush(&mut self) -> Result<(), DocsError> {
        if let Some(chunk) = self.writer.take_chunk() {
            self.sink.write_chunk(chunk).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    async fn render_text(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        align: TextAlign,
    ) -> Result<(), DocsError> {
        validate_font_size(size)?;
        let max_width = self.setup.printable_width();
        let line_height = size * LINE_HEIGHT_FACTOR;
        let left = self.setup.margins.left;

        for line in wrap_text(text, font, size, max_width) {
            self.reserve(line_height).await?;
            let x = match align {
                TextAlign::Left | TextAlign::Justify => left,
                TextAlign::Center => left + (max_width - line.width) / 2.0,
                TextAlign::Right => left + max_width - line.width,
            };
            let spaces = line.text.matches(' ').count();
            let word_spacing = if align == TextAlign::Justify && !line.ends_paragraph && spaces > 0
            {
                (max_width - line.width) / spaces as f32
            } else {
                0.0
            };
            let baseline = self.canvas.cursor - size * ASCENT_FACTOR;
            show_text(
                &mut self.canvas.content,
                font,
                size,
                word_spacing,
                x,
                baseline,
                &line.text,
            );
            self.canvas.cursor -= line_height;
            self.canvas.has_content = true;
        }
        self.last_line_height = line_height;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    async fn render_table(&mut self, table: &TableBlock) -> Result<(), DocsError> {
        let columns = table.column_count();
        if columns == 0 {
            return Ok(());
        }
        validate_font_size(table.font_size)?;

        let size = table.font_size;
        let line_height = size * LINE_HEIGHT_FACTOR;
        let column_width = self.setup.printable_width() / columns as f32;

        // Lay out every row before drawing so a rejected row leaves no
        // partial table behind.
        let mut rows = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let style = table.style_for(index);
            if !style.border.is_valid() || !style.padding.is_valid() {
                return Err(DocsError::InvalidContent(format!(
                    "row {index}: border and padding must be finite and non-negative"
                )));
            }
            let inner_width = column_width - style.padding.left - style.padding.right;
            if inner_width <= 0.0 {
                return Err(DocsError::InvalidContent(format!(
                    "row {index}: horizontal padding leaves no room for cell text"
                )));
            }

            let font = if style.bold { Font::Bold } else { Font::Regular };
            let cells: Vec<Vec<Line>> = (0..columns)
                .map(|c| {
                    let text = row.get(c).map(String::as_str).unwrap_or("");
                    wrap_text(text, font, size, inner_width)
                })
                .collect();
            let max_lines = cells.iter().map(Vec::len).max().unwrap_or(1);
            let height = style.padding.top + max_lines as f32 * line_height + style.padding.bottom;
            rows.push(RowLayout {
                style,
                font,
                cells,
                height,
            });
        }

        for row in &rows {
            self.reserve(row.height).await?;

            let style = &row.style;
            let top = self.canvas.cursor;
            let left = self.setup.margins.left;
            for (c, lines) in row.cells.iter().enumerate() {
                let x = left + c as f32 * column_width;
                for (k, line) in lines.iter().enumerate() {
                    let baseline =
                        top - style.padding.top - size * ASCENT_FACTOR - k as f32 * line_height;
                    show_text(
                        &mut self.canvas.content,
                        row.font,
                        size,
                        0.0,
                        x + style.padding.left,
                        baseline,
                        &line.text,
                    );
                }
                draw_cell_borders(
                    &mut self.canvas.content,
                    style,
                    x,
                    top - row.height,
                    column_width,
                    row.height,
                );
            }

            self.canvas.cursor -= row.height;
            self.canvas.has_content = true;
        }
        self.last_line_height = line_height;
        Ok(())
    }
}

fn show_text(
    out: &mut Vec<u8>,
    font: Font,
    size: f32,
    word_spacing: f32,
    x: f32,
    y: f32,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    out.extend_from_slice(
        format!(
            "BT /{} {} Tf {} Tw {} {} Td ",
            font.resource_name(),
            fmt_num(size),
            fmt_num(word_spacing),
            fmt_num(x),
            fmt_num(y)
        )
        .as_bytes(),
    );
    push_string(out, text);
    out.extend_from_slice(b" Tj ET\n");
}

fn draw_cell_borders(out: &mut Vec<u8>, style: &RowStyle, x: f32, y: f32, w: f32, h: f32) {
    let edges = [
        (style.border.top, (x, y + h), (x + w, y + h)),
        (style.border.right, (x + w, y), (x + w, y + h)),
        (style.border.bottom, (x, y), (x + w, y)),
        (style.border.left, (x, y), (x, y + h)),
    ];
    for (width, (x1, y1), (x2, y2)) in edges {
        if width <= 0.0 {
            continue;
        }
        stroke_line(out, style.border_color, width, x1, y1, x2, y2);
    }
}

fn stroke_line(out: &mut Vec<u8>, color: Rgb, width: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
    let (r, g, b) = color.components();
    out.extend_from_slice(
        format!(
            "{} {} {} RG {} w {} {} m {} {} l S\n",
            fmt_num(r),
            fmt_num(g),
            fmt_num(b),
            fmt_num(width),
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2)
        )
        .as_bytes(),
    );
}
