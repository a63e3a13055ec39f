//! Low-level PDF 1.4 object serialization.
//!
//! Objects are appended to an internal buffer that the document drains into
//! its sink page by page. Byte offsets are tracked across drains so the
//! cross-reference table written at the end stays correct.

use bytes::Bytes;

use crate::pdf::font::{Font, encode_char};

pub(crate) const CATALOG_ID: u32 = 1;
pub(crate) const PAGES_ID: u32 = 2;
pub(crate) const FONT_REGULAR_ID: u32 = 3;
pub(crate) const FONT_BOLD_ID: u32 = 4;
pub(crate) const INFO_ID: u32 = 5;

/// Objects with fixed ids; page objects are numbered after these.
const RESERVED_OBJECTS: u32 = 5;

pub(crate) struct ObjectWriter {
    buffer: Vec<u8>,
    /// Bytes already handed out by `take_chunk`.
    drained: u64,
    /// Offset of object `n` at index `n - 1`; `None` until written.
    offsets: Vec<Option<u64>>,
}

impl ObjectWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            drained: 0,
            offsets: vec![None; RESERVED_OBJECTS as usize],
        }
    }

    fn position(&self) -> u64 {
        self.drained + self.buffer.len() as u64
    }

    /// Total bytes produced so far, drained or not.
    pub fn bytes_written(&self) -> u64 {
        self.position()
    }

    /// Reserve the next object number.
    pub fn allocate(&mut self) -> u32 {
        self.offsets.push(None);
        self.offsets.len() as u32
    }

    /// File header plus the two font dictionaries.
    pub fn write_header(&mut self) {
        // The binary comment marks the file as 8-bit for transfer tools.
        self.buffer.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        for (id, font) in [(FONT_REGULAR_ID, Font::Regular), (FONT_BOLD_ID, Font::Bold)] {
            let body = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            );
            self.write_object(id, body.as_bytes());
        }
    }

    pub fn write_object(&mut self, id: u32, body: &[u8]) {
        self.offsets[(id - 1) as usize] = Some(self.position());
        self.buffer
            .extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buffer.extend_from_slice(body);
        self.buffer.extend_from_slice(b"\nendobj\n");
    }

    pub fn write_stream(&mut self, id: u32, content: &[u8]) {
        let mut body = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(b"\nendstream");
        self.write_object(id, &body);
    }

    pub fn write_page(&mut self, page_id: u32, content_id: u32, width: f32, height: f32) {
        let body = format!(
            "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> \
             /Contents {content_id} 0 R >>",
            fmt_num(width),
            fmt_num(height)
        );
        self.write_object(page_id, body.as_bytes());
    }

    /// Page tree, catalog, info dictionary, xref table and trailer.
    pub fn write_trailer(&mut self, page_ids: &[u32], info: &[(&str, &str)]) {
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        let pages = format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_ids.len()
        );
        self.write_object(PAGES_ID, pages.as_bytes());

        let catalog = format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>");
        self.write_object(CATALOG_ID, catalog.as_bytes());

        let mut info_body = b"<<".to_vec();
        for (key, value) in info {
            info_body.extend_from_slice(format!(" /{key} ").as_bytes());
            push_string(&mut info_body, value);
        }
        info_body.extend_from_slice(b" >>");
        self.write_object(INFO_ID, &info_body);

        let xref_offset = self.position();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset.unwrap_or(0)));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));
        self.buffer.extend_from_slice(xref.as_bytes());
    }

    /// Drain everything written since the last call.
    pub fn take_chunk(&mut self) -> Option<Bytes> {
        if self.buffer.is_empty() {
            return None;
        }
        let chunk = std::mem::take(&mut self.buffer);
        self.drained += chunk.len() as u64;
        Some(Bytes::from(chunk))
    }
}

/// Append `text` as a PDF literal string in WinAnsi encoding.
pub(crate) fn push_string(out: &mut Vec<u8>, text: &str) {
    out.push(b'(');
    for c in text.chars() {
        match encode_char(c) {
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            byte => out.push(byte),
        }
    }
    out.push(b')');
}

/// Format a coordinate with at most two decimals and no trailing zeros.
pub(crate) fn fmt_num(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
