//! Page geometry, alignment and word wrapping.

use serde::{Deserialize, Serialize};

use crate::error::DocsError;
use crate::pdf::font::Font;

/// Line height as a multiple of the font size.
pub(crate) const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Distance from the top of a line box to the baseline, as a multiple of the
/// font size.
pub(crate) const ASCENT_FACTOR: f32 = 0.9;

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Page size and margins, fixed for the lifetime of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageSetup {
    pub const A4_WIDTH: f32 = 595.28;
    pub const A4_HEIGHT: f32 = 841.89;
    pub const LETTER_WIDTH: f32 = 612.0;
    pub const LETTER_HEIGHT: f32 = 792.0;

    /// A4 with 50pt top/bottom and 72pt left/right margins.
    pub const fn a4() -> Self {
        Self {
            width: Self::A4_WIDTH,
            height: Self::A4_HEIGHT,
            margins: Margins::new(50.0, 72.0, 50.0, 72.0),
        }
    }

    pub const fn letter() -> Self {
        Self {
            width: Self::LETTER_WIDTH,
            height: Self::LETTER_HEIGHT,
            margins: Margins::uniform(72.0),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn printable_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn printable_height(&self) -> f32 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// Y coordinate where content starts (PDF origin is bottom-left).
    pub(crate) fn content_top(&self) -> f32 {
        self.height - self.margins.top
    }

    pub(crate) fn content_bottom(&self) -> f32 {
        self.margins.bottom
    }

    pub(crate) fn validate(&self) -> Result<(), DocsError> {
        let values = [
            self.width,
            self.height,
            self.margins.top,
            self.margins.right,
            self.margins.bottom,
            self.margins.left,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(DocsError::InvalidContent(
                "page size and margins must be finite and non-negative".into(),
            ));
        }
        if self.printable_width() <= 0.0 || self.printable_height() <= 0.0 {
            return Err(DocsError::InvalidContent(
                "margins leave no printable area".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// One line produced by [`wrap_text`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line {
    pub text: String,
    pub width: f32,
    /// Last line before a hard break or the end of the text.
    pub ends_paragraph: bool,
}

/// Greedy word wrap of `text` into lines no wider than `max_width`.
///
/// `\n` forces a break; runs of whitespace collapse to one space. A word
/// wider than a whole line is split between characters. Always returns at
/// least one line.
pub(crate) fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<Line> {
    let space = font.char_width(' ', size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_width = font.text_width(word, size);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };
            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                    current_width += space;
                }
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(Line {
                    text: std::mem::take(&mut current),
                    width: current_width,
                    ends_paragraph: false,
                });
                current_width = 0.0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for c in word.chars() {
                let w = font.char_width(c, size);
                if !current.is_empty() && current_width + w > max_width {
                    lines.push(Line {
                        text: std::mem::take(&mut current),
                        width: current_width,
                        ends_paragraph: false,
                    });
                    current_width = 0.0;
                }
                current.push(c);
                current_width += w;
            }
        }

        lines.push(Line {
            text: current,
            width: current_width,
            ends_paragraph: true,
        });
    }

    lines
}

/// Reject font sizes that would produce degenerate layout.
pub(crate) fn validate_font_size(size: f32) -> Result<(), DocsError> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(DocsError::InvalidContent(format!(
            "font size must be a positive number, got {size}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_printable_area() {
        let setup = PageSetup::a4();
        assert!((setup.printable_width() - (595.28 - 144.0)).abs() < 1e-3);
        assert!((setup.printable_height() - (841.89 - 100.0)).abs() < 1e-3);
        assert!(setup.validate().is_ok());
    }

    #[test]
    fn test_margins_consuming_page_rejected() {
        let setup = PageSetup::letter().with_margins(Margins::uniform(400.0));
        assert!(matches!(setup.validate(), Err(DocsError::InvalidContent(_))));
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        let lines = wrap_text("short text", Font::Regular, 12.0, 400.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "short text");
        assert!(lines[0].ends_paragraph);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(10);
        let max_width = 200.0;
        let lines = wrap_text(&text, Font::Regular, 12.0, max_width);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= max_width + 1e-3);
            assert!(!line.text.starts_with(' '));
        }
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.text.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
        assert!(lines.last().unwrap().ends_paragraph);
        assert!(!lines[0].ends_paragraph);
    }

    #[test]
    fn test_wrap_splits_long_word() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, Font::Regular, 12.0, 100.0);
        assert!(lines.len() > 1);
        let total: usize = lines.iter().map(|l| l.text.len()).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_wrap_hard_breaks_and_empty_text() {
        let lines = wrap_text("one\n\nthree", Font::Regular, 12.0, 400.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "");
        assert!(lines.iter().all(|l| l.ends_paragraph));

        assert_eq!(wrap_text("", Font::Bold, 12.0, 400.0).len(), 1);
    }

    #[test]
    fn test_validate_font_size() {
        assert!(validate_font_size(12.0).is_ok());
        assert!(validate_font_size(0.0).is_err());
        assert!(validate_font_size(-3.0).is_err());
        assert!(validate_font_size(f32::NAN).is_err());
    }
}
