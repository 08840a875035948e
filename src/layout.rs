//! Selection geometry.
//!
//! Real pixel boxes belong to whatever engine lays the chapter out. The reader
//! only needs a bounding box for the popover, so geometry sits behind
//! [`LayoutProbe`]. [`MonospaceLayout`] is a deterministic estimate: text
//! content flows as one stream of fixed-width cells wrapped at the viewport
//! width, the same chars-per-line approximation used for page estimates.

use crate::dom::{Document, Range, TextAnchor};
use crate::theme::{CONTENT_MARGIN_TOP_PX, CONTENT_PADDING_LEFT_PX, font_scale};
use serde::Serialize;
use ts_rs::TS;

/// Root font size the em scale multiplies.
pub const BASE_FONT_PX: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, TS)]
#[ts(export)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

pub trait LayoutProbe {
    /// Viewport-space bounding box of `range`, if it can be laid out.
    fn bounding_rect(&self, document: &Document, range: &Range) -> Option<Rect>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceLayout {
    pub origin_left: f32,
    pub origin_top: f32,
    pub char_width: f32,
    pub line_height: f32,
    pub chars_per_line: usize,
    pub scroll_top: f32,
}

impl MonospaceLayout {
    pub fn for_viewport(width_px: f32, font_size: i32) -> Self {
        let font_px = BASE_FONT_PX * font_scale(font_size).max(0.1);
        let char_width = font_px * 0.5;
        let usable = (width_px - 2.0 * CONTENT_PADDING_LEFT_PX).max(char_width);
        let chars_per_line = ((usable / char_width).floor() as usize).max(1);
        Self {
            origin_left: CONTENT_PADDING_LEFT_PX,
            origin_top: CONTENT_MARGIN_TOP_PX,
            char_width,
            line_height: font_px * 1.2,
            chars_per_line,
            scroll_top: 0.0,
        }
    }

    pub fn with_scroll(mut self, scroll_top: f32) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    fn cell(&self, offset: usize) -> (usize, usize) {
        (offset / self.chars_per_line, offset % self.chars_per_line)
    }

    fn line_top(&self, line: usize) -> f32 {
        self.origin_top + line as f32 * self.line_height - self.scroll_top
    }
}

impl LayoutProbe for MonospaceLayout {
    fn bounding_rect(&self, document: &Document, range: &Range) -> Option<Rect> {
        let anchor = TextAnchor::from_range(document, range)?;
        let (first_line, first_col) = self.cell(anchor.start);
        if anchor.is_empty() {
            return Some(Rect {
                left: self.origin_left + first_col as f32 * self.char_width,
                top: self.line_top(first_line),
                width: 0.0,
                height: self.line_height,
            });
        }
        // The last selected char decides the last line; `end` itself may wrap.
        let (last_line, last_col) = self.cell(anchor.end - 1);
        let lines = last_line - first_line + 1;
        let (left, width) = if lines == 1 {
            (
                self.origin_left + first_col as f32 * self.char_width,
                (last_col + 1 - first_col) as f32 * self.char_width,
            )
        } else {
            (
                self.origin_left,
                self.chars_per_line as f32 * self.char_width,
            )
        };
        Some(Rect {
            left,
            top: self.line_top(first_line),
            width,
            height: lines as f32 * self.line_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> MonospaceLayout {
        MonospaceLayout {
            origin_left: 20.0,
            origin_top: 80.0,
            char_width: 10.0,
            line_height: 20.0,
            chars_per_line: 10,
            scroll_top: 0.0,
        }
    }

    #[test]
    fn single_line_selection_spans_its_cells() {
        let doc = Document::parse_html("<p>abcdefghijklmnop</p>");
        let range = TextAnchor::new(2, 5).resolve(&doc).expect("range");
        let rect = layout().bounding_rect(&doc, &range).expect("rect");
        assert_eq!(
            rect,
            Rect {
                left: 40.0,
                top: 80.0,
                width: 30.0,
                height: 20.0
            }
        );
    }

    #[test]
    fn wrapped_selection_takes_full_line_width() {
        let doc = Document::parse_html("<p>abcdefghijklmnopqrstuvwxyz</p>");
        let range = TextAnchor::new(8, 13).resolve(&doc).expect("range");
        let rect = layout().bounding_rect(&doc, &range).expect("rect");
        assert_eq!(rect.left, 20.0);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 40.0);
    }

    #[test]
    fn selection_ending_at_line_end_stays_on_one_line() {
        let doc = Document::parse_html("<p>abcdefghijklmnop</p>");
        let range = TextAnchor::new(5, 10).resolve(&doc).expect("range");
        let rect = layout().bounding_rect(&doc, &range).expect("rect");
        assert_eq!(rect.height, 20.0);
        assert_eq!(rect.width, 50.0);
    }

    #[test]
    fn scrolling_moves_the_box_up() {
        let doc = Document::parse_html("<p>abcdefghijklmnop</p>");
        let range = TextAnchor::new(12, 14).resolve(&doc).expect("range");
        let rect = layout()
            .with_scroll(15.0)
            .bounding_rect(&doc, &range)
            .expect("rect");
        assert_eq!(rect.top, 85.0);
    }

    #[test]
    fn viewport_estimate_scales_with_font_size() {
        let small = MonospaceLayout::for_viewport(840.0, 0);
        let large = MonospaceLayout::for_viewport(840.0, 10);
        assert_eq!(small.chars_per_line, 100);
        assert_eq!(large.chars_per_line, 50);
        assert!(large.line_height > small.line_height);
    }
}
