//! Live text selection, its published geometry, and the highlight popover.

mod popover;
mod tracker;

pub use popover::{
    HighlightAction, POPOVER_HEIGHT_PX, POPOVER_OFFSET_Y_PX, POPOVER_SHADOW, POPOVER_WIDTH_PX,
    PopoverButton, PopoverOutcome, PopoverView, SelectionPopover,
};
pub use tracker::SelectionTracker;

use crate::dom::Range;
use crate::layout::Rect;
use serde::Serialize;
use ts_rs::TS;

/// The user's current selection. Holds at most one range, like a browser selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    range: Option<Range>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, range: Range) {
        self.range = Some(range);
    }

    pub fn clear(&mut self) {
        self.range = None;
    }

    pub fn range_count(&self) -> usize {
        usize::from(self.range.is_some())
    }

    pub fn range_at(&self, index: usize) -> Option<&Range> {
        if index == 0 { self.range.as_ref() } else { None }
    }

    pub fn is_collapsed(&self) -> bool {
        self.range.as_ref().is_none_or(Range::is_collapsed)
    }

    /// Follow a range that was rewritten by a document mutation.
    pub fn remap(&mut self, from: &Range, to: &Range) {
        if self.range.as_ref() == Some(from) {
            self.range = Some(to.clone());
        }
    }
}

/// Bounding box and collapsed flag of the selection, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SelectionGeometry {
    pub rect: Option<Rect>,
    pub is_collapsed: bool,
}

impl Default for SelectionGeometry {
    fn default() -> Self {
        Self {
            rect: None,
            is_collapsed: true,
        }
    }
}

impl SelectionGeometry {
    pub fn left(&self) -> f32 {
        self.rect.map_or(0.0, |rect| rect.left)
    }

    pub fn top(&self) -> f32 {
        self.rect.map_or(0.0, |rect| rect.top)
    }

    pub fn width(&self) -> f32 {
        self.rect.map_or(0.0, |rect| rect.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, TextAnchor};

    #[test]
    fn empty_selection_counts_as_collapsed() {
        let selection = Selection::new();
        assert!(selection.is_collapsed());
        assert_eq!(selection.range_count(), 0);
        assert!(selection.range_at(0).is_none());
    }

    #[test]
    fn remap_only_follows_the_matching_range() {
        let doc = Document::parse_html("<p>abcdef</p>");
        let first = TextAnchor::new(0, 2).resolve(&doc).expect("range");
        let second = TextAnchor::new(2, 4).resolve(&doc).expect("range");
        let moved = TextAnchor::new(4, 6).resolve(&doc).expect("range");

        let mut selection = Selection::new();
        selection.select(first.clone());
        selection.remap(&second, &moved);
        assert_eq!(selection.range_at(0), Some(&first));
        selection.remap(&first, &moved);
        assert_eq!(selection.range_at(0), Some(&moved));
    }

    #[test]
    fn default_geometry_reads_as_zero() {
        let geometry = SelectionGeometry::default();
        assert!(geometry.is_collapsed);
        assert_eq!(geometry.left(), 0.0);
        assert_eq!(geometry.width(), 0.0);
    }
}
