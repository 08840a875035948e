use crate::book::{BookData, ChapterError};
use crate::config::AppConfig;
use crate::dom::Document;
use crate::highlight::HighlightList;
use crate::layout::MonospaceLayout;
use crate::sanitizer::ChapterSanitizer;
use crate::selection::{Selection, SelectionGeometry, SelectionPopover, SelectionTracker};
use crate::services::Settings;
use tokio::sync::watch;

/// Where the displayed chapter is in its load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterPhase {
    /// No book has been seen yet.
    Idle,
    Loading { epoch: u64 },
    Ready,
    Failed(ChapterError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// The reading view: one chapter, its highlights, and the live selection.
#[derive(Debug)]
pub struct ReaderView {
    pub(super) phase: ChapterPhase,
    pub(super) epoch: u64,
    pub(super) synced: bool,
    pub(super) book: Option<BookData>,
    pub(super) current_chapter: usize,
    pub(super) source_html: Option<String>,
    pub(super) document: Option<Document>,
    pub(super) highlights: HighlightList,
    pub(super) selection: Selection,
    pub(super) tracker: SelectionTracker,
    pub(super) popover: SelectionPopover,
    pub(super) sanitizer: ChapterSanitizer,
    pub(super) settings: Settings,
    pub(super) viewport: Viewport,
    pub(super) scroll_top: f32,
    pub(super) home_path: String,
}

impl ReaderView {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            phase: ChapterPhase::Idle,
            epoch: 0,
            synced: false,
            book: None,
            current_chapter: 0,
            source_html: None,
            document: None,
            highlights: HighlightList::new(),
            selection: Selection::new(),
            tracker: SelectionTracker::new(),
            popover: SelectionPopover::new(config.highlight_actions.clone()),
            sanitizer: ChapterSanitizer,
            settings: config.settings(),
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
            scroll_top: 0.0,
            home_path: config.home_path.clone(),
        }
    }

    pub fn phase(&self) -> &ChapterPhase {
        &self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current_chapter(&self) -> usize {
        self.current_chapter
    }

    pub fn book(&self) -> Option<&BookData> {
        self.book.as_ref()
    }

    /// Chapter markup as fetched, before sanitizing.
    pub fn source_html(&self) -> Option<&str> {
        self.source_html.as_deref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn highlights(&self) -> &HighlightList {
        &self.highlights
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection_geometry(&self) -> SelectionGeometry {
        self.tracker.current()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionGeometry> {
        self.tracker.subscribe()
    }

    pub(super) fn layout(&self) -> MonospaceLayout {
        MonospaceLayout::for_viewport(self.viewport.width, self.settings.font_size)
            .with_scroll(self.scroll_top)
    }

    /// Forget everything tied to the displayed chapter.
    pub(super) fn reset_chapter(&mut self) {
        self.source_html = None;
        self.document = None;
        self.highlights.clear();
        self.selection.clear();
        self.scroll_top = 0.0;
    }
}
