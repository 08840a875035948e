use super::messages::Message;
use super::state::{ChapterPhase, ReaderView};
use crate::book::{ChapterArchive, ChapterError};
use crate::dom::{Document, Range, TextAnchor};
use crate::selection::PopoverOutcome;
use crate::services::AppStateSnapshot;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Work the reducer asks its driver to perform.
pub enum Effect {
    Navigate(String),
    FetchChapter {
        epoch: u64,
        chapter: usize,
        href: String,
        archive: Arc<dyn ChapterArchive>,
    },
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Navigate(path) => f.debug_tuple("Navigate").field(path).finish(),
            Effect::FetchChapter {
                epoch,
                chapter,
                href,
                ..
            } => f
                .debug_struct("FetchChapter")
                .field("epoch", epoch)
                .field("chapter", chapter)
                .field("href", href)
                .finish_non_exhaustive(),
        }
    }
}

impl ReaderView {
    /// Apply `message`, then run the render pass.
    pub fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::StoreUpdated(snapshot) => self.handle_store_updated(snapshot, &mut effects),
            Message::ChapterFetched {
                epoch,
                chapter,
                result,
            } => self.handle_chapter_fetched(epoch, chapter, result),
            Message::ViewportResized { width, height } => {
                self.handle_viewport_resized(width, height);
            }
            Message::Scrolled { top } => self.handle_scrolled(top),
            Message::SelectionChanged(range) => self.handle_selection_changed(range),
            Message::SelectAnchor(anchor) => self.handle_select_anchor(anchor),
            Message::HighlightAction { action_id } => self.handle_highlight_action(&action_id),
        }

        self.render_pass();
        effects
    }

    pub(super) fn handle_store_updated(
        &mut self,
        snapshot: AppStateSnapshot,
        effects: &mut Vec<Effect>,
    ) {
        if snapshot.settings != self.settings {
            debug!(
                font_size = snapshot.settings.font_size,
                shadow = snapshot.settings.theme.shadow,
                "Reader settings changed"
            );
            self.settings = snapshot.settings;
        }

        let book_changed = match (&self.book, &snapshot.book.data) {
            (Some(current), Some(next)) => !current.same_book(next),
            (None, None) => false,
            _ => true,
        };
        let chapter_changed = snapshot.book.current_chapter != self.current_chapter;
        let first_sync = !self.synced;
        self.synced = true;
        self.current_chapter = snapshot.book.current_chapter;

        let Some(book) = snapshot.book.data else {
            if book_changed || first_sync {
                info!(path = %self.home_path, "No active book; leaving the reader");
                effects.push(Effect::Navigate(self.home_path.clone()));
            }
            self.epoch = self.epoch.wrapping_add(1);
            self.book = None;
            self.reset_chapter();
            self.phase = ChapterPhase::Idle;
            return;
        };

        if book_changed {
            info!(title = %book.title, chapters = book.chapter_count(), "Opened book");
            self.book = Some(book);
        }
        if book_changed || chapter_changed || first_sync {
            self.begin_chapter_load(effects);
        }
    }

    fn begin_chapter_load(&mut self, effects: &mut Vec<Effect>) {
        self.epoch = self.epoch.wrapping_add(1);
        self.reset_chapter();
        let Some(book) = self.book.as_ref() else {
            self.phase = ChapterPhase::Idle;
            return;
        };

        let chapter = self.current_chapter;
        match book.content.chapter_href(chapter) {
            Ok(href) => {
                info!(chapter, epoch = self.epoch, href = %href, "Loading chapter");
                self.phase = ChapterPhase::Loading { epoch: self.epoch };
                effects.push(Effect::FetchChapter {
                    epoch: self.epoch,
                    chapter,
                    href,
                    archive: Arc::clone(&book.archive),
                });
            }
            Err(err) => {
                warn!(chapter, "Cannot resolve chapter: {err}");
                self.phase = ChapterPhase::Failed(err);
            }
        }
    }

    pub(super) fn handle_chapter_fetched(
        &mut self,
        epoch: u64,
        chapter: usize,
        result: Result<String, ChapterError>,
    ) {
        if epoch != self.epoch || self.phase != (ChapterPhase::Loading { epoch }) {
            debug!(
                epoch,
                current = self.epoch,
                chapter,
                phase = ?self.phase,
                "Ignoring stale chapter fetch"
            );
            return;
        }

        match result {
            Ok(html) => {
                let parsed = Document::parse_html(&html);
                let document = self.sanitizer.sanitize(&parsed);
                info!(chapter, bytes = html.len(), "Chapter ready");
                self.source_html = Some(html);
                self.document = Some(document);
                self.phase = ChapterPhase::Ready;
            }
            Err(err) => {
                warn!(chapter, "Chapter failed to load: {err}");
                self.phase = ChapterPhase::Failed(err);
            }
        }
    }

    pub(super) fn handle_viewport_resized(&mut self, width: f32, height: f32) {
        let width = width.max(0.0);
        let height = height.max(0.0);
        if (width, height) != (self.viewport.width, self.viewport.height) {
            debug!(width, height, "Viewport resized");
            self.viewport.width = width;
            self.viewport.height = height;
        }
    }

    pub(super) fn handle_scrolled(&mut self, top: f32) {
        self.scroll_top = top.max(0.0);
    }

    pub(super) fn handle_selection_changed(&mut self, range: Option<Range>) {
        match range {
            Some(range) => self.selection.select(range),
            None => self.selection.clear(),
        }
    }

    pub(super) fn handle_select_anchor(&mut self, anchor: TextAnchor) {
        let resolved = self
            .document
            .as_ref()
            .and_then(|document| anchor.resolve(document));
        match resolved {
            Some(range) => self.selection.select(range),
            None => {
                warn!(%anchor, "Anchor does not fit the rendered chapter");
                self.selection.clear();
            }
        }
    }

    pub(super) fn handle_highlight_action(&mut self, action_id: &str) {
        let Some(document) = self.document.as_ref() else {
            debug!(action_id, "Highlight requested with no chapter rendered");
            return;
        };
        let highlights = &mut self.highlights;
        let mut rejected = None;
        let outcome = self
            .popover
            .invoke(action_id, &self.selection, |style_class, range| {
                if let Err(err) = highlights.commit(document, style_class, range) {
                    rejected = Some(err);
                }
            });
        match (outcome, rejected) {
            (_, Some(err)) => warn!(action_id, "Highlight rejected: {err}"),
            (PopoverOutcome::Committed { style_class }, None) => {
                info!(action_id, style_class = %style_class, "Highlight committed");
            }
            (outcome, None) => debug!(action_id, ?outcome, "Highlight action ignored"),
        }
    }

    /// Wrap pending highlights and republish selection geometry.
    pub(super) fn render_pass(&mut self) {
        if let Some(document) = self.document.as_mut() {
            for moved in self.highlights.apply_pending(document) {
                self.selection.remap(&moved.from, &moved.to);
            }
        }
        let layout = self.layout();
        self.tracker
            .observe(self.document.as_ref(), &self.selection, &layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BookContent, BookData, ManifestItem, MemoryArchive, SpineRef};
    use crate::config::AppConfig;
    use crate::highlight::HighlightState;
    use crate::services::{BookState, Settings};

    fn build_test_book(chapters: &[(&str, &str)]) -> BookData {
        let mut archive = MemoryArchive::new();
        let mut content = BookContent::default();
        for (index, (href, html)) in chapters.iter().enumerate() {
            let id = format!("c{index}");
            content.chapters.push(SpineRef { idref: id.clone() });
            content.items.push(ManifestItem {
                id,
                href: href.to_string(),
            });
            archive = archive.with_file(*href, *html);
        }
        BookData::new("test", content, Arc::new(archive))
    }

    fn snapshot(book: Option<&BookData>, chapter: usize) -> AppStateSnapshot {
        AppStateSnapshot {
            book: BookState {
                data: book.cloned(),
                current_chapter: chapter,
            },
            settings: Settings::default(),
        }
    }

    fn fetch_of(effects: &[Effect]) -> (u64, usize, String) {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::FetchChapter {
                    epoch,
                    chapter,
                    href,
                    ..
                } => Some((*epoch, *chapter, href.clone())),
                Effect::Navigate(_) => None,
            })
            .expect("fetch effect")
    }

    fn ready_view(html: &str) -> ReaderView {
        let book = build_test_book(&[("c0.xhtml", html)]);
        let mut view = ReaderView::new(&AppConfig::default());
        let effects = view.reduce(Message::StoreUpdated(snapshot(Some(&book), 0)));
        let (epoch, chapter, _) = fetch_of(&effects);
        view.reduce(Message::ChapterFetched {
            epoch,
            chapter,
            result: Ok(html.to_string()),
        });
        view
    }

    #[test]
    fn no_book_navigates_home_once() {
        let mut view = ReaderView::new(&AppConfig::default());
        let effects = view.reduce(Message::StoreUpdated(snapshot(None, 0)));
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::Navigate(path) if path == "/"))
        );
        assert_eq!(view.phase(), &ChapterPhase::Idle);

        let effects = view.reduce(Message::StoreUpdated(snapshot(None, 0)));
        assert!(effects.is_empty());
    }

    #[test]
    fn fetch_landing_after_the_book_closes_is_discarded() {
        let book = build_test_book(&[("c0.xhtml", "<p>zero</p>")]);
        let mut view = ReaderView::new(&AppConfig::default());
        let (epoch, chapter, _) = fetch_of(&view.reduce(Message::StoreUpdated(snapshot(Some(&book), 0))));

        let effects = view.reduce(Message::StoreUpdated(AppStateSnapshot::default()));
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::Navigate(path) if path == "/"))
        );
        view.reduce(Message::ChapterFetched {
            epoch,
            chapter,
            result: Ok("<p>zero</p>".to_string()),
        });

        assert_eq!(view.phase(), &ChapterPhase::Idle);
        assert!(view.book().is_none());
        assert!(view.document().is_none());
        assert!(view.frame().html().is_none());
    }

    #[test]
    fn duplicate_fetch_for_a_ready_chapter_is_ignored() {
        let mut view = ready_view("<p>hello world</p>");
        view.reduce(Message::SelectAnchor(TextAnchor::new(0, 5)));
        view.reduce(Message::HighlightAction {
            action_id: "color_1".to_string(),
        });
        let before = view.document().map(Document::to_html);

        let epoch = view.epoch();
        view.reduce(Message::ChapterFetched {
            epoch,
            chapter: 0,
            result: Ok("<p>replaced</p>".to_string()),
        });
        assert_eq!(view.phase(), &ChapterPhase::Ready);
        assert_eq!(view.document().map(Document::to_html), before);
        assert_eq!(view.highlights().len(), 1);
    }

    #[test]
    fn opening_a_book_fetches_the_current_chapter() {
        let book = build_test_book(&[("c0.xhtml", "<p>zero</p>"), ("c1.xhtml", "<p>one</p>")]);
        let mut view = ReaderView::new(&AppConfig::default());
        let effects = view.reduce(Message::StoreUpdated(snapshot(Some(&book), 1)));
        assert_eq!(fetch_of(&effects), (1, 1, "c1.xhtml".to_string()));
        assert_eq!(view.phase(), &ChapterPhase::Loading { epoch: 1 });

        let effects = view.reduce(Message::StoreUpdated(snapshot(Some(&book), 1)));
        assert!(effects.is_empty());
    }

    #[test]
    fn stale_fetch_is_discarded_after_a_chapter_switch() {
        let book = build_test_book(&[("c0.xhtml", "<p>zero</p>"), ("c1.xhtml", "<p>one</p>")]);
        let mut view = ReaderView::new(&AppConfig::default());
        let (first_epoch, _, _) = fetch_of(&view.reduce(Message::StoreUpdated(snapshot(Some(&book), 0))));
        let (second_epoch, _, _) = fetch_of(&view.reduce(Message::StoreUpdated(snapshot(Some(&book), 1))));
        assert_ne!(first_epoch, second_epoch);

        view.reduce(Message::ChapterFetched {
            epoch: second_epoch,
            chapter: 1,
            result: Ok("<p>one</p>".to_string()),
        });
        view.reduce(Message::ChapterFetched {
            epoch: first_epoch,
            chapter: 0,
            result: Ok("<p>zero</p>".to_string()),
        });

        assert_eq!(view.phase(), &ChapterPhase::Ready);
        let text = view
            .document()
            .map(|doc| doc.text_content(doc.root()))
            .expect("document");
        assert_eq!(text, "one");
    }

    #[test]
    fn unresolved_chapter_fails_without_fetching() {
        let mut book = build_test_book(&[("c0.xhtml", "<p>zero</p>")]);
        book.content.items.clear();
        let mut view = ReaderView::new(&AppConfig::default());
        let effects = view.reduce(Message::StoreUpdated(snapshot(Some(&book), 0)));
        assert!(effects.is_empty());
        assert_eq!(
            view.phase(),
            &ChapterPhase::Failed(ChapterError::MissingChapterReference {
                idref: "c0".to_string()
            })
        );
    }

    #[test]
    fn missing_archive_entry_fails_the_chapter() {
        let book = build_test_book(&[("c0.xhtml", "<p>zero</p>")]);
        let mut view = ReaderView::new(&AppConfig::default());
        let (epoch, chapter, href) = fetch_of(&view.reduce(Message::StoreUpdated(snapshot(Some(&book), 0))));
        view.reduce(Message::ChapterFetched {
            epoch,
            chapter,
            result: Err(ChapterError::EntryMissing { href }),
        });
        assert!(matches!(
            view.phase(),
            ChapterPhase::Failed(ChapterError::EntryMissing { .. })
        ));
    }

    #[test]
    fn fetched_markup_is_sanitized() {
        let view = ready_view("<html><body><header>h</header><p>text<img src=\"a.png\"></p></body></html>");
        let document = view.document().expect("document");
        assert!(document.find_elements("img").is_empty());
        assert!(document.find_elements("header").is_empty());
        assert!(document.find_elements("body").is_empty());
        assert_eq!(view.source_html().map(|html| html.contains("<img")), Some(true));
    }

    #[test]
    fn highlight_action_wraps_the_live_selection() {
        let mut view = ready_view("<p>hello world</p>");
        view.reduce(Message::SelectAnchor(TextAnchor::new(6, 11)));
        assert!(!view.selection_geometry().is_collapsed);

        view.reduce(Message::HighlightAction {
            action_id: "color_2".to_string(),
        });
        let document = view.document().expect("document");
        let p = document.find_elements("p")[0];
        assert_eq!(
            document.inner_html(p),
            "hello <span class=\"highlight color-2\">world</span>"
        );
        assert_eq!(
            view.highlights().iter().map(|h| h.state).collect::<Vec<_>>(),
            vec![HighlightState::Applied]
        );
        assert_eq!(
            view.selection().range_at(0).map(|range| range.text(document)),
            Some("world".to_string())
        );
    }

    #[test]
    fn unknown_or_empty_actions_leave_the_document_alone() {
        let mut view = ready_view("<p>hello world</p>");
        let before = view.document().map(Document::to_html);
        view.reduce(Message::HighlightAction {
            action_id: "color_1".to_string(),
        });
        view.reduce(Message::SelectAnchor(TextAnchor::new(0, 5)));
        view.reduce(Message::HighlightAction {
            action_id: "missing".to_string(),
        });
        assert_eq!(view.document().map(Document::to_html), before);
        assert!(view.highlights().is_empty());
    }

    #[test]
    fn later_messages_do_not_rewrap_applied_highlights() {
        let mut view = ready_view("<p>hello world</p>");
        view.reduce(Message::SelectAnchor(TextAnchor::new(0, 5)));
        view.reduce(Message::HighlightAction {
            action_id: "color_1".to_string(),
        });
        let once = view.document().map(Document::to_html);
        for height in [500.0, 600.0, 700.0] {
            view.reduce(Message::ViewportResized {
                width: 800.0,
                height,
            });
        }
        view.reduce(Message::Scrolled { top: 40.0 });
        assert_eq!(view.document().map(Document::to_html), once);
    }

    #[test]
    fn chapter_change_clears_highlights_and_selection() {
        let book = build_test_book(&[("c0.xhtml", "<p>zero</p>"), ("c1.xhtml", "<p>one</p>")]);
        let mut view = ReaderView::new(&AppConfig::default());
        let (epoch, chapter, _) = fetch_of(&view.reduce(Message::StoreUpdated(snapshot(Some(&book), 0))));
        view.reduce(Message::ChapterFetched {
            epoch,
            chapter,
            result: Ok("<p>zero</p>".to_string()),
        });
        view.reduce(Message::SelectAnchor(TextAnchor::new(0, 4)));
        view.reduce(Message::HighlightAction {
            action_id: "color_1".to_string(),
        });
        assert_eq!(view.highlights().len(), 1);

        view.reduce(Message::StoreUpdated(snapshot(Some(&book), 1)));
        assert!(view.highlights().is_empty());
        assert_eq!(view.selection().range_count(), 0);
        assert!(view.document().is_none());
        assert!(view.selection_geometry().is_collapsed);
    }

    #[test]
    fn switching_books_restarts_loading() {
        let first = build_test_book(&[("a.xhtml", "<p>a</p>")]);
        let second = build_test_book(&[("b.xhtml", "<p>b</p>")]);
        let mut view = ReaderView::new(&AppConfig::default());
        view.reduce(Message::StoreUpdated(snapshot(Some(&first), 0)));
        let effects = view.reduce(Message::StoreUpdated(snapshot(Some(&second), 0)));
        assert_eq!(fetch_of(&effects), (2, 0, "b.xhtml".to_string()));
    }
}
