use super::state::{ChapterPhase, ReaderView};
use crate::highlight::HighlightSummary;
use crate::selection::PopoverView;
use crate::theme::ContentStyle;
use serde::Serialize;
use ts_rs::TS;

/// Everything a shell needs to draw the reader for one state.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "state", rename_all = "kebab-case")]
#[ts(export)]
pub enum ReaderFrame {
    Idle,
    Loading {
        chapter: usize,
    },
    Failed {
        chapter: usize,
        message: String,
    },
    Ready {
        chapter: usize,
        container_style: ContentStyle,
        container_css: String,
        html: String,
        popover: Option<PopoverView>,
        popover_css: Option<String>,
        highlights: Vec<HighlightSummary>,
    },
}

impl ReaderFrame {
    pub fn html(&self) -> Option<&str> {
        match self {
            ReaderFrame::Ready { html, .. } => Some(html),
            _ => None,
        }
    }
}

impl ReaderView {
    pub fn frame(&self) -> ReaderFrame {
        let chapter = self.current_chapter;
        match (&self.phase, &self.document) {
            (ChapterPhase::Idle, _) => ReaderFrame::Idle,
            (ChapterPhase::Loading { .. }, _) => ReaderFrame::Loading { chapter },
            (ChapterPhase::Failed(err), _) => ReaderFrame::Failed {
                chapter,
                message: err.to_string(),
            },
            (ChapterPhase::Ready, None) => ReaderFrame::Loading { chapter },
            (ChapterPhase::Ready, Some(document)) => {
                let theme = &self.settings.theme;
                let container_style =
                    ContentStyle::new(theme, self.settings.font_size, self.viewport.height);
                let popover = self.popover.render(
                    &self.tracker.current(),
                    theme.secondary_background,
                    theme.shadow,
                );
                ReaderFrame::Ready {
                    chapter,
                    container_css: container_style.to_css(),
                    container_style,
                    html: format!("<div>{}</div>", document.to_html()),
                    popover_css: popover.as_ref().map(PopoverView::to_css),
                    popover,
                    highlights: self.highlights.summaries(document),
                }
            }
        }
    }
}
