use crate::book::ChapterError;
use crate::dom::{Range, TextAnchor};
use crate::services::AppStateSnapshot;

#[derive(Debug, Clone)]
pub enum Message {
    /// A new snapshot of the app store.
    StoreUpdated(AppStateSnapshot),
    ChapterFetched {
        epoch: u64,
        chapter: usize,
        result: Result<String, ChapterError>,
    },
    ViewportResized {
        width: f32,
        height: f32,
    },
    Scrolled {
        top: f32,
    },
    SelectionChanged(Option<Range>),
    /// Select by text offsets instead of live nodes.
    SelectAnchor(TextAnchor),
    HighlightAction {
        action_id: String,
    },
}
