//! Highlight records and the pass that wraps them into the document.
//!
//! Committing only records a highlight. [`HighlightList::apply_pending`] does
//! the tree surgery once per highlight: the range's contents are extracted
//! into a `<span class="highlight ...">` that is inserted where they were.
//! Applied highlights are never wrapped again, so repeated passes leave the
//! markup unchanged.

use crate::dom::{Document, DocumentId, NodeId, Range, TextAnchor, compare_points};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;

pub const HIGHLIGHT_BASE_CLASS: &str = "highlight";
pub const WRAPPER_TAG: &str = "span";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum HighlightState {
    Pending,
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub range: Range,
    pub style_class: String,
    pub state: HighlightState,
}

impl Highlight {
    pub fn wrapper_class(&self) -> String {
        format!("{HIGHLIGHT_BASE_CLASS} {}", self.style_class)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("cannot highlight a collapsed selection")]
    Collapsed,
    #[error("selection belongs to document {found}, not the rendered document {expected}")]
    ForeignDocument {
        expected: DocumentId,
        found: DocumentId,
    },
}

/// A range rewritten by the render pass, so other holders can follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeMove {
    pub from: Range,
    pub to: Range,
}

/// What a frame reports about each highlight.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct HighlightSummary {
    pub style_class: String,
    pub state: HighlightState,
    pub anchor: Option<TextAnchor>,
    pub text: String,
}

/// Append-only highlight sequence for the rendered chapter.
#[derive(Debug, Clone, Default)]
pub struct HighlightList {
    entries: Vec<Highlight>,
}

impl HighlightList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.entries.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.state == HighlightState::Pending)
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a highlight; the document changes on the next [`Self::apply_pending`].
    pub fn commit(
        &mut self,
        document: &Document,
        style_class: &str,
        range: Range,
    ) -> Result<usize, CommitError> {
        if range.is_collapsed() {
            return Err(CommitError::Collapsed);
        }
        if range.document() != document.id() {
            return Err(CommitError::ForeignDocument {
                expected: document.id(),
                found: range.document(),
            });
        }
        self.entries.push(Highlight {
            range,
            style_class: style_class.to_string(),
            state: HighlightState::Pending,
        });
        debug!(
            style_class,
            count = self.entries.len(),
            "Committed highlight"
        );
        Ok(self.entries.len() - 1)
    }

    /// Wrap every pending highlight, last in document order first.
    pub fn apply_pending(&mut self, document: &mut Document) -> Vec<RangeMove> {
        let mut pending = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.state != HighlightState::Pending {
                continue;
            }
            if entry.range.is_valid_in(document) {
                pending.push(index);
            } else {
                warn!(
                    index,
                    style_class = %entry.style_class,
                    "Highlight range no longer fits the document; skipping"
                );
                entry.state = HighlightState::Stale;
            }
        }
        // Later starts first; on a shared start, shorter first.
        pending.sort_by(|a, b| {
            let (a, b) = (&self.entries[*a].range, &self.entries[*b].range);
            compare_points(document, b.start(), a.start())
                .then_with(|| compare_points(document, a.end(), b.end()))
        });

        let mut moves = Vec::with_capacity(pending.len());
        for index in pending {
            let entry = &mut self.entries[index];
            if !entry.range.is_valid_in(document) {
                warn!(
                    index,
                    style_class = %entry.style_class,
                    "Highlight range was invalidated by an earlier wrap; skipping"
                );
                entry.state = HighlightState::Stale;
                continue;
            }
            let from = entry.range.clone();
            let class = entry.wrapper_class();
            let wrapper = wrap(document, &mut entry.range, &class);
            let to = Range::select_node_contents(document, wrapper);
            entry.range = to.clone();
            entry.state = HighlightState::Applied;
            moves.push(RangeMove { from, to });
        }
        if !moves.is_empty() {
            debug!(applied = moves.len(), "Applied pending highlights");
        }
        moves
    }

    pub fn summaries(&self, document: &Document) -> Vec<HighlightSummary> {
        self.entries
            .iter()
            .map(|entry| HighlightSummary {
                style_class: entry.style_class.clone(),
                state: entry.state,
                anchor: TextAnchor::from_range(document, &entry.range),
                text: if entry.range.is_valid_in(document) {
                    entry.range.text(document)
                } else {
                    String::new()
                },
            })
            .collect()
    }
}

fn wrap(document: &mut Document, range: &mut Range, class: &str) -> NodeId {
    let wrapper = document.create_element(WRAPPER_TAG);
    if let Some(element) = document.element_mut(wrapper) {
        element.set_attr("class", class);
    }
    for node in range.extract_contents(document) {
        document.append_child(wrapper, node);
    }
    range.insert_node(document, wrapper);
    wrapper
}
