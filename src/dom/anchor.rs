//! Character-offset anchors into a document's text content.
//!
//! Ranges hold live node ids and die with their document. An anchor only
//! records `[start, end)` char offsets into the concatenated text nodes, so it
//! can be stored, printed, or typed on a command line and resolved later.

use super::{BoundaryPoint, Document, NodeId, Range, char_slice};
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TextAnchor {
    pub start: usize,
    pub end: usize,
}

impl TextAnchor {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn slice(&self, text: &str) -> String {
        char_slice(text, self.start, self.end)
    }

    pub fn from_range(document: &Document, range: &Range) -> Option<Self> {
        if !range.is_valid_in(document) {
            return None;
        }
        Some(Self::new(
            text_offset(document, range.start()),
            text_offset(document, range.end()),
        ))
    }

    /// Resolve against `document`; `None` when the offsets fall outside its text.
    pub fn resolve(&self, document: &Document) -> Option<Range> {
        let runs = text_runs(document);
        let total = runs.last().map(|run| run.base + run.len)?;
        if self.end > total {
            return None;
        }
        let start = runs
            .iter()
            .find(|run| self.start >= run.base && self.start < run.base + run.len)
            .or_else(|| runs.iter().rev().find(|run| run.base + run.len == self.start))
            .map(|run| BoundaryPoint::new(run.node, self.start - run.base))?;
        let end = runs
            .iter()
            .find(|run| self.end > run.base && self.end <= run.base + run.len)
            .or_else(|| runs.iter().find(|run| run.base == self.end))
            .map(|run| BoundaryPoint::new(run.node, self.end - run.base))?;
        Some(Range::new(document, start, end))
    }

    /// Anchor every non-empty match of `pattern` in the document text.
    pub fn find_all(document: &Document, pattern: &Regex) -> Vec<Self> {
        let text = document.text_content(document.root());
        pattern
            .find_iter(&text)
            .filter(|found| !found.is_empty())
            .map(|found| {
                let start = text[..found.start()].chars().count();
                let end = start + found.as_str().chars().count();
                Self::new(start, end)
            })
            .collect()
    }
}

impl std::fmt::Display for TextAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl std::str::FromStr for TextAnchor {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (start, end) = value
            .split_once("..")
            .ok_or_else(|| anyhow::anyhow!("expected START..END, got {value:?}"))?;
        let start = start.trim().parse::<usize>()?;
        let end = end.trim().parse::<usize>()?;
        Ok(Self::new(start, end))
    }
}

struct TextRun {
    node: NodeId,
    base: usize,
    len: usize,
}

fn text_runs(document: &Document) -> Vec<TextRun> {
    let mut base = 0;
    document
        .descendants(document.root())
        .into_iter()
        .filter(|node| document.is_text(*node))
        .map(|node| {
            let len = document.node_length(node);
            let run = TextRun { node, base, len };
            base += len;
            run
        })
        .collect()
}

fn chars_before(document: &Document, target: NodeId) -> usize {
    let mut total = 0;
    for node in document.descendants(document.root()) {
        if node == target {
            break;
        }
        if document.is_text(node) {
            total += document.node_length(node);
        }
    }
    total
}

fn text_offset(document: &Document, point: BoundaryPoint) -> usize {
    if document.is_text(point.node) {
        return chars_before(document, point.node) + point.offset;
    }
    match document.children(point.node).get(point.offset) {
        Some(child) => chars_before(document, *child),
        None => {
            chars_before(document, point.node)
                + document.text_content(point.node).chars().count()
        }
    }
}
