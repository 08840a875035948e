//! DOM-style ranges over the arena document.
//!
//! Extraction follows the DOM Standard "extract a range" steps: partially
//! contained boundary children are cloned and recursed into, fully contained
//! children are moved, and the range collapses to the extraction point.

use super::{Document, DocumentId, NodeId, TextAnchor, char_slice};
use std::cmp::Ordering;
use tracing::warn;

/// `(node, offset)`; offset counts chars in character data, children elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    document: DocumentId,
    start: BoundaryPoint,
    end: BoundaryPoint,
}

impl Range {
    /// Builds a range, swapping the points when `end` precedes `start`.
    pub fn new(document: &Document, start: BoundaryPoint, end: BoundaryPoint) -> Self {
        let (start, end) = match compare_points(document, start, end) {
            Ordering::Greater => (end, start),
            _ => (start, end),
        };
        Self {
            document: document.id(),
            start,
            end,
        }
    }

    pub fn collapsed(document: &Document, point: BoundaryPoint) -> Self {
        Self {
            document: document.id(),
            start: point,
            end: point,
        }
    }

    pub fn select_node_contents(document: &Document, node: NodeId) -> Self {
        Self {
            document: document.id(),
            start: BoundaryPoint::new(node, 0),
            end: BoundaryPoint::new(node, document.node_length(node)),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn start(&self) -> BoundaryPoint {
        self.start
    }

    pub fn end(&self) -> BoundaryPoint {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Whether both points still address live nodes of `document`, in order.
    pub fn is_valid_in(&self, document: &Document) -> bool {
        if self.document != document.id() {
            return false;
        }
        let point_ok = |point: BoundaryPoint| {
            document.contains(point.node)
                && document.is_attached(point.node)
                && point.offset <= document.node_length(point.node)
        };
        point_ok(self.start)
            && point_ok(self.end)
            && compare_points(document, self.start, self.end) != Ordering::Greater
    }

    pub fn text(&self, document: &Document) -> String {
        match TextAnchor::from_range(document, self) {
            Some(anchor) => anchor.slice(&document.text_content(document.root())),
            None => String::new(),
        }
    }

    /// Detach the range's content into orphan nodes, returned in document order.
    pub fn extract_contents(&mut self, document: &mut Document) -> Vec<NodeId> {
        let (fragment, point) = extract(document, self.start, self.end);
        self.start = point;
        self.end = point;
        fragment
    }

    /// Insert `node` at the range start, splitting a text start container.
    pub fn insert_node(&mut self, document: &mut Document, node: NodeId) {
        let start = self.start;
        let (parent, reference) = if document.kind(start.node).is_character_data() {
            let Some(parent) = document.parent(start.node) else {
                warn!(
                    node = start.node.index(),
                    "Range start is a detached character node; skipping insert"
                );
                return;
            };
            if document.is_text(start.node) {
                (parent, Some(document.split_text(start.node, start.offset)))
            } else {
                (parent, Some(start.node))
            }
        } else {
            let reference = document.children(start.node).get(start.offset).copied();
            (start.node, reference)
        };
        document.insert_before(parent, node, reference);
        if self.is_collapsed() {
            let offset = document.index_in_parent(node).map_or(0, |index| index + 1);
            self.end = BoundaryPoint::new(parent, offset);
        }
    }
}

/// Position of boundary point `a` relative to `b`.
pub(crate) fn compare_points(document: &Document, a: BoundaryPoint, b: BoundaryPoint) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    if document.tree_order(a.node, b.node) == Ordering::Greater {
        return compare_points(document, b, a).reverse();
    }
    if document.is_inclusive_ancestor(a.node, b.node) {
        let child = document
            .child_toward(a.node, b.node)
            .and_then(|child| document.index_in_parent(child));
        if let Some(index) = child {
            if index < a.offset {
                return Ordering::Greater;
            }
        }
    }
    Ordering::Less
}

fn extract(
    document: &mut Document,
    start: BoundaryPoint,
    end: BoundaryPoint,
) -> (Vec<NodeId>, BoundaryPoint) {
    let mut fragment = Vec::new();
    if start == end {
        return (fragment, start);
    }

    if start.node == end.node && document.kind(start.node).is_character_data() {
        let data = document.character_data(start.node).unwrap_or_default();
        let extracted = char_slice(data, start.offset, end.offset);
        let clone = document.shallow_clone(start.node);
        document.set_character_data(clone, extracted);
        document.delete_data(start.node, start.offset, end.offset - start.offset);
        fragment.push(clone);
        return (fragment, start);
    }

    let Some(common) = document.common_ancestor(start.node, end.node) else {
        warn!("Range endpoints share no ancestor; nothing extracted");
        return (fragment, start);
    };

    let start_contains_end = document.is_inclusive_ancestor(start.node, end.node);
    let end_contains_start = document.is_inclusive_ancestor(end.node, start.node);
    let first_partial = if start_contains_end {
        None
    } else {
        document.child_toward(common, start.node)
    };
    let last_partial = if end_contains_start {
        None
    } else {
        document.child_toward(common, end.node)
    };

    let children = document.children(common).to_vec();
    let lo = match first_partial {
        Some(child) => document.index_in_parent(child).map_or(0, |index| index + 1),
        None => start.offset,
    };
    let hi = match last_partial {
        Some(child) => document.index_in_parent(child).unwrap_or(children.len()),
        None => end.offset,
    };
    let contained: Vec<NodeId> = if lo < hi {
        children[lo.min(children.len())..hi.min(children.len())].to_vec()
    } else {
        Vec::new()
    };

    let new_point = if start_contains_end {
        start
    } else {
        let mut reference = start.node;
        while let Some(parent) = document.parent(reference) {
            if document.is_inclusive_ancestor(parent, end.node) {
                break;
            }
            reference = parent;
        }
        match (document.parent(reference), document.index_in_parent(reference)) {
            (Some(parent), Some(index)) => BoundaryPoint::new(parent, index + 1),
            _ => start,
        }
    };

    if let Some(first) = first_partial {
        if document.kind(first).is_character_data() {
            let data = document.character_data(first).unwrap_or_default();
            let length = data.chars().count();
            let extracted = char_slice(data, start.offset, length);
            let clone = document.shallow_clone(first);
            document.set_character_data(clone, extracted);
            document.delete_data(first, start.offset, length.saturating_sub(start.offset));
            fragment.push(clone);
        } else {
            let clone = document.shallow_clone(first);
            let sub_end = BoundaryPoint::new(first, document.node_length(first));
            let (inner, _) = extract(document, start, sub_end);
            for node in inner {
                document.append_child(clone, node);
            }
            fragment.push(clone);
        }
    }

    for child in contained {
        document.detach(child);
        fragment.push(child);
    }

    if let Some(last) = last_partial {
        if document.kind(last).is_character_data() {
            let data = document.character_data(last).unwrap_or_default();
            let extracted = char_slice(data, 0, end.offset);
            let clone = document.shallow_clone(last);
            document.set_character_data(clone, extracted);
            document.delete_data(last, 0, end.offset);
            fragment.push(clone);
        } else {
            let clone = document.shallow_clone(last);
            let sub_start = BoundaryPoint::new(last, 0);
            let (inner, _) = extract(document, sub_start, end);
            for node in inner {
                document.append_child(clone, node);
            }
            fragment.push(clone);
        }
    }

    (fragment, new_point)
}
