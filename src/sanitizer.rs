//! Pre-render filtering of chapter markup.
//!
//! A [`Transform`] is asked about every node of the parsed tree together with
//! its index among its siblings. It can drop the node, hand back a replacement
//! whose children are processed through the same transform, or fall through to
//! a plain copy. [`render_tree`] drives the walk and builds a fresh document;
//! the parsed input is never touched.

use crate::dom::{Document, ElementData, NodeId, NodeKind};
use tracing::debug;

/// Container tag that coerced root-level elements become.
pub const CONTAINER_TAG: &str = "div";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// Render nothing in this node's place.
    Remove,
    /// Render this node instead; the source node's children are still transformed.
    Replace(NodeKind),
    /// Copy the node as parsed.
    Default,
}

pub trait Transform {
    fn transform(&self, source: &Document, node: NodeId, index: usize) -> TransformOutcome;
}

impl<F> Transform for F
where
    F: Fn(&Document, NodeId, usize) -> TransformOutcome,
{
    fn transform(&self, source: &Document, node: NodeId, index: usize) -> TransformOutcome {
        self(source, node, index)
    }
}

/// The reader's transform: drop images and headers, turn `html`/`body` into divs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterSanitizer;

impl ChapterSanitizer {
    pub fn is_removed(tag: &str) -> bool {
        matches!(tag, "img" | "header")
    }

    pub fn is_coerced(tag: &str) -> bool {
        matches!(tag, "html" | "body")
    }

    pub fn sanitize(&self, source: &Document) -> Document {
        render_tree(source, self)
    }
}

impl Transform for ChapterSanitizer {
    fn transform(&self, source: &Document, node: NodeId, _index: usize) -> TransformOutcome {
        let Some(element) = source.element(node) else {
            return TransformOutcome::Default;
        };
        let tag = element.name.to_ascii_lowercase();
        if Self::is_removed(&tag) {
            return TransformOutcome::Remove;
        }
        if Self::is_coerced(&tag) {
            return TransformOutcome::Replace(NodeKind::Element(ElementData {
                name: CONTAINER_TAG.to_string(),
                attrs: element.attrs.clone(),
            }));
        }
        TransformOutcome::Default
    }
}

pub fn render_tree(source: &Document, transform: &impl Transform) -> Document {
    let mut output = Document::new();
    let root = output.root();
    let mut removed = 0usize;
    for (index, child) in source.children(source.root()).iter().enumerate() {
        render_node(source, *child, index, transform, &mut output, root, &mut removed);
    }
    debug!(removed, "Rendered sanitized chapter tree");
    output
}

fn render_node(
    source: &Document,
    node: NodeId,
    index: usize,
    transform: &impl Transform,
    output: &mut Document,
    parent: NodeId,
    removed: &mut usize,
) {
    let kind = match transform.transform(source, node, index) {
        TransformOutcome::Remove => {
            *removed += 1;
            return;
        }
        TransformOutcome::Replace(kind) => kind,
        TransformOutcome::Default => source.kind(node).clone(),
    };
    let copy = output.create_node(kind);
    output.append_child(parent, copy);
    for (child_index, child) in source.children(node).iter().enumerate() {
        render_node(source, *child, child_index, transform, output, copy, removed);
    }
}
