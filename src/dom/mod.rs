//! Arena document tree used as the live DOM of a rendered chapter.
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Detached nodes
//! stay in the arena as orphans; they are simply no longer reachable from the
//! root. Every document gets a process-unique [`DocumentId`] so that a
//! [`Range`] taken from one chapter can be recognised as foreign once the
//! chapter has been replaced.

mod anchor;
mod parse;
mod range;
mod serialize;

pub use anchor::TextAnchor;
pub use range::{BoundaryPoint, Range};
pub(crate) use range::compare_points;

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeKind {
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            NodeKind::Element(element) => Some(element.name.as_str()),
            _ => None,
        }
    }

    /// Text and comments carry character data; range offsets into them count chars.
    pub fn is_character_data(&self) -> bool {
        matches!(self, NodeKind::Text(_) | NodeKind::Comment(_))
    }
}

#[derive(Debug, Clone)]
struct NodeSlot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    nodes: Vec<NodeSlot>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let id = DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, AtomicOrdering::Relaxed));
        Self {
            id,
            nodes: vec![NodeSlot {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.kind(node) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Text(_))
    }

    pub fn character_data(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Text(data) | NodeKind::Comment(data) => Some(data.as_str()),
            _ => None,
        }
    }

    /// DOM "length": chars for character data, child count otherwise.
    pub fn node_length(&self, node: NodeId) -> usize {
        match self.character_data(node) {
            Some(data) => data.chars().count(),
            None => self.children(node).len(),
        }
    }

    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_node(NodeKind::Element(ElementData::new(name)))
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Text(data.into()))
    }

    /// Copy of the node without its children, as an orphan.
    pub fn shallow_clone(&mut self, node: NodeId) -> NodeId {
        let kind = self.kind(node).clone();
        self.create_node(kind)
    }

    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Inserts `child` under `parent` before `reference`, or last when `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let position = reference
            .and_then(|reference| siblings.iter().position(|sibling| *sibling == reference))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|child| *child == node)
    }

    /// True when `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Inclusive ancestor chain, root last.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let chain_b = self.ancestors(b);
        self.ancestors(a)
            .into_iter()
            .find(|candidate| chain_b.contains(candidate))
    }

    /// The child of `ancestor` on the path down to `descendant`.
    pub(crate) fn child_toward(&self, ancestor: NodeId, descendant: NodeId) -> Option<NodeId> {
        let mut current = descendant;
        loop {
            let parent = self.parent(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Tree order of two nodes in the same tree; ancestors precede descendants.
    pub fn tree_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.child_path(a);
        let path_b = self.child_path(b);
        path_a.cmp(&path_b)
    }

    fn child_path(&self, node: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            current = self.parent(current).unwrap_or(self.root);
        }
        path.reverse();
        path
    }

    /// Pre-order walk of `node`'s subtree, `node` first.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn find_elements(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| {
                self.kind(*node)
                    .tag_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|node| match self.kind(node) {
                NodeKind::Text(data) => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn set_character_data(&mut self, node: NodeId, value: String) {
        match &mut self.nodes[node.0].kind {
            NodeKind::Text(data) | NodeKind::Comment(data) => *data = value,
            _ => {}
        }
    }

    /// Removes `count` chars at `offset` from a character data node.
    pub(crate) fn delete_data(&mut self, node: NodeId, offset: usize, count: usize) {
        let Some(data) = self.character_data(node) else {
            return;
        };
        let kept: String = data
            .chars()
            .take(offset)
            .chain(data.chars().skip(offset + count))
            .collect();
        self.set_character_data(node, kept);
    }

    /// Splits a text node at `offset`; the tail becomes the next sibling.
    pub(crate) fn split_text(&mut self, node: NodeId, offset: usize) -> NodeId {
        let data = self.character_data(node).unwrap_or_default().to_string();
        let head: String = data.chars().take(offset).collect();
        let tail: String = data.chars().skip(offset).collect();
        self.set_character_data(node, head);
        let tail = self.create_text(tail);
        if let Some(parent) = self.parent(node) {
            let next = self
                .index_in_parent(node)
                .and_then(|index| self.children(parent).get(index + 1).copied());
            self.insert_before(parent, tail, next);
        }
        tail
    }
}

pub(crate) fn char_slice(data: &str, start: usize, end: usize) -> String {
    data.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
