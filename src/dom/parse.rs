use super::{Document, ElementData, NodeId, NodeKind};
use ego_tree::NodeRef;
use scraper::{Html, Node};
use tracing::debug;

impl Document {
    /// Parse a full HTML document. html5ever's error recovery decides the shape
    /// of malformed input; the result always has a root.
    pub fn parse_html(source: &str) -> Self {
        let html = Html::parse_document(source);
        if !html.errors.is_empty() {
            debug!(
                errors = html.errors.len(),
                "HTML parser recovered from malformed markup"
            );
        }
        let mut document = Document::new();
        let root = document.root();
        for child in html.tree.root().children() {
            import_node(&mut document, root, child);
        }
        document
    }
}

fn import_node(document: &mut Document, parent: NodeId, node: NodeRef<'_, Node>) {
    let kind = match node.value() {
        Node::Element(element) => NodeKind::Element(ElementData {
            name: element.name().to_string(),
            attrs: element
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }),
        Node::Text(text) => NodeKind::Text(String::from(&**text)),
        Node::Comment(comment) => NodeKind::Comment(String::from(&**comment)),
        Node::Doctype(doctype) => NodeKind::Doctype(doctype.name().to_string()),
        Node::Document | Node::Fragment => {
            for child in node.children() {
                import_node(document, parent, child);
            }
            return;
        }
        Node::ProcessingInstruction(_) => return,
    };
    let id = document.create_node(kind);
    document.append_child(parent, id);
    for child in node.children() {
        import_node(document, id, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_keeps_structure_and_attributes() {
        let doc = Document::parse_html(
            r#"<html><body><p class="lead">Hello <em>there</em></p></body></html>"#,
        );
        let paragraphs = doc.find_elements("p");
        assert_eq!(paragraphs.len(), 1);
        let p = paragraphs[0];
        assert_eq!(doc.element(p).and_then(|el| el.attr("class")), Some("lead"));
        assert_eq!(doc.text_content(p), "Hello there");
        assert_eq!(doc.find_elements("body").len(), 1);
    }

    #[test]
    fn parser_synthesizes_root_elements_for_fragments() {
        let doc = Document::parse_html("<p>bare</p>");
        assert_eq!(doc.find_elements("html").len(), 1);
        assert_eq!(doc.find_elements("body").len(), 1);
        assert_eq!(doc.text_content(doc.root()), "bare");
    }
}
