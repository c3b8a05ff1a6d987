//! Document Tree
//!
//! A read-mostly arena tree of the parsed document. Nodes refer to their
//! parent by index, so traversal never owns anything. Trees are produced by a
//! [`DocumentParser`] or assembled by hand with the `append_*` methods.

pub mod html5;
pub mod serialize;

pub use html5::{DocumentParser, Html5Parser, ParseError};

use crate::validation::diagnostics::MAX_EXTRACT_CHARS;

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A name/value attribute pair; names are stored lowercase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node itself
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element under `parent`; the name is lowercased
    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let data = ElementData {
            name: name.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(name, value)| Attribute::new(name, value))
                .collect(),
        };
        self.push(parent, NodeKind::Element(data))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Comment(text.to_string()))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All child nodes in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element view of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        match self.kind(id) {
            NodeKind::Element(data) => Some(ElementRef { doc: self, id, data }),
            _ => None,
        }
    }

    /// First element child of the document node
    pub fn document_element(&self) -> Option<ElementRef<'_>> {
        self.children(self.root())
            .iter()
            .find_map(|&id| self.element(id))
    }

    /// Node ids of all descendants of `scope` in pre-order, `scope` excluded
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Every element in document order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.descendants(self.root())
            .into_iter()
            .filter_map(move |id| self.element(id))
    }

    /// First element in document order under `scope` matching `predicate`
    pub fn find_element<F>(&self, scope: NodeId, predicate: F) -> Option<ElementRef<'_>>
    where
        F: Fn(&ElementRef<'_>) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .filter_map(|id| self.element(id))
            .find(|el| predicate(el))
    }

    /// First element with the given (lowercase) tag name anywhere in the tree
    pub fn find_by_tag(&self, name: &str) -> Option<ElementRef<'_>> {
        self.find_element(self.root(), |el| el.tag_name() == name)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let NodeKind::Text(own) = self.kind(id) {
            text.push_str(own);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(t) = self.kind(node) {
                text.push_str(t);
            }
        }
        text
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Borrowed view of one element node
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Lowercase tag name
    pub fn tag_name(&self) -> &'a str {
        &self.data.name
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        &self.data.attributes
    }

    /// Value of an attribute, looked up case-insensitively
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data
            .attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Parent element; `None` for the root element
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.doc.parent(self.id).and_then(|p| self.doc.element(p))
    }

    /// Element children in document order
    pub fn children(self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id).iter().filter_map(move |&c| doc.element(c))
    }

    /// Whether the element has any child node, text and comments included
    pub fn has_child_nodes(&self) -> bool {
        !self.doc.children(self.id).is_empty()
    }

    pub fn text_content(&self) -> String {
        self.doc.text_content(self.id)
    }

    /// First descendant element matching `predicate`
    pub fn find_descendant<F>(&self, predicate: F) -> Option<ElementRef<'a>>
    where
        F: Fn(&ElementRef<'_>) -> bool,
    {
        self.doc.find_element(self.id, predicate)
    }

    /// Full serialized markup of this element
    pub fn outer_html(&self) -> String {
        serialize::outer_html(self.doc, self.id)
    }

    /// Serialized markup truncated for diagnostics
    pub fn fragment(&self) -> String {
        serialize::fragment(self.doc, self.id, MAX_EXTRACT_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        let html = doc.append_element(doc.root(), "HTML", &[("Lang", "en")]);
        let head = doc.append_element(html, "head", &[]);
        let title = doc.append_element(head, "title", &[]);
        doc.append_text(title, "Hello");
        let body = doc.append_element(html, "body", &[]);
        let p = doc.append_element(body, "p", &[("id", "first")]);
        doc.append_text(p, "one ");
        let b = doc.append_element(p, "b", &[]);
        doc.append_text(b, "two");
        doc
    }

    #[test]
    fn test_document_element_and_names() {
        let doc = sample();
        let html = doc.document_element().unwrap();
        assert_eq!(html.tag_name(), "html");
        assert_eq!(html.attr("LANG"), Some("en"));
        assert!(html.parent().is_none());
    }

    #[test]
    fn test_elements_in_document_order() {
        let doc = sample();
        let names: Vec<_> = doc.elements().map(|e| e.tag_name()).collect();
        assert_eq!(names, vec!["html", "head", "title", "body", "p", "b"]);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let doc = sample();
        let p = doc.find_by_tag("p").unwrap();
        assert_eq!(p.text_content(), "one two");
    }

    #[test]
    fn test_children_skip_text_nodes() {
        let doc = sample();
        let p = doc.find_by_tag("p").unwrap();
        let children: Vec<_> = p.children().map(|c| c.tag_name()).collect();
        assert_eq!(children, vec!["b"]);
        assert!(p.has_child_nodes());
    }

    #[test]
    fn test_find_descendant_is_scoped() {
        let doc = sample();
        let head = doc.find_by_tag("head").unwrap();
        assert!(head.find_descendant(|e| e.tag_name() == "title").is_some());
        assert!(head.find_descendant(|e| e.tag_name() == "p").is_none());
    }
}
