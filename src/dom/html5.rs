//! HTML5 tree construction
//!
//! Builds a [`Document`] with html5ever's error-tolerant tree builder. The
//! resulting tree is what a browser would see: misnested markup is already
//! repaired, which is why tag balance is verified on the raw text instead.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{Attribute, Document, ElementData, NodeId, NodeKind};

/// The tree could not be produced at all
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Unparseable(String),
}

/// Anything that can turn markup text into a [`Document`]
pub trait DocumentParser {
    fn parse(&self, markup: &str) -> Result<Document, ParseError>;
}

/// The default parser backed by html5ever
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Parser;

impl DocumentParser for Html5Parser {
    fn parse(&self, markup: &str) -> Result<Document, ParseError> {
        let dom = parse_document(RcDom::default(), parse_opts())
            .from_utf8()
            .read_from(&mut markup.as_bytes())?;
        Ok(convert(&dom.document))
    }
}

/// Scripting disabled, so `<noscript>` content is parsed as markup
fn parse_opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

impl<F> DocumentParser for F
where
    F: Fn(&str) -> Result<Document, ParseError>,
{
    fn parse(&self, markup: &str) -> Result<Document, ParseError> {
        self(markup)
    }
}

/// Copy an RcDom tree into the arena, iteratively so deep nesting is safe
fn convert(document: &Handle) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<(Handle, NodeId)> = document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), doc.root()))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let kind = match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let local: &str = &name.local;
                NodeKind::Element(ElementData {
                    name: local.to_ascii_lowercase(),
                    attributes: attrs
                        .borrow()
                        .iter()
                        .map(|attr| Attribute::new(&attr.name.local, &attr.value))
                        .collect(),
                })
            }
            NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
            NodeData::Comment { contents } => NodeKind::Comment(contents.to_string()),
            // Doctype and processing instructions are not part of the element tree
            _ => continue,
        };

        let id = doc.push(parent, kind);
        let children = handle.children.borrow();
        stack.extend(children.iter().rev().map(|child| (child.clone(), id)));
    }

    doc
}
