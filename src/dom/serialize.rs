//! Fragment serialization
//!
//! Renders an element subtree back to markup for diagnostic extracts.

use super::{Document, NodeId, NodeKind};
use crate::validation::diagnostics::truncate_chars;

/// Elements serialized without a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written without escaping
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Serialize `id` and its subtree
pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_subtree(doc, id, usize::MAX, &mut out);
    out
}

/// Serialize at most `max_chars` characters of `id`'s markup
pub fn fragment(doc: &Document, id: NodeId, max_chars: usize) -> String {
    let mut out = String::new();
    // A char is at most four bytes, so this many bytes always covers the budget
    write_subtree(doc, id, max_chars.saturating_mul(4), &mut out);
    truncate_chars(&out, max_chars)
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

fn write_subtree(doc: &Document, id: NodeId, byte_budget: usize, out: &mut String) {
    let mut stack = vec![Step::Open(id)];

    while let Some(step) = stack.pop() {
        if out.len() >= byte_budget {
            return;
        }
        let id = match step {
            Step::Close(id) => {
                if let NodeKind::Element(data) = doc.kind(id) {
                    out.push_str("</");
                    out.push_str(&data.name);
                    out.push('>');
                }
                continue;
            }
            Step::Open(id) => id,
        };

        match doc.kind(id) {
            NodeKind::Document => {
                stack.extend(doc.children(id).iter().rev().map(|&c| Step::Open(c)));
            }
            NodeKind::Text(text) => {
                let raw = doc
                    .parent(id)
                    .and_then(|p| doc.element(p))
                    .is_some_and(|p| RAW_TEXT_TAGS.contains(&p.tag_name()));
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.name);
                for attr in &data.attributes {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');

                // Hand-built trees may give a void element children; show them anyway
                let children = doc.children(id);
                if VOID_TAGS.contains(&data.name.as_str()) && children.is_empty() {
                    continue;
                }
                stack.push(Step::Close(id));
                stack.extend(children.iter().rev().map(|&c| Step::Open(c)));
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_element_with_attributes() {
        let mut doc = Document::new();
        let div = doc.append_element(doc.root(), "div", &[("class", "a \"b\""), ("id", "x")]);
        doc.append_text(div, "1 < 2 & 3");
        assert_eq!(
            outer_html(&doc, div),
            r#"<div class="a &quot;b&quot;" id="x">1 &lt; 2 &amp; 3</div>"#
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.root(), "p", &[]);
        doc.append_element(p, "br", &[]);
        doc.append_element(p, "img", &[("src", "a.png")]);
        assert_eq!(outer_html(&doc, p), r#"<p><br><img src="a.png"></p>"#);
    }

    #[test]
    fn test_script_text_is_raw() {
        let mut doc = Document::new();
        let script = doc.append_element(doc.root(), "script", &[]);
        doc.append_text(script, "if (a < b) {}");
        assert_eq!(outer_html(&doc, script), "<script>if (a < b) {}</script>");
    }

    #[test]
    fn test_fragment_stops_at_budget() {
        let mut doc = Document::new();
        let mut parent = doc.append_element(doc.root(), "div", &[]);
        let outer = parent;
        for _ in 0..10_000 {
            parent = doc.append_element(parent, "span", &[]);
        }
        let extract = fragment(&doc, outer, 200);
        assert_eq!(extract.chars().count(), 200);
        assert!(extract.starts_with("<div><span><span>"));
    }

    #[test]
    fn test_void_element_with_content_is_still_shown() {
        let mut doc = Document::new();
        let br = doc.append_element(doc.root(), "br", &[]);
        doc.append_text(br, "oops");
        assert_eq!(outer_html(&doc, br), "<br>oops</br>");
    }
}
