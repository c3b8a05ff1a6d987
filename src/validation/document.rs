//! Document-Level Checker
//!
//! Whole-document requirements: doctype, root element, head, body and
//! character encoding.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, ElementRef};
use crate::validation::diagnostics::{Diagnostic, Rule, ValidationReport};

static DOCTYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!DOCTYPE\s+html>")
        .unwrap_or_else(|e| panic!("invalid built-in doctype pattern: {e}"))
});

const DOCTYPE_PREFIX: &str = "<!doctype html>";

/// Check for an HTML5 doctype and that it opens the document.
///
/// The two rules are independent: a missing doctype reports both.
pub fn check_doctype(markup: &str, report: &mut ValidationReport) {
    if !DOCTYPE_RE.is_match(markup) {
        report.push(
            Diagnostic::new(
                Rule::DoctypeRequired,
                "DOCTYPE declaration is missing or invalid. Use \"<!DOCTYPE html>\" for HTML5.",
            )
            .with_line(1),
        );
    }

    let start = markup.trim_start_matches('\u{feff}').trim_start();
    let opens_document = start
        .get(..DOCTYPE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DOCTYPE_PREFIX));
    if !opens_document {
        report.push(Diagnostic::new(
            Rule::DoctypePosition,
            "DOCTYPE declaration must be at the beginning of the document.",
        ));
    }
}

/// The document element must be `<html>`, ideally with a `lang` attribute
pub fn check_root(doc: &Document, report: &mut ValidationReport) {
    let Some(html) = doc.document_element().filter(|el| el.tag_name() == "html") else {
        report.push(Diagnostic::new(
            Rule::RootElement,
            "Root element <html> is required.",
        ));
        return;
    };

    if !html.has_attr("lang") {
        report.push(Diagnostic::new(
            Rule::HtmlLang,
            "<html> element must have \"lang\" attribute (e.g. lang=\"en\").",
        ));
    }
}

/// `<head>` must exist and carry a non-empty `<title>` and a charset
pub fn check_head(doc: &Document, report: &mut ValidationReport) {
    let Some(head) = doc.find_by_tag("head") else {
        report.push(Diagnostic::new(Rule::HeadRequired, "<head> element is missing."));
        return;
    };

    match head.find_descendant(|el| el.tag_name() == "title") {
        None => report.push(Diagnostic::new(
            Rule::TitleRequired,
            "<head> must contain <title> element.",
        )),
        Some(title) if title.text_content().trim().is_empty() => report.push(Diagnostic::new(
            Rule::TitleEmpty,
            "<title> element cannot be empty.",
        )),
        Some(_) => {}
    }

    if head.find_descendant(is_meta_charset).is_none() {
        report.push(Diagnostic::new(
            Rule::CharsetRecommended,
            "<head> must contain character encoding (e.g. <meta charset=\"UTF-8\">).",
        ));
    }
}

pub fn check_body(doc: &Document, report: &mut ValidationReport) {
    if doc.find_by_tag("body").is_none() {
        report.push(Diagnostic::new(Rule::BodyRequired, "<body> element is missing."));
    }
}

/// Some encoding declaration must appear anywhere in the document
pub fn check_charset(doc: &Document, report: &mut ValidationReport) {
    let declared = doc
        .find_element(doc.root(), |el| is_meta_charset(el) || is_content_type_meta(el))
        .is_some();
    if !declared {
        report.push(Diagnostic::new(
            Rule::CharsetMissing,
            "Character encoding (charset) is not specified.",
        ));
    }
}

fn is_meta_charset(el: &ElementRef<'_>) -> bool {
    el.tag_name() == "meta" && el.has_attr("charset")
}

fn is_content_type_meta(el: &ElementRef<'_>) -> bool {
    el.tag_name() == "meta"
        && el
            .attr("http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("content-type"))
}
