//! Validation Engine
//!
//! Runs the checking stages in their fixed order over one document and
//! collects everything into a [`ValidationReport`]. A tree that cannot be
//! built at all becomes a single `parse-error` diagnostic; nothing escapes
//! the entry point.

use crate::dom::{Document, DocumentParser, Html5Parser};
use crate::rules::RuleTables;
use crate::validation::diagnostics::{Diagnostic, Rule, ValidationReport};
use crate::validation::{balance, document, structure};

/// Validator bound to one set of rule tables and one parser
#[derive(Debug, Clone)]
pub struct Validator<'r, P = Html5Parser> {
    rules: &'r RuleTables,
    parser: P,
}

impl<'r> Validator<'r, Html5Parser> {
    pub fn new(rules: &'r RuleTables) -> Self {
        Self {
            rules,
            parser: Html5Parser,
        }
    }
}

impl<'r, P: DocumentParser> Validator<'r, P> {
    /// Use a different tree builder, e.g. a stub in tests
    pub fn with_parser(rules: &'r RuleTables, parser: P) -> Self {
        Self { rules, parser }
    }

    pub fn rules(&self) -> &'r RuleTables {
        self.rules
    }

    /// Validate raw markup: text checks, then tree checks on the parsed tree
    pub fn validate(&self, markup: &str) -> ValidationReport {
        let mut report = self.check_text(markup);

        match self.parser.parse(markup) {
            Ok(doc) => self.check_tree(&doc, &mut report),
            Err(e) => {
                log::warn!("Could not build document tree: {}", e);
                report.push(Diagnostic::new(Rule::ParseError, format!("Parse error: {}", e)));
            }
        }

        log::debug!(
            "Validation finished: {} error(s), {} warning(s)",
            report.errors().len(),
            report.warnings().len()
        );
        report
    }

    /// Validate markup against a tree the caller already built from it
    pub fn validate_document(&self, markup: &str, doc: &Document) -> ValidationReport {
        let mut report = self.check_text(markup);
        self.check_tree(doc, &mut report);
        report
    }

    fn check_text(&self, markup: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        document::check_doctype(markup, &mut report);
        balance::verify_tag_balance(markup, self.rules, &mut report);
        log::debug!("Text checks produced {} diagnostic(s)", report.len());
        report
    }

    fn check_tree(&self, doc: &Document, report: &mut ValidationReport) {
        document::check_root(doc, report);
        document::check_head(doc, report);
        document::check_body(doc, report);
        structure::check_elements(doc, self.rules, report);
        document::check_charset(doc, report);
    }
}

/// Validate markup with the built-in HTML5 rules
pub fn validate(markup: &str) -> ValidationReport {
    Validator::new(RuleTables::builtin()).validate(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ParseError;

    const VALID: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Page</title>
</head>
<body>
<p>Hello</p>
</body>
</html>"#;

    #[test]
    fn test_valid_document_is_clean() {
        let report = validate(VALID);
        assert!(report.is_empty(), "unexpected diagnostics: {:?}", report);
        assert!(report.is_valid());
    }

    #[test]
    fn test_parse_failure_becomes_single_diagnostic() {
        let rules = RuleTables::builtin();
        let failing = |_: &str| -> Result<Document, ParseError> {
            Err(ParseError::Unparseable("no tree".into()))
        };
        let report = Validator::with_parser(rules, failing).validate(VALID);

        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].rule(), Rule::ParseError);
        assert_eq!(report.errors()[0].message(), "Parse error: no tree");
    }

    #[test]
    fn test_parse_error_follows_text_diagnostics() {
        let rules = RuleTables::builtin();
        let failing =
            |_: &str| -> Result<Document, ParseError> { Err(ParseError::Unparseable("x".into())) };
        let report = Validator::with_parser(rules, failing).validate("<div>");

        let order: Vec<_> = report.errors().iter().map(|d| d.rule()).collect();
        assert_eq!(
            order,
            vec![Rule::DoctypeRequired, Rule::UnclosedTag, Rule::ParseError]
        );
    }

    #[test]
    fn test_validate_document_uses_given_tree() {
        let mut doc = Document::new();
        doc.append_element(doc.root(), "html", &[("lang", "en")]);
        let report =
            Validator::new(RuleTables::builtin()).validate_document("<!DOCTYPE html>", &doc);

        assert!(report.has_rule(Rule::HeadRequired));
        assert!(report.has_rule(Rule::BodyRequired));
        assert!(report.has_rule(Rule::CharsetMissing));
        assert!(!report.has_rule(Rule::DoctypeRequired));
    }
}
