use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::lsp::backend::Backend;
use crate::lsp::document::DocumentState;
use crate::validation::{Severity, Validator};

/// Source name attached to every published diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "htmlcheck";

/// Trait for handling hover requests
#[tower_lsp::async_trait]
pub trait HandleHover {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>>;
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    async fn create_document_state(&self, content: String) -> DocumentState;
    async fn publish_diagnostics(&self, uri: Url);
    async fn clear_diagnostics(&self, uri: Url);
}

#[tower_lsp::async_trait]
impl HandleHover for Backend {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let tdpp = params.text_document_position_params;
        let uri = tdpp.text_document.uri;
        let pos = tdpp.position;

        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return Ok(None),
        };

        let line = doc_state.content.lines().nth(pos.line as usize).unwrap_or("");
        let Some(name) = tag_name_at(line, pos.character as usize) else {
            return Ok(None);
        };

        let m = MarkupContent {
            kind: MarkupKind::Markdown,
            value: self.rules.describe(&name),
        };
        Ok(Some(Hover {
            contents: HoverContents::Markup(m),
            range: None,
        }))
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    /// Validate new content and keep the result with it
    async fn create_document_state(&self, content: String) -> DocumentState {
        let report = Validator::new(&self.rules)
            .validate(&content)
            .without_rules(&self.config.ignore);
        DocumentState { content, report }
    }

    async fn publish_diagnostics(&self, uri: Url) {
        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return,
        };

        let diagnostics: Vec<_> = doc_state.report.iter().map(to_lsp_diagnostic).collect();
        drop(docs);

        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }

    async fn clear_diagnostics(&self, uri: Url) {
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}

/// Convert a validation diagnostic; missing positions map to 0
pub fn to_lsp_diagnostic(
    diagnostic: &crate::validation::Diagnostic,
) -> tower_lsp::lsp_types::Diagnostic {
    let severity = match diagnostic.severity() {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };

    let line = diagnostic.line().map_or(0, |l| l.saturating_sub(1)) as u32;
    let start = diagnostic.column().map_or(0, |c| c.saturating_sub(1)) as u32;
    let width = diagnostic
        .extract()
        .and_then(|e| e.lines().next())
        .map_or(1, |first| first.chars().count().max(1)) as u32;

    tower_lsp::lsp_types::Diagnostic::new(
        Range::new(Position::new(line, start), Position::new(line, start + width)),
        Some(severity),
        Some(NumberOrString::String(diagnostic.rule().id().to_string())),
        Some(DIAGNOSTIC_SOURCE.to_string()),
        diagnostic.message().to_string(),
        None,
        None,
    )
}

/// Tag name under the cursor when it sits on `<name` or `</name`
pub fn tag_name_at(line: &str, character: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let is_name = |c: char| c.is_ascii_alphanumeric() || c == '-';

    let mut start = character.min(chars.len());
    while start > 0 && is_name(chars[start - 1]) {
        start -= 1;
    }
    let mut end = character.min(chars.len());
    while end < chars.len() && is_name(chars[end]) {
        end += 1;
    }
    if start >= end || !chars[start].is_ascii_alphabetic() {
        return None;
    }

    let opens_tag = match start {
        0 => false,
        1 => chars[0] == '<',
        _ => chars[start - 1] == '<' || (chars[start - 1] == '/' && chars[start - 2] == '<'),
    };
    if !opens_tag {
        return None;
    }

    Some(chars[start..end].iter().collect::<String>().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Diagnostic, Rule};

    #[test]
    fn test_tag_name_at_opening_and_closing_tags() {
        let line = r#"  <DIV class="a"></div>"#;
        assert_eq!(tag_name_at(line, 4).as_deref(), Some("div"));
        assert_eq!(tag_name_at(line, 3).as_deref(), Some("div"));
        assert_eq!(tag_name_at(line, 20).as_deref(), Some("div"));
    }

    #[test]
    fn test_tag_name_at_ignores_attributes_and_text() {
        let line = r#"<p class="x">hello</p>"#;
        assert_eq!(tag_name_at(line, 5), None);
        assert_eq!(tag_name_at(line, 15), None);
        assert_eq!(tag_name_at("", 0), None);
    }

    #[test]
    fn test_tag_name_at_custom_element() {
        assert_eq!(tag_name_at("<my-card>", 5).as_deref(), Some("my-card"));
    }

    #[test]
    fn test_lsp_diagnostic_positions() {
        let diagnostic = Diagnostic::new(Rule::UnmatchedClosingTag, "x")
            .with_line(3)
            .with_column(5)
            .with_extract("</div>");
        let lsp = to_lsp_diagnostic(&diagnostic);
        assert_eq!(lsp.range.start, Position::new(2, 4));
        assert_eq!(lsp.range.end, Position::new(2, 10));
        assert_eq!(lsp.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(
            lsp.code,
            Some(NumberOrString::String("unmatched-closing-tag".to_string()))
        );
        assert_eq!(lsp.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    }

    #[test]
    fn test_lsp_diagnostic_without_position() {
        let lsp = to_lsp_diagnostic(&Diagnostic::new(Rule::CharsetMissing, "x"));
        assert_eq!(lsp.range.start, Position::new(0, 0));
        assert_eq!(lsp.severity, Some(DiagnosticSeverity::WARNING));
    }
}
