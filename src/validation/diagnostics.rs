//! Diagnostics
//!
//! Rule identifiers, severities and the error/warning aggregator shared by
//! every checking stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// The closed set of rule identifiers a diagnostic can carry.
///
/// Each rule has exactly one severity, see [`Rule::severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    ParseError,
    DoctypeRequired,
    DoctypePosition,
    UnmatchedClosingTag,
    UnclosedTag,
    RootElement,
    HtmlLang,
    HeadRequired,
    TitleRequired,
    TitleEmpty,
    CharsetRecommended,
    BodyRequired,
    InvalidElement,
    DeprecatedElement,
    ImgSrcRequired,
    ImgAltRequired,
    AreaAltRequired,
    InputTypeRecommended,
    InvalidParent,
    ForbiddenChild,
    VoidElementContent,
    DuplicateId,
    EmptyAttribute,
    InlineEventHandler,
    CharsetMissing,
}

impl Rule {
    pub const ALL: [Rule; 25] = [
        Rule::ParseError,
        Rule::DoctypeRequired,
        Rule::DoctypePosition,
        Rule::UnmatchedClosingTag,
        Rule::UnclosedTag,
        Rule::RootElement,
        Rule::HtmlLang,
        Rule::HeadRequired,
        Rule::TitleRequired,
        Rule::TitleEmpty,
        Rule::CharsetRecommended,
        Rule::BodyRequired,
        Rule::InvalidElement,
        Rule::DeprecatedElement,
        Rule::ImgSrcRequired,
        Rule::ImgAltRequired,
        Rule::AreaAltRequired,
        Rule::InputTypeRecommended,
        Rule::InvalidParent,
        Rule::ForbiddenChild,
        Rule::VoidElementContent,
        Rule::DuplicateId,
        Rule::EmptyAttribute,
        Rule::InlineEventHandler,
        Rule::CharsetMissing,
    ];

    /// Machine-readable identifier, e.g. `"img-alt-required"`
    pub fn id(self) -> &'static str {
        match self {
            Rule::ParseError => "parse-error",
            Rule::DoctypeRequired => "doctype-required",
            Rule::DoctypePosition => "doctype-position",
            Rule::UnmatchedClosingTag => "unmatched-closing-tag",
            Rule::UnclosedTag => "unclosed-tag",
            Rule::RootElement => "root-element",
            Rule::HtmlLang => "html-lang",
            Rule::HeadRequired => "head-required",
            Rule::TitleRequired => "title-required",
            Rule::TitleEmpty => "title-empty",
            Rule::CharsetRecommended => "charset-recommended",
            Rule::BodyRequired => "body-required",
            Rule::InvalidElement => "invalid-element",
            Rule::DeprecatedElement => "deprecated-element",
            Rule::ImgSrcRequired => "img-src-required",
            Rule::ImgAltRequired => "img-alt-required",
            Rule::AreaAltRequired => "area-alt-required",
            Rule::InputTypeRecommended => "input-type-recommended",
            Rule::InvalidParent => "invalid-parent",
            Rule::ForbiddenChild => "forbidden-child",
            Rule::VoidElementContent => "void-element-content",
            Rule::DuplicateId => "duplicate-id",
            Rule::EmptyAttribute => "empty-attribute",
            Rule::InlineEventHandler => "inline-event-handler",
            Rule::CharsetMissing => "charset-missing",
        }
    }

    /// The fixed severity of this rule
    pub fn severity(self) -> Severity {
        match self {
            Rule::DoctypePosition
            | Rule::HtmlLang
            | Rule::CharsetRecommended
            | Rule::DeprecatedElement
            | Rule::InputTypeRecommended
            | Rule::EmptyAttribute
            | Rule::InlineEventHandler
            | Rule::CharsetMissing => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this rule reports a missing attribute from the rule tables
    pub fn is_required_attribute_rule(self) -> bool {
        matches!(
            self,
            Rule::ImgSrcRequired
                | Rule::ImgAltRequired
                | Rule::AreaAltRequired
                | Rule::InputTypeRecommended
        )
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when parsing an unknown rule identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule identifier '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Rule::ALL
            .into_iter()
            .find(|rule| rule.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

/// Longest fragment extract attached to a diagnostic, in characters
pub const MAX_EXTRACT_CHARS: usize = 200;

/// A single validation finding.
///
/// Fields are read-only once built; the severity always follows the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    severity: Severity,
    message: String,
    rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extract: Option<String>,
}

impl Diagnostic {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            severity: rule.severity(),
            message: message.into(),
            rule,
            line: None,
            column: None,
            extract: None,
        }
    }

    /// Attach a 1-based line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line.max(1));
        self
    }

    /// Attach a 1-based column number
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column.max(1));
        self
    }

    /// Attach a fragment extract, truncated to [`MAX_EXTRACT_CHARS`]
    pub fn with_extract(mut self, extract: impl AsRef<str>) -> Self {
        self.extract = Some(truncate_chars(extract.as_ref(), MAX_EXTRACT_CHARS));
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn extract(&self) -> Option<&str> {
        self.extract.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{}: ", line, column)?,
            (Some(line), None) => write!(f, "{}: ", line)?,
            _ => {}
        }
        write!(f, "{} [{}] {}", self.severity, self.rule, self.message)
    }
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Result of validating a document: errors and warnings in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic to the sequence matching its severity
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// All diagnostics, errors first
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A document is valid when it produced no errors; warnings are allowed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of diagnostics carrying `rule`
    pub fn count(&self, rule: Rule) -> usize {
        self.iter().filter(|d| d.rule() == rule).count()
    }

    pub fn has_rule(&self, rule: Rule) -> bool {
        self.iter().any(|d| d.rule() == rule)
    }

    /// Drop every diagnostic whose rule matches `ignored`
    pub fn without_rules(mut self, ignored: &[Rule]) -> Self {
        if !ignored.is_empty() {
            self.errors.retain(|d| !ignored.contains(&d.rule()));
            self.warnings.retain(|d| !ignored.contains(&d.rule()));
        }
        self
    }

    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings)
    }
}
