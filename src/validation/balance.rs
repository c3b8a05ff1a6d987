//! Tag Balance Verifier
//!
//! Walks the raw markup with a tag stack before any tree is built, because
//! the HTML5 tree builder silently repairs exactly the mistakes reported here.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::rules::RuleTables;
use crate::validation::diagnostics::{Diagnostic, Rule, ValidationReport};

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<script\b[^>]*>(.*?)</script>"));
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<style\b[^>]*>(.*?)</style>"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)\b[^>]*>"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals checked by the unit tests below
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Kind of a scanned tag token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    /// Void or self-closing: never pushed, never matched
    Standalone,
}

/// A tag-like token found in the masked markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'a> {
    pub kind: TagKind,
    /// Lowercase tag name
    pub name: String,
    /// The full token text, e.g. `</div>`
    pub text: &'a str,
    /// Byte offset of `<` in the markup
    pub offset: usize,
}

/// An opening tag waiting for its closer
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    name: String,
    offset: usize,
}

/// Maps byte offsets to 1-based line and column numbers
#[derive(Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { text, line_starts }
    }

    /// 1-based line of the byte at `offset`
    pub fn line(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// 1-based column, counted in characters
    pub fn column(&self, offset: usize) -> usize {
        let start = self.line_starts[self.line(offset) - 1];
        let end = offset.min(self.text.len());
        self.text.get(start..end).map_or(1, |s| s.chars().count() + 1)
    }
}

/// Blank out comments and the bodies of `<script>`/`<style>` elements.
///
/// Newlines are kept and every other byte becomes a space, so offsets and
/// line numbers in the masked text match the input exactly.
pub fn mask_embedded_regions(markup: &str) -> String {
    let mut bytes = markup.as_bytes().to_vec();

    for m in COMMENT_RE.find_iter(markup) {
        blank(&mut bytes, m.range());
    }

    for re in [&*SCRIPT_RE, &*STYLE_RE] {
        // Later patterns see the earlier masking, like sequential replacement
        let current = String::from_utf8_lossy(&bytes).into_owned();
        for caps in re.captures_iter(&current) {
            if let Some(body) = caps.get(1) {
                blank(&mut bytes, body.range());
            }
        }
    }

    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn blank(bytes: &mut [u8], range: Range<usize>) {
    for b in &mut bytes[range] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

/// Find every tag-like token in already masked markup
pub fn scan_tags<'a>(masked: &'a str, rules: &RuleTables) -> Vec<TagToken<'a>> {
    TAG_RE
        .captures_iter(masked)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(2)?.as_str().to_ascii_lowercase();
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let text = whole.as_str();

            let kind = if text.ends_with("/>") || rules.is_void(&name) {
                TagKind::Standalone
            } else if closing {
                TagKind::Close
            } else {
                TagKind::Open
            };

            Some(TagToken {
                kind,
                name,
                text,
                offset: whole.start(),
            })
        })
        .collect()
}

/// Report unmatched closing tags and unclosed opening tags in raw markup
pub fn verify_tag_balance(markup: &str, rules: &RuleTables, report: &mut ValidationReport) {
    let masked = mask_embedded_regions(markup);
    let lines = LineIndex::new(markup);
    let mut stack: Vec<Frame> = Vec::new();
    let mut found = 0usize;

    for token in scan_tags(&masked, rules) {
        match token.kind {
            TagKind::Standalone => continue,
            TagKind::Open => stack.push(Frame {
                name: token.name,
                offset: token.offset,
            }),
            TagKind::Close => {
                let line = lines.line(token.offset);
                let column = lines.column(token.offset);

                let Some(top) = stack.pop() else {
                    report.push(
                        Diagnostic::new(
                            Rule::UnmatchedClosingTag,
                            format!(
                                "\"</{}>\" closing tag found but there is no opening tag.",
                                token.name
                            ),
                        )
                        .with_line(line)
                        .with_column(column)
                        .with_extract(token.text),
                    );
                    found += 1;
                    continue;
                };

                if top.name != token.name {
                    // The top frame is dropped either way so scanning can continue
                    report.push(
                        Diagnostic::new(
                            Rule::UnclosedTag,
                            format!(
                                "\"<{}>\" tag (line {}) was left open. Attempted to close it with \"</{}>\".",
                                top.name,
                                lines.line(top.offset),
                                token.name
                            ),
                        )
                        .with_line(line)
                        .with_column(column)
                        .with_extract(token.text),
                    );
                    found += 1;
                }
            }
        }
    }

    for frame in stack {
        let line = lines.line(frame.offset);
        report.push(
            Diagnostic::new(
                Rule::UnclosedTag,
                format!(
                    "\"<{}>\" tag (line {}) was left open. Closing tag \"</{}>\" not found.",
                    frame.name, line, frame.name
                ),
            )
            .with_line(line)
            .with_column(lines.column(frame.offset)),
        );
        found += 1;
    }

    log::debug!("Tag balance check found {} problem(s)", found);
}
