//! Structural Rule Checker
//!
//! Per-element conformance checks driven by [`RuleTables`], run in document
//! order. The identifier index is built up front so duplicate ids can be
//! reported inline with the other diagnostics of each element.

use std::collections::HashMap;

use crate::dom::{Document, ElementRef};
use crate::rules::{join_names, RuleTables};
use crate::validation::diagnostics::{Diagnostic, Rule, ValidationReport};

/// Count of elements carrying each `id` value
#[derive(Debug, Default)]
pub struct IdIndex<'a> {
    counts: HashMap<&'a str, usize>,
}

impl<'a> IdIndex<'a> {
    pub fn build(doc: &'a Document) -> Self {
        let mut counts: HashMap<&'a str, usize> = HashMap::new();
        for el in doc.elements() {
            if let Some(id) = el.attr("id") {
                *counts.entry(id).or_default() += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn is_duplicate(&self, id: &str) -> bool {
        self.count(id) > 1
    }
}

/// Run every per-element check over the whole tree
pub fn check_elements(doc: &Document, rules: &RuleTables, report: &mut ValidationReport) {
    let ids = IdIndex::build(doc);
    let mut checked = 0usize;

    for el in doc.elements() {
        check_element(&el, rules, &ids, report);
        checked += 1;
    }

    log::debug!("Checked {} element(s)", checked);
}

/// All checks for one element, in their fixed order
pub fn check_element(
    el: &ElementRef<'_>,
    rules: &RuleTables,
    ids: &IdIndex<'_>,
    report: &mut ValidationReport,
) {
    let tag = el.tag_name();

    check_element_name(el, tag, rules, report);
    check_deprecated(el, tag, rules, report);
    check_required_attributes(el, tag, rules, report);
    check_parent(el, tag, rules, report);
    check_forbidden_children(el, tag, rules, report);
    check_void_content(el, tag, rules, report);
    check_attributes(el, rules, ids, report);
}

fn check_element_name(
    el: &ElementRef<'_>,
    tag: &str,
    rules: &RuleTables,
    report: &mut ValidationReport,
) {
    // Custom elements
    if tag.contains('-') {
        return;
    }
    if !rules.is_valid_element(tag) {
        report.push(
            Diagnostic::new(
                Rule::InvalidElement,
                format!("<{}> is not a valid HTML5 element.", tag),
            )
            .with_extract(el.fragment()),
        );
    }
}

fn check_deprecated(
    el: &ElementRef<'_>,
    tag: &str,
    rules: &RuleTables,
    report: &mut ValidationReport,
) {
    if rules.is_deprecated(tag) {
        report.push(
            Diagnostic::new(
                Rule::DeprecatedElement,
                format!(
                    "<{}> element is deprecated (deprecated elements should not be used). Modern alternatives should be used.",
                    tag
                ),
            )
            .with_extract(el.fragment()),
        );
    }
}

fn check_required_attributes(
    el: &ElementRef<'_>,
    tag: &str,
    rules: &RuleTables,
    report: &mut ValidationReport,
) {
    let Some(required) = rules.required_attributes(tag) else {
        return;
    };

    for requirement in required {
        if el.has_attr(&requirement.attribute) {
            continue;
        }
        let note = requirement
            .note
            .as_deref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        report.push(
            Diagnostic::new(
                requirement.rule,
                format!(
                    "<{}> element must have \"{}\" attribute{}.",
                    tag, requirement.attribute, note
                ),
            )
            .with_extract(el.fragment()),
        );
    }
}

fn check_parent(el: &ElementRef<'_>, tag: &str, rules: &RuleTables, report: &mut ValidationReport) {
    let Some(allowed) = rules.required_parents(tag) else {
        return;
    };
    let Some(parent) = el.parent() else {
        return;
    };

    let parent_tag = parent.tag_name();
    if !allowed.iter().any(|name| name.as_str() == parent_tag) {
        report.push(
            Diagnostic::new(
                Rule::InvalidParent,
                format!(
                    "<{}> element must be inside {} elements. Currently inside <{}> element.",
                    tag,
                    join_names(allowed),
                    parent_tag
                ),
            )
            .with_extract(el.fragment()),
        );
    }
}

fn check_forbidden_children(
    el: &ElementRef<'_>,
    tag: &str,
    rules: &RuleTables,
    report: &mut ValidationReport,
) {
    let Some(forbidden) = rules.forbidden_children(tag) else {
        return;
    };

    // One diagnostic per offending child
    for child in el.children() {
        let child_tag = child.tag_name();
        if forbidden.iter().any(|name| name.as_str() == child_tag) {
            report.push(
                Diagnostic::new(
                    Rule::ForbiddenChild,
                    format!("<{}> element cannot contain <{}> element.", tag, child_tag),
                )
                .with_extract(el.fragment()),
            );
        }
    }
}

fn check_void_content(
    el: &ElementRef<'_>,
    tag: &str,
    rules: &RuleTables,
    report: &mut ValidationReport,
) {
    if rules.is_void(tag) && el.has_child_nodes() {
        report.push(
            Diagnostic::new(
                Rule::VoidElementContent,
                format!("<{}> is a void element and cannot have content.", tag),
            )
            .with_extract(el.fragment()),
        );
    }
}

fn check_attributes(
    el: &ElementRef<'_>,
    rules: &RuleTables,
    ids: &IdIndex<'_>,
    report: &mut ValidationReport,
) {
    for attr in el.attributes() {
        let name = attr.name.as_str();

        if name == "id" && ids.is_duplicate(&attr.value) {
            report.push(
                Diagnostic::new(
                    Rule::DuplicateId,
                    format!(
                        "ID \"{}\" is used in multiple elements. IDs must be unique.",
                        attr.value
                    ),
                )
                .with_extract(el.fragment()),
            );
        }

        if attr.value.is_empty() && !rules.allows_empty_value(name) {
            report.push(
                Diagnostic::new(
                    Rule::EmptyAttribute,
                    format!("\"{}\" attribute has an empty value.", name),
                )
                .with_extract(el.fragment()),
            );
        }

        if rules.is_event_handler(name) {
            report.push(
                Diagnostic::new(
                    Rule::InlineEventHandler,
                    format!(
                        "Inline event handler \"{}\" is not recommended. Use addEventListener in a script file.",
                        name
                    ),
                )
                .with_extract(el.fragment()),
            );
        }
    }
}
