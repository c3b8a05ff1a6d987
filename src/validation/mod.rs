//! Validation
//!
//! Text-level and tree-level checks, kept apart from parsing, output and
//! LSP concerns.

pub mod balance;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod structure;

pub use diagnostics::{Diagnostic, Rule, Severity, UnknownRule, ValidationReport, MAX_EXTRACT_CHARS};
pub use engine::{validate, Validator};
