//! htmlcheck
//!
//! A structural HTML5 validator with a command-line runner and a language
//! server.
//!
//! This library provides:
//! - Tag balance verification on raw markup
//! - Document and per-element conformance checks on the parsed tree
//! - TOML-configurable rule tables
//! - LSP protocol implementation

pub mod config;
pub mod dom;
pub mod lsp;
pub mod report;
pub mod rules;
pub mod sources;
pub mod validation;

pub use config::Config;
pub use dom::{Document, DocumentParser, Html5Parser, ParseError};
pub use rules::{RuleTableError, RuleTables};
pub use validation::{validate, Diagnostic, Rule, Severity, ValidationReport, Validator};
