//! Rule File Schema
//!
//! Serde types mirroring the TOML rule file layout. Converted into
//! [`RuleTables`](super::RuleTables) for lookups.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::validation::Rule;

/// Root rule file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleFile {
    pub meta: RuleMeta,
    pub elements: ElementLists,
    #[serde(default)]
    pub categories: CategoryLists,
    #[serde(default)]
    pub attributes: AttributeConventions,
    #[serde(default)]
    pub required_attributes: Vec<RequiredAttributeDef>,
    #[serde(default)]
    pub required_parents: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub forbidden_children: BTreeMap<String, Vec<String>>,
}

/// Rule set metadata
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleMeta {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ElementLists {
    #[serde(default)]
    pub void: Vec<String>,
    #[serde(default)]
    pub deprecated: Vec<String>,
    pub valid: Vec<String>,
}

/// Lexical categories used for hover summaries and auxiliary lookups
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CategoryLists {
    #[serde(default)]
    pub metadata: Vec<String>,
    #[serde(default)]
    pub interactive: Vec<String>,
    #[serde(default)]
    pub block: Vec<String>,
    #[serde(default)]
    pub inline: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AttributeConventions {
    #[serde(default)]
    pub empty_value_allowed: Vec<String>,
    #[serde(default = "default_event_handler_prefix")]
    pub event_handler_prefix: String,
}

impl Default for AttributeConventions {
    fn default() -> Self {
        Self {
            empty_value_allowed: Vec::new(),
            event_handler_prefix: default_event_handler_prefix(),
        }
    }
}

fn default_event_handler_prefix() -> String {
    "on".to_string()
}

/// One required attribute of one element, reported under `rule` when missing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RequiredAttributeDef {
    pub element: String,
    pub attribute: String,
    pub rule: Rule,
    pub description: Option<String>,
}
