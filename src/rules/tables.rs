//! Rule Tables
//!
//! Immutable lookup tables built once from a [`RuleFile`] and passed by
//! reference into every checking stage. A missing key always means "no
//! constraint of that kind applies".

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use super::schema::RuleFile;
use crate::validation::Rule;

/// The embedded built-in rule file
pub const BUILTIN_RULES_TOML: &str = include_str!("../../resources/rules/html5.toml");

static BUILTIN: LazyLock<RuleTables> = LazyLock::new(RuleTables::load_builtin);

/// Lowercase element name used as a lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementName(String);

impl ElementName {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Custom elements carry a hyphen and are exempt from name legality
    pub fn is_custom(&self) -> bool {
        self.0.contains('-')
    }
}

impl Borrow<str> for ElementName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lexical content category of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Metadata,
    Interactive,
    Block,
    Inline,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Metadata => "metadata",
            Category::Interactive => "interactive",
            Category::Block => "block",
            Category::Inline => "inline",
        }
    }
}

/// A required attribute of an element and the rule reported when it is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredAttribute {
    pub attribute: String,
    pub rule: Rule,
    pub note: Option<String>,
}

/// Errors raised while building rule tables
#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("failed to parse rule file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read rule file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("rule '{rule}' for <{element}> is not a required-attribute rule")]
    NotAnAttributeRule { element: String, rule: Rule },
    #[error("event handler prefix must not be empty")]
    EmptyEventHandlerPrefix,
}

/// Process-wide immutable rule data
#[derive(Debug, Clone)]
pub struct RuleTables {
    name: String,
    version: Option<String>,
    void_elements: HashSet<ElementName>,
    deprecated_elements: HashSet<ElementName>,
    valid_elements: HashSet<ElementName>,
    categories: HashMap<ElementName, Vec<Category>>,
    required_attributes: HashMap<ElementName, Vec<RequiredAttribute>>,
    required_parents: HashMap<ElementName, Vec<ElementName>>,
    forbidden_children: HashMap<ElementName, Vec<ElementName>>,
    empty_value_allowed: HashSet<String>,
    event_handler_prefix: String,
    unknown_names: Vec<ElementName>,
}

impl RuleTables {
    /// The built-in HTML5 tables, initialised on first use
    pub fn builtin() -> &'static RuleTables {
        &BUILTIN
    }

    fn load_builtin() -> RuleTables {
        match Self::from_toml(BUILTIN_RULES_TOML) {
            Ok(tables) => tables,
            Err(e) => {
                log::error!("Built-in rule file is invalid: {}. Using empty tables.", e);
                Self::empty()
            }
        }
    }

    fn empty() -> RuleTables {
        RuleTables {
            name: "empty".to_string(),
            version: None,
            void_elements: HashSet::new(),
            deprecated_elements: HashSet::new(),
            valid_elements: HashSet::new(),
            categories: HashMap::new(),
            required_attributes: HashMap::new(),
            required_parents: HashMap::new(),
            forbidden_children: HashMap::new(),
            empty_value_allowed: HashSet::new(),
            event_handler_prefix: "on".to_string(),
            unknown_names: Vec::new(),
        }
    }

    /// Parse tables from TOML text
    pub fn from_toml(content: &str) -> Result<Self, RuleTableError> {
        let file: RuleFile = toml::from_str(content)?;
        Self::from_rule_file(file)
    }

    /// Read and parse tables from a TOML file
    pub fn from_path(path: &Path) -> Result<Self, RuleTableError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Build lookup tables, normalising names and checking rule kinds
    pub fn from_rule_file(file: RuleFile) -> Result<Self, RuleTableError> {
        let event_handler_prefix = file.attributes.event_handler_prefix.to_ascii_lowercase();
        if event_handler_prefix.is_empty() {
            return Err(RuleTableError::EmptyEventHandlerPrefix);
        }

        let mut required_attributes: HashMap<ElementName, Vec<RequiredAttribute>> = HashMap::new();
        for def in file.required_attributes {
            if !def.rule.is_required_attribute_rule() {
                return Err(RuleTableError::NotAnAttributeRule {
                    element: def.element,
                    rule: def.rule,
                });
            }
            required_attributes
                .entry(ElementName::new(&def.element))
                .or_default()
                .push(RequiredAttribute {
                    attribute: def.attribute.to_ascii_lowercase(),
                    rule: def.rule,
                    note: def.description,
                });
        }

        let mut categories: HashMap<ElementName, Vec<Category>> = HashMap::new();
        for (category, names) in [
            (Category::Metadata, &file.categories.metadata),
            (Category::Interactive, &file.categories.interactive),
            (Category::Block, &file.categories.block),
            (Category::Inline, &file.categories.inline),
        ] {
            for name in names {
                categories.entry(ElementName::new(name)).or_default().push(category);
            }
        }

        let mut tables = RuleTables {
            name: file.meta.name,
            version: file.meta.version,
            void_elements: name_set(&file.elements.void),
            deprecated_elements: name_set(&file.elements.deprecated),
            valid_elements: name_set(&file.elements.valid),
            categories,
            required_attributes,
            required_parents: name_map(file.required_parents),
            forbidden_children: name_map(file.forbidden_children),
            empty_value_allowed: file
                .attributes
                .empty_value_allowed
                .iter()
                .map(|a| a.to_ascii_lowercase())
                .collect(),
            event_handler_prefix,
            unknown_names: Vec::new(),
        };

        tables.unknown_names = tables.collect_unknown_names();
        for name in &tables.unknown_names {
            log::debug!(
                "Rule set '{}' references <{}> which is not a legal element name",
                tables.name,
                name
            );
        }

        Ok(tables)
    }

    /// Names used by parent, child, attribute or category tables that are
    /// missing from the legal element set. Void and deprecated sets are not
    /// checked: they deliberately list obsolete elements.
    fn collect_unknown_names(&self) -> Vec<ElementName> {
        let mut referenced: Vec<&ElementName> = Vec::new();
        referenced.extend(self.required_attributes.keys());
        referenced.extend(self.categories.keys());
        for (key, values) in self.required_parents.iter().chain(self.forbidden_children.iter()) {
            referenced.push(key);
            referenced.extend(values.iter());
        }

        let mut unknown: Vec<ElementName> = referenced
            .into_iter()
            .filter(|name| !name.is_custom() && !self.valid_elements.contains(*name))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_void(&self, name: &str) -> bool {
        self.void_elements.contains(name)
    }

    pub fn is_deprecated(&self, name: &str) -> bool {
        self.deprecated_elements.contains(name)
    }

    pub fn is_valid_element(&self, name: &str) -> bool {
        self.valid_elements.contains(name)
    }

    pub fn categories(&self, name: &str) -> &[Category] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_in_category(&self, name: &str, category: Category) -> bool {
        self.categories(name).contains(&category)
    }

    pub fn required_attributes(&self, name: &str) -> Option<&[RequiredAttribute]> {
        self.required_attributes.get(name).map(Vec::as_slice)
    }

    pub fn required_parents(&self, name: &str) -> Option<&[ElementName]> {
        self.required_parents.get(name).map(Vec::as_slice)
    }

    pub fn forbidden_children(&self, name: &str) -> Option<&[ElementName]> {
        self.forbidden_children.get(name).map(Vec::as_slice)
    }

    /// Whether `attribute` may carry an empty value without a warning
    pub fn allows_empty_value(&self, attribute: &str) -> bool {
        self.empty_value_allowed.contains(attribute)
    }

    pub fn is_event_handler(&self, attribute: &str) -> bool {
        attribute.starts_with(&self.event_handler_prefix)
    }

    /// Names referenced by the tables but absent from the legal element set
    pub fn unknown_names(&self) -> &[ElementName] {
        &self.unknown_names
    }

    /// Markdown summary of everything the tables say about an element
    pub fn describe(&self, name: &str) -> String {
        let key = ElementName::new(name);
        let mut lines = vec![format!("**<{}>**", key)];

        let status = if key.is_custom() {
            "custom element"
        } else if self.is_valid_element(key.as_str()) {
            "HTML5 element"
        } else {
            "not a valid HTML5 element"
        };
        lines.push(format!("- {}", status));

        if self.is_void(key.as_str()) {
            lines.push("- void: no content, no closing tag".to_string());
        }
        if self.is_deprecated(key.as_str()) {
            lines.push("- deprecated".to_string());
        }

        let categories = self.categories(key.as_str());
        if !categories.is_empty() {
            let labels: Vec<_> = categories.iter().map(|c| c.label()).collect();
            lines.push(format!("- categories: {}", labels.join(", ")));
        }
        if let Some(parents) = self.required_parents(key.as_str()) {
            lines.push(format!("- allowed parents: {}", join_names(parents)));
        }
        if let Some(children) = self.forbidden_children(key.as_str()) {
            lines.push(format!("- forbidden children: {}", join_names(children)));
        }
        if let Some(required) = self.required_attributes(key.as_str()) {
            let attrs: Vec<_> = required
                .iter()
                .map(|r| format!("{} ({})", r.attribute, r.rule.severity()))
                .collect();
            lines.push(format!("- required attributes: {}", attrs.join(", ")));
        }

        lines.join("\n")
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Render names as `<a>, <b>` for diagnostics
pub fn join_names(names: &[ElementName]) -> String {
    names
        .iter()
        .map(|n| format!("<{}>", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn name_set(names: &[String]) -> HashSet<ElementName> {
    names.iter().map(|n| ElementName::new(n)).collect()
}

fn name_map(
    raw: impl IntoIterator<Item = (String, Vec<String>)>,
) -> HashMap<ElementName, Vec<ElementName>> {
    raw.into_iter()
        .map(|(key, values)| {
            let values = values.iter().map(|v| ElementName::new(v)).collect();
            (ElementName::new(&key), values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_load() {
        let rules = RuleTables::builtin();
        assert_eq!(rules.name(), "html5");
        assert!(rules.is_void("br"));
        assert!(rules.is_void("param"));
        assert!(rules.is_deprecated("center"));
        assert!(rules.is_valid_element("template"));
        assert!(!rules.is_valid_element("center"));
    }

    #[test]
    fn test_builtin_unknown_names() {
        // hgroup is listed as a block element but not as a legal name
        let unknown: Vec<_> = RuleTables::builtin()
            .unknown_names()
            .iter()
            .map(ElementName::as_str)
            .collect();
        assert_eq!(unknown, vec!["hgroup"]);
    }

    #[test]
    fn test_missing_key_means_no_constraint() {
        let rules = RuleTables::builtin();
        assert!(rules.required_parents("div").is_none());
        assert!(rules.forbidden_children("span").is_none());
        assert!(rules.required_attributes("a").is_none());
        assert!(rules.categories("template").is_empty());
    }

    #[test]
    fn test_required_parents_keep_declared_order() {
        let parents = RuleTables::builtin().required_parents("li").unwrap();
        assert_eq!(join_names(parents), "<ul>, <ol>, <menu>");
    }

    #[test]
    fn test_img_required_attributes_in_order() {
        let required = RuleTables::builtin().required_attributes("img").unwrap();
        let rules: Vec<_> = required.iter().map(|r| r.rule).collect();
        assert_eq!(rules, vec![Rule::ImgSrcRequired, Rule::ImgAltRequired]);
    }

    #[test]
    fn test_names_are_normalised() {
        let rules = RuleTables::from_toml(
            r#"
            [meta]
            name = "mixed-case"

            [elements]
            valid = ["HTML", "Li", "UL"]

            [required_parents]
            LI = ["UL"]
            "#,
        )
        .unwrap();

        assert!(rules.is_valid_element("li"));
        assert_eq!(rules.required_parents("li").unwrap()[0].as_str(), "ul");
        assert!(rules.unknown_names().is_empty());
    }

    #[test]
    fn test_non_attribute_rule_is_rejected() {
        let err = RuleTables::from_toml(
            r#"
            [meta]
            name = "bad"

            [elements]
            valid = ["img"]

            [[required_attributes]]
            element = "img"
            attribute = "src"
            rule = "duplicate-id"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, RuleTableError::NotAnAttributeRule { .. }));
    }

    #[test]
    fn test_event_handler_prefix() {
        let rules = RuleTables::builtin();
        assert!(rules.is_event_handler("onclick"));
        assert!(!rules.is_event_handler("class"));
        assert!(rules.allows_empty_value("alt"));
        assert!(!rules.allows_empty_value("title"));
    }

    #[test]
    fn test_describe_element() {
        let text = RuleTables::builtin().describe("LI");
        assert!(text.contains("**<li>**"));
        assert!(text.contains("allowed parents: <ul>, <ol>, <menu>"));
        assert!(text.contains("categories: block"));

        let custom = RuleTables::builtin().describe("my-widget");
        assert!(custom.contains("custom element"));
    }
}
