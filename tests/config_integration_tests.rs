//! Project configuration discovery and rule loading
use std::fs;

use clap::Parser;
use htmlcheck::config::{Args, Config, OutputFormat, ProjectConfig, PROJECT_CONFIG_FILE};
use htmlcheck::{Rule, Validator};
use tempfile::TempDir;

const TINY_RULES: &str = r#"
[meta]
name = "tiny"

[elements]
valid = ["html", "head", "title", "meta", "body", "p"]
"#;

#[test]
fn test_project_config_found_from_nested_directory() {
    let root = TempDir::new().unwrap();
    let nested = root.path().join("site").join("pages");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        root.path().join(PROJECT_CONFIG_FILE),
        "rules = \"rules/tiny.toml\"\nignore = [\"html-lang\"]\n",
    )
    .unwrap();

    let (path, config) = ProjectConfig::discover(&nested).unwrap().unwrap();
    assert_eq!(path, root.path().join(PROJECT_CONFIG_FILE));
    assert_eq!(config.ignore, vec!["html-lang".to_string()]);
}

#[test]
fn test_args_and_project_config_combine() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("rules")).unwrap();
    fs::write(root.path().join("rules").join("tiny.toml"), TINY_RULES).unwrap();
    fs::write(
        root.path().join(PROJECT_CONFIG_FILE),
        "rules = \"rules/tiny.toml\"\nignore = [\"charset-missing\"]\n",
    )
    .unwrap();

    let args = Args::parse_from([
        "htmlcheck",
        "index.html",
        "--format",
        "json",
        "--ignore",
        "html-lang",
    ]);
    let config = Config::from_args_in(args, root.path()).unwrap();

    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.inputs.len(), 1);
    assert_eq!(config.ignore, vec![Rule::HtmlLang, Rule::CharsetMissing]);

    let rules = config.load_rules().unwrap();
    assert_eq!(rules.name(), "tiny");

    let report = Validator::new(&rules)
        .validate(
            "<!DOCTYPE html><html><head><title>t</title></head>\
             <body><section>x</section></body></html>",
        )
        .without_rules(&config.ignore);
    assert_eq!(report.count(Rule::InvalidElement), 1);
    assert!(!report.has_rule(Rule::HtmlLang));
    assert!(!report.has_rule(Rule::CharsetMissing));
    assert!(report.has_rule(Rule::CharsetRecommended));
}

#[test]
fn test_invalid_project_config_is_an_error() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(PROJECT_CONFIG_FILE), "profile = \"strict\"\n").unwrap();
    assert!(ProjectConfig::discover(root.path()).is_err());
}

#[test]
fn test_broken_rule_file_is_reported() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("bad.toml"), "[meta]\n").unwrap();

    let args = Args::parse_from(["htmlcheck", "--rules", "bad.toml", "a.html"]);
    let config = Config::from_args_in(args, root.path()).unwrap();
    let err = config.load_rules().unwrap_err();
    assert!(format!("{:#}", err).contains("bad.toml"));
}
