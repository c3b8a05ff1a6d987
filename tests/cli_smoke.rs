use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const VALID: &str =
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>ok</title></head>\n<body><p>fine</p></body>\n</html>\n";
const BROKEN: &str =
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>bad</title></head>\n<body><div><img></body>\n</html>\n";

fn run(dir: &TempDir, args: &[&str]) -> Output {
    let bin_path = env!("CARGO_BIN_EXE_htmlcheck");

    Command::new(bin_path)
        .args(args)
        .current_dir(dir.path())
        .env("RUST_LOG", "off")
        // Keep user-level rule files out of the run
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .output()
        .expect("Failed to run htmlcheck")
}

#[test]
fn valid_file_exits_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), VALID).unwrap();

    let output = run(&dir, &["index.html"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("PASSED"));
    assert!(stdout.contains("Passed: 1"));
}

#[test]
fn broken_file_exits_one_with_json_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.html"), BROKEN).unwrap();

    let output = run(&dir, &["--format", "json", "broken.html"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result: Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(result["status"], "failed");

    let rules: Vec<_> = result["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["rule"].as_str().unwrap().to_string())
        .collect();
    assert!(rules.contains(&"unclosed-tag".to_string()));
    assert!(rules.contains(&"img-src-required".to_string()));
}

#[test]
fn source_list_writes_report() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.html"), VALID).unwrap();
    fs::write(dir.path().join("b.html"), BROKEN).unwrap();
    fs::write(
        dir.path().join("routes.json"),
        r#"{"routeList": ["a.html", "b.html", "https://example.com", "missing.html"]}"#,
    )
    .unwrap();

    let output = run(&dir, &["--list", "routes.json", "--report", "out"]);
    assert_eq!(output.status.code(), Some(1));

    let report: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(report["totalSources"], 4);
    assert_eq!(report["passedSources"], 1);
    assert_eq!(report["failedSources"], 3);
    assert_eq!(report["results"][2]["status"], "error");
    assert_eq!(report["results"][3]["status"], "error");
    let generated = report["generatedAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(generated).is_ok());
    assert!(report["results"][0]["timestamp"].is_string());
}

#[test]
fn ignored_rules_are_not_printed() {
    let dir = TempDir::new().unwrap();
    let markup = VALID.replace(" lang=\"en\"", "");
    fs::write(dir.path().join("page.html"), markup).unwrap();

    let output = run(&dir, &["--ignore", "html-lang", "page.html"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(!stdout.contains("html-lang"));
}

#[test]
fn unknown_ignore_rule_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("page.html"), VALID).unwrap();

    let output = run(&dir, &["--ignore", "not-a-rule", "page.html"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not-a-rule"));
}

#[test]
fn create_template_writes_usable_list() {
    let dir = TempDir::new().unwrap();

    let output = run(&dir, &["--create-template"]);
    assert!(output.status.success());

    let path = dir.path().join("routelist.json");
    let list: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(list["routeList"].as_array().unwrap().len(), 3);

    // Existing files are never overwritten
    fs::write(&path, "[]").unwrap();
    let output = run(&dir, &["--create-template"]);
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn create_template_with_custom_name() {
    let dir = TempDir::new().unwrap();

    let output = run(&dir, &["--create-template", "pages.json"]);
    assert!(output.status.success());
    assert!(dir.path().join("pages.json").is_file());
    assert!(!dir.path().join("routelist.json").exists());
}
