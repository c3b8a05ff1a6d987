//! Configuration management for htmlcheck.
//!
//! Handles:
//! - Command-line argument parsing for the checker and the language server
//! - Project configuration discovery (`.htmlcheck.toml`)
//! - Rule file resolution and ignored rules

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::RuleTables;
use crate::sources::TEMPLATE_FILE;
use crate::validation::Rule;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = ".htmlcheck.toml";

/// Output format for per-source results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options shared by the checker and the language server
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RuleArgs {
    /// Rule file replacing the built-in HTML5 tables
    #[arg(long, value_name = "FILE", help = "TOML rule file to use instead of the built-in rules")]
    pub rules: Option<PathBuf>,

    /// Rules to leave out of the output
    #[arg(long = "ignore", value_name = "RULE", help = "Rule id to ignore (repeatable)")]
    pub ignore: Vec<String>,

    /// Log level
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Command-line arguments for the `htmlcheck` binary
#[derive(Debug, Parser)]
#[command(name = "htmlcheck")]
#[command(about = "Structural HTML5 validator")]
#[command(version)]
pub struct Args {
    /// Files to validate; `-` reads standard input
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// JSON source list: {"routeList": [...]} or a bare array of paths
    #[arg(long, value_name = "FILE", help = "JSON file listing the sources to validate")]
    pub list: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Where to write the JSON run report
    #[arg(
        long,
        value_name = "FILE",
        help = "Write a JSON report (\".json\" is appended if missing)"
    )]
    pub report: Option<PathBuf>,

    /// Write an example source list and exit
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = TEMPLATE_FILE,
        help = "Write an example source list (default: routelist.json) and exit"
    )]
    pub create_template: Option<PathBuf>,

    #[command(flatten)]
    pub rule_args: RuleArgs,
}

/// Command-line arguments for the `htmlcheck-ls` binary
#[derive(Debug, Parser)]
#[command(name = "htmlcheck-ls")]
#[command(about = "Language server for structural HTML5 validation")]
#[command(version)]
pub struct ServerArgs {
    #[command(flatten)]
    pub rule_args: RuleArgs,
}

/// Contents of `.htmlcheck.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Rule file, relative to the directory holding the config file
    pub rules: Option<PathBuf>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Search `start` and its ancestors for a project config file
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>> {
        for dir in start.ancestors() {
            let candidate = dir.join(PROJECT_CONFIG_FILE);
            if candidate.is_file() {
                log::debug!("Using project config {}", candidate.display());
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Input files; `-` means standard input
    pub inputs: Vec<PathBuf>,
    /// Source list file
    pub list: Option<PathBuf>,
    pub format: OutputFormat,
    /// JSON report destination
    pub report: Option<PathBuf>,
    /// Example source list to write instead of validating
    pub create_template: Option<PathBuf>,
    /// Rule file to load; `None` means the built-in tables
    pub rules_path: Option<PathBuf>,
    /// Rules filtered from output
    pub ignore: Vec<Rule>,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments and the working directory
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        Self::from_args_in(args, &cwd)
    }

    /// Create configuration as if run from `cwd` (useful for testing)
    pub fn from_args_in(args: Args, cwd: &Path) -> Result<Self> {
        let mut config = Self::resolve(args.rule_args, cwd, user_rules_path())?;
        config.inputs = args.paths;
        config.list = args.list;
        config.format = args.format;
        config.report = args.report;
        config.create_template = args.create_template.map(|path| cwd.join(path));
        Ok(config)
    }

    /// Configuration for the language server
    pub fn from_server_args() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        Self::from_server_args_in(ServerArgs::parse(), &cwd)
    }

    pub fn from_server_args_in(args: ServerArgs, cwd: &Path) -> Result<Self> {
        Self::resolve(args.rule_args, cwd, user_rules_path())
    }

    /// Rules: `--rules` > project `rules` > user rule file > built-in
    fn resolve(args: RuleArgs, cwd: &Path, user_rules: Option<PathBuf>) -> Result<Self> {
        let project = ProjectConfig::discover(cwd)?;

        let project_rules = project.as_ref().and_then(|(path, config)| {
            let base = path.parent().unwrap_or(cwd);
            config.rules.as_ref().map(|rules| base.join(rules))
        });

        let rules_path = args
            .rules
            .map(|path| cwd.join(path))
            .or(project_rules)
            .or_else(|| user_rules.filter(|path| path.is_file()));

        let mut ignore = parse_ignored(&args.ignore, "--ignore")?;
        if let Some((path, config)) = &project {
            let source = path.display().to_string();
            for rule in parse_ignored(&config.ignore, &source)? {
                if !ignore.contains(&rule) {
                    ignore.push(rule);
                }
            }
        }

        Ok(Config {
            rules_path,
            ignore,
            log_level: args.log_level,
            ..Default::default()
        })
    }

    /// Load the rule tables this configuration points at
    pub fn load_rules(&self) -> Result<RuleTables> {
        let Some(path) = &self.rules_path else {
            return Ok(RuleTables::builtin().clone());
        };

        let tables = RuleTables::from_path(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?;
        if !tables.unknown_names().is_empty() {
            let names: Vec<_> = tables.unknown_names().iter().map(|n| n.as_str()).collect();
            log::warn!(
                "Rule file {} references unknown elements: {}",
                path.display(),
                names.join(", ")
            );
        }
        log::info!("Loaded rule set '{}' from {}", tables.name(), path.display());
        Ok(tables)
    }
}

/// Default location of the user's rule file
pub fn user_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("htmlcheck").join("rules.toml"))
}

fn parse_ignored(raw: &[String], source: &str) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for id in raw {
        let rule: Rule = id
            .parse()
            .with_context(|| format!("Invalid ignore entry in {}", source))?;
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }
    Ok(rules)
}
