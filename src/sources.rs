//! Input sources for the command-line checker.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
    /// An `http://` or `https://` location; never fetched
    Remote(String),
}

impl Source {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "-" {
            Source::Stdin
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Remote(trimmed.to_string())
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }

    /// Read the markup text of this source
    pub fn load(&self) -> Result<String> {
        match self {
            Source::Stdin => {
                let mut markup = String::new();
                std::io::stdin()
                    .read_to_string(&mut markup)
                    .context("Failed to read standard input")?;
                Ok(markup)
            }
            Source::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            Source::Remote(url) => {
                bail!("Cannot validate {}: fetching remote documents is not supported", url)
            }
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        if path == Path::new("-") {
            Source::Stdin
        } else {
            Source::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Remote(url) => f.write_str(url),
        }
    }
}

/// Default file name of the example source list
pub const TEMPLATE_FILE: &str = "routelist.json";

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum SourceListFile {
    Wrapped {
        #[serde(rename = "routeList")]
        route_list: Vec<String>,
    },
    Bare(Vec<String>),
}

/// Parse a source list: `{"routeList": [...]}` or a bare JSON array
pub fn parse_source_list(content: &str) -> Result<Vec<Source>> {
    let list: SourceListFile = serde_json::from_str(content)
        .context("Source list must be a JSON array or {\"routeList\": [...]}")?;
    let entries = match list {
        SourceListFile::Wrapped { route_list } => route_list,
        SourceListFile::Bare(entries) => entries,
    };

    if entries.is_empty() {
        bail!("Source list does not contain any entries");
    }
    Ok(entries.iter().map(|entry| Source::parse(entry)).collect())
}

/// Read a source list file; relative file entries resolve against the list's directory
pub fn read_source_list(path: &Path) -> Result<Vec<Source>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source list {}", path.display()))?;
    let sources = parse_source_list(&content)
        .with_context(|| format!("Invalid source list {}", path.display()))?;
    let base = path.parent().unwrap_or(Path::new(""));

    log::info!("Found {} source(s) in {}", sources.len(), path.display());

    Ok(sources
        .into_iter()
        .map(|source| match source {
            Source::File(file) if file.is_relative() => Source::File(base.join(file)),
            other => other,
        })
        .collect())
}

/// Write an example `{"routeList": [...]}` file; an existing file is left alone
pub fn write_source_list_template(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists, not overwriting it", path.display());
    }

    let template = SourceListFile::Wrapped {
        route_list: vec![
            "index.html".to_string(),
            "about.html".to_string(),
            "contact.html".to_string(),
        ],
    };
    let content =
        serde_json::to_string_pretty(&template).context("Failed to serialize source list")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write source list {}", path.display()))?;

    log::info!("Created source list template {}", path.display());
    Ok(())
}
