use anyhow::{Context, Result};
use env_logger::Env;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::config::user_rules_path;
use crate::lsp::backend::Backend;
use crate::rules::BUILTIN_RULES_TOML;
use crate::Config;

/// Start the LSP server on stdio
pub async fn serve() -> Result<()> {
    let config = Config::from_server_args()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    let rules = config.load_rules()?;

    // Give users a copy of the built-in rules to customise
    if let Some(path) = user_rules_path() {
        if let Err(e) = write_embedded_rules_to_disk(&path) {
            log::warn!("Failed to write built-in rules to {}: {:#}", path.display(), e);
        }
    }

    // Under the integration test, exit shortly so the test can read stdout to EOF
    if std::env::var("HTMLCHECK_LS_TEST_EXIT").as_deref() == Ok("1") {
        thread::spawn(|| {
            thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config, rules)).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}

/// Write the embedded rule file to `path` unless something is already there
pub fn write_embedded_rules_to_disk(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(path, BUILTIN_RULES_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Created rule file: {}", path.display());
    Ok(true)
}
