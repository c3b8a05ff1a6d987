use std::process::ExitCode;

use anyhow::{bail, Result};
use env_logger::Env;

use htmlcheck::config::{Config, OutputFormat};
use htmlcheck::report::{RunReport, SourceResult};
use htmlcheck::sources::{read_source_list, write_source_list_template, Source};
use htmlcheck::Validator;

fn main() -> Result<ExitCode> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    if let Some(path) = &config.create_template {
        write_source_list_template(path)?;
        println!("Template file created: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut sources: Vec<Source> =
        config.inputs.iter().map(|p| Source::from(p.as_path())).collect();
    if let Some(list) = &config.list {
        sources.extend(read_source_list(list)?);
    }
    if sources.is_empty() {
        bail!("No input given: pass file paths, `-` for standard input, or --list");
    }

    let rules = config.load_rules()?;
    let validator = Validator::new(&rules);
    let mut run = RunReport::new();
    let total = sources.len();

    for (index, source) in sources.iter().enumerate() {
        log::info!("[{}/{}] Validating {}", index + 1, total, source);

        let result = match source.load() {
            Ok(markup) => {
                log::debug!("Read {} byte(s) from {}", markup.len(), source);
                let report = validator.validate(&markup).without_rules(&config.ignore);
                SourceResult::from_report(source.to_string(), report)
            }
            Err(e) => {
                log::error!("{:#}", e);
                SourceResult::failure(source.to_string(), format!("{:#}", e))
            }
        };

        match config.format {
            OutputFormat::Text => println!("{}", result.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
        }
        run.push(result);
    }

    match config.format {
        OutputFormat::Text => println!("{}", run.summary()),
        OutputFormat::Json => eprintln!("{}", run.summary()),
    }

    if let Some(path) = &config.report {
        let written = run.write_json(path)?;
        eprintln!("JSON report saved: {}", written.display());
    }

    Ok(if run.has_failures() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
