use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use watchpost::application::config::{AppConfig, StateBackend};
use watchpost::application::services::ThresholdEngine;
use watchpost::domain::entities::report::CheckReport;
use watchpost::domain::value_objects::severity::Severity;
use watchpost::domain::value_objects::thresholds::Thresholds;
use watchpost::infrastructure::persistence::open_state_store;
use watchpost::presentation::cli::app::{Cli, Commands};
use watchpost::presentation::cli::commands::age::{run_age, timestamp_source_from_args};
use watchpost::presentation::cli::commands::config::run_config;
use watchpost::presentation::cli::commands::delta::{counter_source_from_args, run_delta};
use watchpost::presentation::cli::commands::run::run_checks;
use watchpost::presentation::cli::formatters::plugin_fmt;

/// Logs go to stderr; stdout carries only the status line.
fn setup_tracing(verbose: bool, configured: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    // --init must work even when the existing file is missing or broken.
    let init = matches!(cli.command, Commands::Config { init: true, .. });
    let mut config = match cli.config {
        _ if init => AppConfig::default(),
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if let Some(ref backend) = cli.backend {
        config.state.backend = backend.parse::<StateBackend>()?;
    }
    if let Some(ref dir) = cli.state_dir {
        config.state.dir.clone_from(dir);
        config.state.database = Path::new(dir).join("state.db").to_string_lossy().into_owned();
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<Severity> {
    let config = load_config(&cli)?;
    setup_tracing(cli.verbose, &config.general.log_level);

    // Manual DI: main.rs is the only place that knows concrete types
    let report: CheckReport = match cli.command {
        Commands::Delta {
            key,
            name,
            counter_file,
            keyed_file,
            field,
            warning,
            critical,
        } => {
            let source = counter_source_from_args(counter_file, keyed_file, field)?;
            match open_state_store(&config.state) {
                Ok(store) => run_delta(
                    store.as_ref(),
                    name.as_deref(),
                    &key,
                    &source,
                    Thresholds::new(warning, critical),
                )?,
                Err(e) => CheckReport::single(ThresholdEngine::store_unavailable(
                    name.as_deref().unwrap_or_else(|| key.trim()),
                    &e,
                )),
            }
        }
        Commands::Age {
            epoch_file,
            mtime,
            name,
            warning,
            critical,
            disable_marker,
        } => {
            let source = timestamp_source_from_args(epoch_file, mtime)?;
            run_age(
                name.as_deref(),
                &source,
                disable_marker.as_deref(),
                Thresholds::new(warning, critical),
                Utc::now(),
            )?
        }
        Commands::Run { names } => {
            run_checks(&config, || open_state_store(&config.state), &names, Utc::now())?
        }
        Commands::Config { init, force } => {
            let path = match cli.config {
                Some(path) => path,
                None => AppConfig::config_path()?,
            };
            println!("{}", run_config(&config, &path, init, force)?);
            return Ok(Severity::Ok);
        }
    };

    println!("{}", plugin_fmt::render(&report, cli.json)?);
    Ok(report.severity)
}

fn exit_code(severity: Severity) -> ExitCode {
    ExitCode::from(u8::try_from(severity.exit_code()).unwrap_or(3))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // clap would exit 2, which monitoring reads as CRITICAL.
            eprintln!("{e}");
            println!("UNKNOWN - invalid arguments");
            return exit_code(Severity::Unknown);
        }
    };

    match run(cli) {
        Ok(severity) => exit_code(severity),
        Err(e) => {
            println!("UNKNOWN - {e:#}");
            exit_code(Severity::Unknown)
        }
    }
}
