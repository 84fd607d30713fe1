//! Langcorpus - Multilingual Sentence Corpus and Language Identification
//!
//! Entry point: syncs the corpus, fills missing translations, retrains when
//! needed and prints a JSON object mapping every input text to its language.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use langcorpus::cli::Args;
use langcorpus::config::Config;
use langcorpus::error::CorpusError;
use langcorpus::workflow::{RunOptions, Workflow};

const DEFAULT_CONFIG: &str = "langcorpus.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<CorpusError>()
                .map(CorpusError::exit_code)
                .unwrap_or(1);
            error!("{:#}", e);
            println!("Error: {}", e);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = setup_logging(args.verbose, &config.paths.log_dir)?;
    info!("Starting langcorpus");

    let options = RunOptions {
        offline: args.offline,
        retrain: args.retrain,
    };

    let workflow = Workflow::new(config)?;
    let summary = workflow.run(&args.texts, &options).await?;

    if let Some(artifact) = &summary.trained {
        info!(
            "Trained {} on {} samples ({} held out)",
            artifact.classifier, artifact.train_samples, artifact.test_samples
        );
    }

    println!("{}", serde_json::to_string(&summary.predictions)?);
    info!("langcorpus run completed");
    Ok(())
}

/// Explicit `--config`, else `langcorpus.toml` in the working directory, else defaults
fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG).exists() {
                Config::from_file(DEFAULT_CONFIG)?
            } else {
                let config = Config::default();
                config.validate()?;
                config
            }
        }
    };
    Ok(config)
}

/// Setup logging to stderr and a daily rolling file
fn setup_logging(verbose: bool, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, "langcorpus.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // stdout is reserved for the JSON result
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("langcorpus.log").display()
    );

    Ok(guard)
}
