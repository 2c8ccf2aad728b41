//! CLI entrypoint for member-qa
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use member_qa_application::{
    AnswerQuestionUseCase, AskProgressNotifier, MessageCache, NoProgress, SyncMessagesUseCase,
};
use member_qa_domain::OutputFormat;
use member_qa_infrastructure::{
    ConfigLoader, FileConfig, HttpMessageSource, JsonFileMessageCache, OpenAiOracle,
};
use member_qa_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Set up tracing. Returns the guard that flushes the file writer on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    // RUST_LOG wins when set.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;

    let log_file = cli.log_file.as_deref().or(config.logging.file.as_deref());
    let log_guard = init_logging(cli.verbose, log_file)?;

    if !config.output.color {
        ConsoleFormatter::disable_color();
    }

    info!("Starting member-qa");

    if cli.command == Some(Command::Config) {
        print!("{}", config.to_toml().context("Failed to render configuration")?);
        return Ok(());
    }

    // === Dependency Injection ===
    let cache: Arc<dyn MessageCache> = if config.cache.enabled {
        Arc::new(JsonFileMessageCache::open(&config.cache.path))
    } else {
        Arc::new(JsonFileMessageCache::in_memory())
    };
    let source = Arc::new(HttpMessageSource::new(
        config.source.base_url.clone(),
        Duration::from_secs(config.source.timeout_secs),
    )?);
    let params = config.pipeline_params();
    let show_progress = !cli.quiet && config.output.show_progress;

    if let Some(Command::Sync { pages }) = cli.command {
        let use_case = SyncMessagesUseCase::new(cache, source).with_params(params);
        let report = if show_progress {
            let progress = ProgressReporter::syncing();
            use_case.execute_with_progress(pages, &progress).await
        } else {
            use_case.execute(pages).await
        };
        print!("{}", ConsoleFormatter::format_sync_report(&report));
        return Ok(());
    }

    let api_key = config.oracle.resolve_api_key();
    if api_key.is_none() {
        warn!(
            "No API key in ${}; model calls will fail and answers fall back to heuristics",
            config.oracle.api_key_env
        );
    }
    let oracle = Arc::new(
        OpenAiOracle::new(
            config.oracle.base_url.clone(),
            config.oracle.model.clone(),
            api_key,
            config.oracle.timeout(),
        )?
        .with_temperature(config.oracle.temperature),
    );

    let use_case = Arc::new(AnswerQuestionUseCase::new(cache, source, oracle).with_params(params));

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(use_case)
            .with_progress(show_progress)
            .with_format(format);
        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let Some(question) = cli.question else {
        bail!("Question is required. Use --chat for interactive mode.");
    };

    let progress: Box<dyn AskProgressNotifier> = if !show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    match use_case
        .execute_with_progress(&question, progress.as_ref())
        .await
    {
        Ok(outcome) => {
            println!("{}", ConsoleFormatter::render(&outcome, format));
            Ok(())
        }
        Err(e) => {
            // Only the generic message reaches the user; the cause is logged.
            warn!(error = ?e, "Question failed");
            eprintln!("{}", ConsoleFormatter::format_error(&e.to_string()));
            drop(log_guard);
            std::process::exit(1);
        }
    }
}
