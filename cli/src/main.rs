//! CLI entrypoint for bookwright
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use bookwright_application::{BookProgressNotifier, GenerateBookUseCase, NoProgress};
use bookwright_domain::{CredentialSet, GenerationSession, ProviderConfig, ProviderKind};
use bookwright_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, JsonlGenerationLogger, RoutingGateway,
    api_key_env, resolve_credentials,
};
use bookwright_presentation::{
    Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress, formatter_for,
};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Use `bookwright outline`, `bookwright chapter <N>` or `bookwright book` (see --help).");
    };

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    for issue in file_config.validate() {
        warn!("{}", issue);
    }
    let (provider_config, _) = file_config.providers.to_provider_config();
    let (params, _) = file_config.generation.to_generation_params();

    if !file_config.output.color {
        ConsoleFormatter::set_color(false);
    }
    let format = output_format(cli.output, &file_config);

    // === Session ===
    let specification = cli.book.to_specification().map_err(|e| anyhow!(e))?;
    let credentials = resolve_credentials(&provider_config);
    let provider = select_provider(cli.provider, &provider_config, &credentials)?;
    let mut session = GenerationSession::new(specification, credentials, provider)
        .context("Invalid book request")?;

    // === Dependency Injection ===
    let gateway = Arc::new(RoutingGateway::from_config(&provider_config)?);
    info!(
        provider = %provider,
        model = gateway.model_for(provider).unwrap_or("unknown"),
        "Starting bookwright"
    );

    let mut use_case = GenerateBookUseCase::with_params(gateway, params);
    if let Some(path) = &cli.event_log {
        match JsonlGenerationLogger::new(path) {
            Some(logger) => use_case = use_case.with_logger(Arc::new(logger)),
            None => warn!("Generation event log disabled: cannot open {}", path.display()),
        }
    }

    let progress: Box<dyn BookProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    let formatter = formatter_for(format);

    match command {
        Command::Outline => {
            let outline = use_case
                .create_outline_with_progress(&mut session, progress.as_ref())
                .await?;
            println!("{}", formatter.format_outline(&outline));
        }
        Command::Chapter {
            index,
            with_outline,
        } => {
            if with_outline {
                use_case
                    .create_outline_with_progress(&mut session, progress.as_ref())
                    .await?;
            }
            let chapter = use_case
                .generate_chapter_with_progress(&mut session, index, progress.as_ref())
                .await?;
            println!("{}", formatter.format_chapter(&chapter));
        }
        Command::Book => {
            let cancel = CancellationToken::new();
            let interrupt = {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("Interrupted; stopping before the next chapter");
                        cancel.cancel();
                    }
                })
            };

            let outcome = use_case
                .generate_full_book_with_progress(&mut session, &cancel, progress.as_ref())
                .await;
            interrupt.abort();

            println!("{}", formatter.format_book(&outcome));
            if let Some(failure) = &outcome.failure {
                bail!("Book generation stopped ({}): {}", failure.kind, failure.message);
            }
        }
    }

    Ok(())
}

/// Console logging chosen by `-v` (RUST_LOG wins), plus a daily-rotated file
/// under `log_dir` when given.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bookwright.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// `--output`, then `[output] format`, then text.
fn output_format(flag: Option<OutputFormat>, config: &FileConfig) -> OutputFormat {
    flag.unwrap_or(match config.output.format_or_default() {
        FileOutputFormat::Json => OutputFormat::Json,
        FileOutputFormat::Text => OutputFormat::Text,
    })
}

/// `--provider`, then `[providers] default`, then the first provider with a key.
fn select_provider(
    flag: Option<ProviderKind>,
    config: &ProviderConfig,
    credentials: &CredentialSet,
) -> Result<ProviderKind> {
    let provider = flag
        .or_else(|| config.default_kind())
        .or_else(|| credentials.providers().next())
        .ok_or_else(|| {
            anyhow!(
                "No API key found. Set {}, {} or {}.",
                api_key_env(config, ProviderKind::OpenAi),
                api_key_env(config, ProviderKind::Anthropic),
                api_key_env(config, ProviderKind::Gemini)
            )
        })?;

    if !credentials.contains(provider) {
        bail!(
            "No API key for {}. Set {} or providers.{}.api_key.",
            provider,
            api_key_env(config, provider),
            provider
        );
    }
    Ok(provider)
}
