//! definitie-validate: validate candidate definitions against a rule catalog.
//!
//! One-shot mode validates a JSON array of items (`--input`) or a single
//! `--term`/`--text` pair as a batch and prints the report. Stream mode
//! (`--watch`) reads one JSON item per stdin line and hot-reloads the
//! catalog when rule files change.
//!
//! Exit codes: 0 every definition accepted, 1 anything rejected, errored or
//! abandoned, 2 the rule configuration is unusable.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use definitie_core::config::load_dotenv;
use definitie_core::{DefinitionItem, EngineConfig};
use definitie_rules::report::{render_batch, render_result};
use definitie_rules::{
    validate_batch, validate_batch_until, BatchOptions, BatchReport, CatalogHandle, CatalogOptions,
    CatalogSource, CheckRegistry, DefinitionValidator, EngineError, RuleLoader,
};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Validate definitions against the rule catalog.
///
/// Flags left unset fall back to the environment (`RULES_DIR`,
/// `BATCH_CONCURRENCY`, `BATCH_TIMEOUT_MS`, `STRICT_RULES`, `WATCH_RULES`,
/// optionally prefixed by `DEFINITIE_PROFILE`).
#[derive(Parser, Debug)]
#[command(name = "definitie-validate", version, about)]
struct Cli {
    /// Directory with rule set and thresholds YAML documents.
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// JSON array of definition items; `-` reads stdin.
    #[arg(long, conflicts_with_all = ["term", "watch"])]
    input: Option<PathBuf>,

    /// Term of a single definition to validate.
    #[arg(long, requires = "text", conflicts_with = "watch")]
    term: Option<String>,

    /// Text of a single definition to validate.
    #[arg(long, requires = "term")]
    text: Option<String>,

    /// Items evaluated at once.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Abandon unfinished items after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Refuse to start when any rule source fails to load.
    #[arg(long)]
    strict: bool,

    /// Read JSON lines from stdin and hot-reload rules on change.
    #[arg(long)]
    watch: bool,

    /// Re-run the batch sequentially and fail if any outcome differs.
    #[arg(long)]
    verify_determinism: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Emit logs as JSON.
    #[arg(long, env = "DEFINITIE_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    /// Environment config with command-line flags applied on top.
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(dir) = &self.rules_dir {
            config.rules_dir = dir.clone();
        }
        if let Some(n) = self.concurrency {
            config.batch_concurrency = n.max(1);
        }
        if let Some(ms) = self.timeout_ms {
            config.batch_timeout_ms = Some(ms).filter(|ms| *ms > 0);
        }
        config.strict_rules |= self.strict;
        config.watch_rules |= self.watch;
        config
    }
}

// ── Setup ───────────────────────────────────────────────────────────

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_validator(config: &EngineConfig) -> Result<DefinitionValidator, EngineError> {
    let handle = CatalogHandle::load(
        CatalogSource::Directory(config.rules_dir.clone()),
        CheckRegistry::builtin(),
        CatalogOptions {
            strict: config.strict_rules,
        },
    )?;
    let catalog = handle.current();
    info!(
        rules = catalog.len(),
        generation = catalog.generation(),
        degraded = catalog.is_degraded(),
        "rule catalog ready"
    );
    Ok(DefinitionValidator::new(Arc::new(handle)))
}

async fn read_items(cli: &Cli) -> anyhow::Result<Vec<DefinitionItem>> {
    let json = match (&cli.input, &cli.term, &cli.text) {
        (Some(path), _, _) if path == Path::new("-") => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read items from stdin")?;
            buf
        }
        (Some(path), _, _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, Some(term), Some(text)) => {
            return Ok(vec![DefinitionItem::new(term.clone(), text.clone())]);
        }
        _ => anyhow::bail!("nothing to validate: pass --input, --term/--text or --watch"),
    };
    serde_json::from_str(&json).context("input must be a JSON array of {term, text} items")
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}

// ── Modes ───────────────────────────────────────────────────────────

async fn run_batch(
    cli: &Cli,
    config: &EngineConfig,
    validator: &DefinitionValidator,
) -> anyhow::Result<ExitCode> {
    let items = read_items(cli).await?;
    let options = BatchOptions::from_config(config);

    let report = validate_batch_until(validator, items.clone(), &options, shutdown_signal())
        .await
        .map_err(EngineError::from)?;

    if cli.verify_determinism {
        verify(validator, items, &options, &report).await?;
    }

    match cli.format {
        OutputFormat::Text => print!("{}", render_batch(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.all_acceptable() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Re-run `items` sequentially on the same catalog snapshot generation and
/// compare against `report`.
async fn verify(
    validator: &DefinitionValidator,
    items: Vec<DefinitionItem>,
    options: &BatchOptions,
    report: &BatchReport,
) -> anyhow::Result<()> {
    if report.partial {
        warn!("batch was cut short, skipping determinism check");
        return Ok(());
    }
    let sequential = BatchOptions {
        concurrency: 1,
        timeout: options.timeout,
    };
    let rerun = validate_batch(validator, items, &sequential)
        .await
        .map_err(EngineError::from)?;
    if rerun.partial || rerun.catalog_generation != report.catalog_generation {
        warn!("catalog changed or rerun was cut short, skipping determinism check");
        return Ok(());
    }
    report.ensure_matches(&rerun).map_err(EngineError::from)?;
    info!(items = report.items.len(), "determinism check passed");
    Ok(())
}

async fn run_stream(
    config: &EngineConfig,
    validator: &DefinitionValidator,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let mut loader = RuleLoader::new(config.rules_dir.clone());
    loader
        .watch(Arc::clone(validator.handle()))
        .map_err(EngineError::from)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut all_acceptable = true;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = &mut shutdown => {
                info!("shutdown requested, stopping stream");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let item: DefinitionItem = match serde_json::from_str(&line) {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "skipping malformed input line");
                all_acceptable = false;
                continue;
            }
        };

        let v = validator.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let outcome = v.validate_item(&item);
            (item, outcome)
        })
        .await?;

        match outcome {
            (_, Ok(result)) => {
                all_acceptable &= result.is_acceptable;
                match format {
                    OutputFormat::Text => print!("{}", render_result(&result)),
                    OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
                }
            }
            (item, Err(e)) => {
                all_acceptable = false;
                warn!(term = %item.term, error = %e, "definition not validated");
                match format {
                    OutputFormat::Text => println!("ERRORED '{}': {}", item.term, e),
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "term": item.term, "input_error": e })
                    ),
                }
            }
        }
    }

    Ok(if all_acceptable {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.engine_config();
    config.log_summary();

    let validator = match load_validator(&config) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "cannot start without a usable rule catalog");
            return Ok(ExitCode::from(2));
        }
    };

    // Explicit input always wins over WATCH_RULES from the environment.
    if config.watch_rules && cli.input.is_none() && cli.term.is_none() {
        run_stream(&config, &validator, cli.format).await
    } else {
        run_batch(&cli, &config, &validator).await
    }
}
