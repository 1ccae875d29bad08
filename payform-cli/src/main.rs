//! payform CLI entry point: card form -> validate -> pay -> poll status.

mod commands;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;

use payform_core::{AgentError, GatewayConfig, OutputMode};

use commands::inspect::MaskedField;
use commands::pay::PayArgs;
use commands::{Context, ExitCode};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Auto,
    Json,
    Human,
}

#[derive(Debug, Parser)]
#[command(name = "payform", version)]
#[command(about = "Card payment form: mask and validate card details, pay over JSON-RPC, track the payment status")]
struct Cli {
    /// Output format: auto (tty=human, pipe=agent), json (agent), human (operator).
    #[arg(long, value_enum, default_value = "auto", global = true)]
    output: OutputFormat,

    /// Base URL of the payment service (overrides PAYFORM_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Milliseconds between status checks (overrides PAYFORM_POLL_INTERVAL_MS).
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Log at debug level (default: warn for human output, off for JSON).
    /// RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Fill in the card form, pay and follow the payment status.
    Pay {
        /// Card form JSON document (cardNumber, expiration, cvv, fullName).
        /// Required in agent mode; prompts interactively otherwise.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Skip the confirmation prompt (required in agent mode).
        #[arg(long)]
        force: bool,

        /// Print the payment identifier and exit instead of polling.
        #[arg(long)]
        no_wait: bool,
    },
    /// Open the status page of a payment and poll until it resolves.
    Status { pid: String },
    /// Check a card form JSON document without sending anything.
    Validate {
        #[arg(long)]
        input: PathBuf,
    },
    /// Show how a raw keystroke sequence is masked.
    Format {
        #[arg(value_enum)]
        field: MaskedField,
        raw: String,
    },
    /// Resolve a navigation path to a page.
    Route { path: String },
}

/// Detect output mode based on CLI flags and TTY detection.
fn detect_output_mode(output: OutputFormat) -> OutputMode {
    match output {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Agent,
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputMode::Human
            } else {
                OutputMode::Agent
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = GatewayConfig::from_env().context("failed to load configuration")?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(interval) = cli.poll_interval_ms {
        config.poll_interval_ms = interval;
    }
    config.validate().context("invalid payment service configuration")?;
    Ok(config)
}

async fn run(cli: Cli, mode: OutputMode) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    tracing::debug!(?mode, api_url = %config.api_url, "configuration loaded");
    let ctx = Context { mode, config };

    match cli.command {
        Command::Pay {
            input,
            force,
            no_wait,
        } => {
            commands::pay::run(
                &ctx,
                &PayArgs {
                    input,
                    force,
                    no_wait,
                },
            )
            .await
        }
        Command::Status { pid } => commands::status::run(&ctx, &pid).await,
        Command::Validate { input } => commands::validate::run(&ctx, &input),
        Command::Format { field, raw } => commands::inspect::format(&ctx, field, &raw),
        Command::Route { path } => commands::inspect::route(&ctx, &path),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mode = detect_output_mode(cli.output);
    if cli.no_color {
        colored::control::set_override(false);
    }
    logging::init(mode, cli.verbose, cli.no_color);

    let code = match run(cli, mode).await {
        Ok(code) => code,
        Err(err) => {
            match mode {
                OutputMode::Human => eprintln!("error: {err:#}"),
                OutputMode::Agent => {
                    let payload = AgentError {
                        error: "usage_error".to_string(),
                        code: ExitCode::Usage.as_i32(),
                        message: Some(format!("{err:#}")),
                        details: None,
                    };
                    if render::emit_agent_error(payload).is_err() {
                        eprintln!("error: {err:#}");
                    }
                }
            }
            ExitCode::Usage
        }
    };

    std::process::exit(code.as_i32());
}
