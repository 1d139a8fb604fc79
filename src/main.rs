use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use ops_status::{
    build_store, handle_clock_invocation, init_telemetry, AppConfig, ErrorKind, HandlerError,
    StatusDispatcher, SystemClock,
};

#[derive(Parser)]
#[command(name = "ops-status")]
#[command(about = "Operational status toggles and business-hours check")]
#[command(long_about = "Runs the status and clock functions locally. The status function reads an \
                       invocation event ({\"Details\": {\"Parameters\": {...}}}) and prints the \
                       response JSON on stdout.")]
struct Cli {
    /// Configuration file (defaults to ./ops-status.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke the status function
    Status {
        /// Event file; stdin is read when omitted
        #[arg(long, help = "Path to the invocation event JSON, or '-' for stdin")]
        event: Option<PathBuf>,
    },
    /// Invoke the business-hours clock function
    Clock,
    /// Print the effective configuration as TOML
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    AppConfig::load_env_file().context("Failed to load .env file")?;
    let config = AppConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;

    let outcome = match cli.command {
        Commands::Status { event } => tokio::runtime::Runtime::new()?
            .block_on(async { status_command(&config, event.as_deref()).await }),
        Commands::Clock => clock_command(&config),
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        if let Some(handler_error) = e.downcast_ref::<HandlerError>() {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code(handler_error.kind()));
        }
    }
    outcome
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::StoreAccess => 3,
        ErrorKind::ConfigFormat => 4,
    }
}

async fn status_command(config: &AppConfig, event_path: Option<&Path>) -> Result<()> {
    let raw = read_event(event_path).await?;
    let event: serde_json::Value = if raw.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(&raw).context("Invocation event is not valid JSON")?
    };

    let dispatcher = StatusDispatcher::from_config(config, build_store(&config.store));
    let response = dispatcher.handle_event(event).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn read_event(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display())),
        _ => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read event from stdin")?;
            Ok(raw)
        }
    }
}

fn clock_command(config: &AppConfig) -> Result<()> {
    let response = handle_clock_invocation(&config.business_hours, &SystemClock)?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
