//! # workday CLI
//!
//! Working day/hour calculations for the Colombian calendar from the shell.
//!
//! ```text
//! workday calc --hours 1 --date 2025-04-11T22:00:00Z
//! workday holidays --year 2025 --offline
//! ```
//!
//! Results and calculation errors are JSON on stdout; logs go to stderr
//! (`RUST_LOG`, default `warn`).

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use workday_engine::{
    CalculationRequest, ErrorBody, StaticHolidaySource, SystemClock, WorkdayConfig, WorkdayService,
};

#[derive(Parser)]
#[command(name = "workday", version, about = "Colombian working day/hour calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add working days, then working hours, to an instant
    Calc {
        /// Working days to add
        #[arg(long, allow_hyphen_values = true)]
        days: Option<String>,

        /// Working hours to add
        #[arg(long, allow_hyphen_values = true)]
        hours: Option<String>,

        /// Anchor instant in UTC, e.g. 2025-04-10T15:00:00Z (default: now)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// List the holidays observed in a year
    Holidays {
        /// Calendar year
        #[arg(long)]
        year: i32,

        #[command(flatten)]
        provider: ProviderArgs,
    },
}

#[derive(Args)]
struct ProviderArgs {
    /// Skip the holiday provider and use the built-in rules only
    #[arg(long)]
    offline: bool,

    /// Holiday provider URL (overrides WORKDAY_HOLIDAYS_URL)
    #[arg(long, conflicts_with = "offline")]
    holidays_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Calc {
            days,
            hours,
            date,
            provider,
        } => {
            let service = build_service(&provider)?;
            let request =
                CalculationRequest::from_raw(days.as_deref(), hours.as_deref(), date.as_deref());
            let outcome = match request {
                Ok(request) => service.calculate(&request).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(result) => {
                    print_json(&result)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    print_json(&ErrorBody::from(&e))?;
                    Ok(if e.is_client_error() {
                        ExitCode::from(2)
                    } else {
                        ExitCode::FAILURE
                    })
                }
            }
        }
        Commands::Holidays { year, provider } => {
            let service = build_service(&provider)?;
            print_json(&service.holidays(year).await)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_service(provider: &ProviderArgs) -> Result<WorkdayService> {
    let mut config = WorkdayConfig::from_env().context("failed to load configuration")?;
    if let Some(url) = &provider.holidays_url {
        config.holidays_url = url.clone();
    }

    tracing::debug!(
        offline = provider.offline,
        holidays_url = %config.holidays_url,
        "building working-time service"
    );
    let service = if provider.offline {
        WorkdayService::with_source(
            &config,
            Arc::new(StaticHolidaySource::empty()),
            Arc::new(SystemClock),
        )
    } else {
        WorkdayService::from_config(&config)
    };
    service.context("failed to initialize working-time service")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
