//! Silently - runs the suppression scenarios and reports what each runner
//! really suppressed.

mod narrate;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use silently_config::SilentlyConfig;
use silently_driver::{Driver, DriverOptions, RunReport};
use silently_types::OrphanPolicy;

use narrate::Narration;

const EXIT_EXPECTATION_FAILED: u8 = 1;
const EXIT_ORPHAN_ESCALATED: u8 = 2;
/// `EX_CONFIG` from sysexits.h.
const EXIT_CONFIG: u8 = 78;

#[derive(Parser)]
#[command(name = "silently")]
#[command(about = "Show which failures a run-and-suppress combinator actually suppresses")]
struct Cli {
    /// Run the scenarios that fail after launch
    #[arg(long)]
    with_failures: bool,

    /// Drop a failing deferred without observing it
    #[arg(long)]
    fire_and_forget: bool,

    /// What to do with failures nobody observed
    #[arg(long, value_name = "swallow|log|escalate")]
    policy: Option<OrphanPolicy>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn driver_options(&self, config: &SilentlyConfig) -> DriverOptions {
        DriverOptions {
            orphan_policy: self.policy.unwrap_or(config.orphan_policy),
            async_failures: self.with_failures || config.scenarios.async_failures,
            fire_and_forget: self.fire_and_forget || config.scenarios.fire_and_forget,
        }
    }
}

/// Logs go to stderr so that stdout stays parseable under `--json`.
fn init_tracing(configured: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| configured.map_or_else(|| EnvFilter::try_new("info"), EnvFilter::try_new))
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn exit_code(report: &RunReport) -> ExitCode {
    if !report.all_passed() {
        ExitCode::from(EXIT_EXPECTATION_FAILED)
    } else if report.escalated {
        ExitCode::from(EXIT_ORPHAN_ESCALATED)
    } else {
        ExitCode::SUCCESS
    }
}

async fn run(options: DriverOptions, json: bool) -> Result<RunReport> {
    let driver = Driver::current(options).context("Failed to start the scenario driver")?;
    let report = driver.run().await;

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &report).context("Failed to write JSON report")?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", Narration(&report)).context("Failed to write report")?;
    }
    stdout.flush()?;

    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SilentlyConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            let err = anyhow::Error::new(err).context("Failed to load configuration");
            eprintln!("Error: {err:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(config.log_filter.as_deref());

    let options = cli.driver_options(&config);
    tracing::debug!(?options, "Starting run");

    match run(options, cli.json).await {
        Ok(report) => exit_code(&report),
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
