//! reconhawk - subdomain discovery and liveness recon chain
//!
//! `reconhawk example.com` runs subfinder against the target, probes every
//! discovered host with httpx, and prints the hosts that answered. Both
//! stages' results are kept under `~/recon_results`.

use anyhow::{Context, Result};
use clap::Parser;
use reconhawk_core::{
    init_tracing, ReconConfig, ReconError, ReconPipeline, Reporter, ReporterConfig, RunStamp,
    Target,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "reconhawk")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Subdomain discovery and liveness recon chain", long_about = None)]
struct Cli {
    /// Target domain (prompted for when omitted)
    target: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Directory receiving the run's artifacts (default: ~/recon_results)
    #[arg(long, env = "RECONHAWK_RESULTS_DIR")]
    results_dir: Option<PathBuf>,

    /// Kill an engine that runs longer than this many seconds (0 = never)
    #[arg(long, env = "RECONHAWK_STAGE_TIMEOUT_SECS", default_value_t = 0)]
    stage_timeout: u64,

    /// Disable colored output (also honoured via NO_COLOR)
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(cli.json, level);

    let mut reporter = Reporter::stdout(ReporterConfig { color: cli.color() });
    match run(cli, &mut reporter).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[!] {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, reporter: &mut Reporter) -> Result<ExitCode> {
    let raw = match &cli.target {
        Some(target) => target.clone(),
        None => prompt_target(reporter)?,
    };

    let target = match Target::parse(&raw) {
        Ok(target) => target,
        Err(e) => return fail(reporter, e),
    };

    let results_root = match cli.results_dir.clone() {
        Some(dir) => dir,
        None => match ReconConfig::default_results_root() {
            Ok(dir) => dir,
            Err(e) => return fail(reporter, e),
        },
    };

    let config = ReconConfig::new(results_root)
        .with_stage_timeout(Some(Duration::from_secs(cli.stage_timeout)));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping current stage");
            interrupt.cancel();
        }
    });

    let pipeline = ReconPipeline::new(config);
    match pipeline.run(&target, RunStamp::now(), reporter, &cancel).await {
        Ok(outcome) => {
            info!(
                target = %outcome.target,
                subdomains = outcome.subdomain_count,
                alive = outcome.alive_count(),
                "Recon chain finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        // Already reported by the pipeline.
        Err(e) => Ok(exit_code(&e)),
    }
}

fn prompt_target(reporter: &mut Reporter) -> Result<String> {
    reporter
        .prompt("[?] Target domain: ")
        .context("Failed to write prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read target from stdin")?;
    Ok(answer)
}

fn fail<W: Write>(reporter: &mut Reporter<W>, err: ReconError) -> Result<ExitCode> {
    reporter.error(&err).context("Failed to write report")?;
    Ok(exit_code(&err))
}

fn exit_code(err: &ReconError) -> ExitCode {
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}
