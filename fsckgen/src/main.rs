//! OpenTSDB fsck script writer.
//!
//! Asks an OpenTSDB instance for every metric name through the suggest API
//! and writes a shell script with one `tsdb fsck ... --fix` line per metric.
//! Intended to run from a scheduled job; all settings come from
//! `server.properties`.
//!
//! # Exit status
//! Failures are logged and the process still exits 0, which is what existing
//! job definitions expect. Pass `--strict` to exit 1 whenever anything was
//! logged as a failure.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fsckgen_core::{
    DEFAULT_CONFIG_PATH, FsckConfig, MetricFetcher, RunOptions, fetch_metric_names, init_logging,
    run,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fsckgen")]
#[command(about = "Generates an OpenTSDB fsck script from the metric suggest API")]
#[command(version)]
#[command(long_about = "
fsckgen - OpenTSDB fsck script writer

Reads server.properties, fetches every metric name from the OpenTSDB suggest
API (openTSDBUrl + apiQuery) and writes processedFile with one line per metric:

  <rootDir>/build/tsdb fsck 2014/07/01 sum <metric> --fix

The script is only replaced after the metric list was fetched successfully.

EXAMPLES:
  fsckgen
  fsckgen --config /etc/opentsdb/server.properties generate
  fsckgen --fsck-date 2015/01/01 --strict
  fsckgen list-metrics
")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Fetch metric names and write the fsck script (default)
    Generate,
    /// Print the metric names the suggest API returns, one per line
    ListMetrics,
    /// Print the loaded configuration as JSON
    ShowConfig,
}

#[derive(Args)]
struct GlobalArgs {
    /// Properties file
    #[arg(
        short,
        long,
        global = true,
        env = "FSCKGEN_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Path to server.properties"
    )]
    config: PathBuf,

    /// Start date for every fsck line
    #[arg(
        long,
        global = true,
        value_name = "YYYY/MM/DD",
        help = "Overrides fsckDate from the properties file (default 2014/07/01)"
    )]
    fsck_date: Option<String>,

    /// Exit non-zero on failure
    #[arg(
        long,
        global = true,
        help = "Exit with status 1 if any step failed instead of always exiting 0"
    )]
    strict: bool,

    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut failed = !setup_logging(&cli.global);

    let (config, load_error) = FsckConfig::load_or_default(&cli.global.config);
    failed |= load_error.is_some();

    let outcome = match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => generate(&config, &cli.global).await,
        Command::ListMetrics => list_metrics(&config).await,
        Command::ShowConfig => show_config(&config),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        failed = true;
    }

    if exits_with_failure(failed, cli.global.strict) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Installs the stderr logger. Returns `false` if that failed; the run
/// continues without logs and only `--strict` turns it into a failure.
fn setup_logging(global: &GlobalArgs) -> bool {
    match init_logging(global.verbose, global.quiet) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("fsckgen: {}", e);
            false
        }
    }
}

/// Runs the full fetch, parse and write workflow
async fn generate(config: &FsckConfig, global: &GlobalArgs) -> anyhow::Result<()> {
    info!("Generating fsck script: {}", config);

    let fetcher = MetricFetcher::new()?;
    let mut options = RunOptions::default();
    if let Some(date) = &global.fsck_date {
        options = options.with_fsck_date(date.as_str());
    }

    let report = run(&fetcher, config, &options).await?;

    info!(
        "✓ Wrote {} fsck lines (start date {}) to {}",
        report.metric_count,
        report.fsck_date,
        report.output.display()
    );
    Ok(())
}

/// Prints metric names without touching the script
async fn list_metrics(config: &FsckConfig) -> anyhow::Result<()> {
    let fetcher = MetricFetcher::new()?;
    let names = fetch_metric_names(&fetcher, config).await?;

    print_lines(&mut io::stdout().lock(), &names).context("Failed to print metric names")?;
    info!("{} metric names", names.len());
    Ok(())
}

/// Prints the configuration as pretty JSON
fn show_config(config: &FsckConfig) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
    print_lines(&mut io::stdout().lock(), [json]).context("Failed to print configuration")?;
    Ok(())
}

/// Writes one line per item. A reader that went away early, as in
/// `fsckgen list-metrics | head -1`, is not an error.
fn print_lines<W, I>(out: &mut W, lines: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: Display,
{
    let written = lines
        .into_iter()
        .try_for_each(|line| writeln!(out, "{}", line))
        .and_then(|()| out.flush());

    match written {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Failures only change the exit status in strict mode.
const fn exits_with_failure(failed: bool, strict: bool) -> bool {
    failed && strict
}
