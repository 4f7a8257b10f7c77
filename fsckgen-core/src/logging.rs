//! Stderr logging for fsckgen runs, driven by the `-v`/`-q` flags.

use crate::Result;
use crate::error::FsckError;

/// Maps the CLI verbosity flags onto a tracing level.
///
/// `quiet` wins over any `-v` count.
pub const fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Installs the global `tracing` subscriber for a fsckgen run.
///
/// Everything goes to stderr. Scheduled jobs capture it as the job log, and
/// stdout stays reserved for `list-metrics` names and `show-config` JSON.
/// The level comes from [`level_for`].
///
/// # Errors
/// Returns a configuration error if a subscriber is already installed.
///
/// ```rust,no_run
/// use fsckgen_core::logging::init_logging;
///
/// // `fsckgen -vv` traces every step of the run
/// if let Err(e) = init_logging(2, false) {
///     eprintln!("fsckgen: {}", e);
/// }
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| FsckError::configuration(format!("Cannot install stderr logger: {}", e)))
}
