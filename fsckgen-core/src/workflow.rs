//! End-to-end run: fetch metric names, parse them, write the script.
//!
//! The output file is only touched once the fetch and parse have both
//! succeeded, so a failed request never leaves a truncated script behind.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::Result;
use crate::config::FsckConfig;
use crate::error::redact_url;
use crate::fetch::MetricFetcher;
use crate::metrics::{count_empty, parse_metric_names};
use crate::script::{FsckDate, FsckScript, write_script};

/// Per-run overrides that do not live in the properties file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Start date taking precedence over `fsckDate`
    pub fsck_date: Option<String>,
}

impl RunOptions {
    /// Builder method to set the fsck start date.
    pub fn with_fsck_date(mut self, date: impl Into<String>) -> Self {
        self.fsck_date = Some(date.into());
        self
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Script location
    pub output: PathBuf,
    /// Lines written, one per metric name
    pub metric_count: usize,
    /// How many of those names were empty
    pub empty_names: usize,
    /// Start date used in every line
    pub fsck_date: FsckDate,
}

/// Fetches and parses the metric names for `config`.
///
/// # Errors
/// Propagates every [`MetricFetcher::fetch`] failure.
pub async fn fetch_metric_names(
    fetcher: &MetricFetcher,
    config: &FsckConfig,
) -> Result<Vec<String>> {
    let body = fetcher.fetch(&config.query_url()).await?;
    let names = parse_metric_names(&body);

    let empty = count_empty(&names);
    if empty > 0 {
        warn!(
            "{} of {} metric names are empty; the suggest API response may be malformed",
            empty,
            names.len()
        );
    }

    Ok(names)
}

/// Generates the fsck script described by `config`.
///
/// # Errors
/// - configuration error for an invalid fsck date (checked before any I/O)
/// - any fetch error; the output file is left untouched
/// - [`crate::FsckError::Io`] when the script cannot be written
pub async fn run(
    fetcher: &MetricFetcher,
    config: &FsckConfig,
    options: &RunOptions,
) -> Result<RunReport> {
    let fsck_date =
        FsckDate::resolve(options.fsck_date.as_deref(), config.fsck_date.as_deref())?;

    info!("Fetching metric names from {}", redact_url(&config.query_url()));
    let names = fetch_metric_names(fetcher, config).await?;
    info!("Parsed {} metric names", names.len());

    let output = PathBuf::from(&config.processed_file);
    let script = FsckScript::new(&config.root_dir, fsck_date);
    let metric_count = write_script(&output, &script, &names).await?;

    info!("Wrote fsck script to {}", output.display());

    Ok(RunReport {
        output,
        metric_count,
        empty_names: count_empty(&names),
        fsck_date,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::FsckError;

    #[test]
    fn test_run_options_builder() {
        let options = RunOptions::default().with_fsck_date("2015/03/01");
        assert_eq!(options.fsck_date.as_deref(), Some("2015/03/01"));
    }

    #[tokio::test]
    async fn test_invalid_date_fails_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("fsck.sh");
        std::fs::write(&output, "previous\n").unwrap();

        let config = FsckConfig {
            open_tsdb_url: "http://127.0.0.1:9".to_string(),
            api_query: "/api/suggest".to_string(),
            processed_file: output.display().to_string(),
            fsck_date: Some("not a date".to_string()),
            ..Default::default()
        };

        let fetcher = MetricFetcher::new().unwrap();
        let result = run(&fetcher, &config, &RunOptions::default()).await;

        assert!(matches!(result, Err(FsckError::Configuration { .. })));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous\n");
    }

    #[tokio::test]
    async fn test_empty_config_is_invalid_url() {
        let fetcher = MetricFetcher::new().unwrap();
        let result = run(&fetcher, &FsckConfig::default(), &RunOptions::default()).await;

        assert!(matches!(result, Err(FsckError::InvalidUrl { .. })));
    }
}
