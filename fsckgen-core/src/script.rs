//! The fsck script: one `tsdb fsck` invocation per metric.
//!
//! Each line has the form
//! `<rootDir>/build/tsdb fsck <YYYY/MM/DD> sum <metric> --fix`.

use std::path::Path;

use chrono::NaiveDate;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::Result;
use crate::error::FsckError;

/// Start date used when neither the CLI nor the properties file sets one.
pub const DEFAULT_FSCK_DATE: &str = "2014/07/01";

const DATE_FORMAT: &str = "%Y/%m/%d";

/// Start date argument of `tsdb fsck`, rendered as `YYYY/MM/DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsckDate(NaiveDate);

impl FsckDate {
    /// Parses a `YYYY/MM/DD` date.
    ///
    /// # Errors
    /// Returns a configuration error for anything that is not a calendar date
    /// in that layout.
    pub fn parse(raw: &str) -> Result<Self> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|e| {
                FsckError::configuration(format!(
                    "fsck date '{}' is not a YYYY/MM/DD date: {}",
                    raw, e
                ))
            })
    }

    /// Picks the first date that is set: command line, then properties file,
    /// then [`DEFAULT_FSCK_DATE`].
    pub fn resolve(cli: Option<&str>, properties: Option<&str>) -> Result<Self> {
        cli.or(properties).map_or_else(|| Ok(Self::default()), Self::parse)
    }
}

impl Default for FsckDate {
    fn default() -> Self {
        Self(NaiveDate::from_ymd_opt(2014, 7, 1).unwrap_or_default())
    }
}

impl std::fmt::Display for FsckDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl std::str::FromStr for FsckDate {
    type Err = FsckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Line template for one installation root and start date.
#[derive(Debug, Clone)]
pub struct FsckScript<'a> {
    root_dir: &'a str,
    date: FsckDate,
}

impl<'a> FsckScript<'a> {
    /// Creates the template. `root_dir` is used verbatim.
    pub const fn new(root_dir: &'a str, date: FsckDate) -> Self {
        Self { root_dir, date }
    }

    /// Renders the command line for `metric`, without a line terminator.
    ///
    /// # Example
    /// ```rust
    /// use fsckgen_core::script::{FsckDate, FsckScript};
    ///
    /// let script = FsckScript::new("/opt/tsdb", FsckDate::default());
    /// assert_eq!(script.line("cpu"), "/opt/tsdb/build/tsdb fsck 2014/07/01 sum cpu --fix");
    /// ```
    pub fn line(&self, metric: &str) -> String {
        format!(
            "{}/build/tsdb fsck {} sum {} --fix",
            self.root_dir, self.date, metric
        )
    }

    /// Renders the whole script, every line `\n` terminated.
    pub fn render(&self, metrics: &[String]) -> String {
        metrics.iter().fold(String::new(), |mut acc, metric| {
            acc.push_str(&self.line(metric));
            acc.push('\n');
            acc
        })
    }
}

/// Writes one line per metric to `path`, replacing any existing file.
///
/// Returns the number of lines written.
///
/// # Errors
/// Returns [`FsckError::Io`] if the file cannot be created or written.
pub async fn write_script(
    path: &Path,
    script: &FsckScript<'_>,
    metrics: &[String],
) -> Result<usize> {
    let io_error =
        |action: &str, e| FsckError::io(format!("Failed to {} {}", action, path.display()), e);

    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| io_error("open for writing", e))?;
    let mut writer = BufWriter::new(file);

    for metric in metrics {
        let mut line = script.line(metric);
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| io_error("write to", e))?;
    }

    writer.flush().await.map_err(|e| io_error("flush", e))?;
    debug!("Wrote {} lines to {}", metrics.len(), path.display());

    Ok(metrics.len())
}
