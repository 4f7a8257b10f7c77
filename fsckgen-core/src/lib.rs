//! Core of the OpenTSDB fsck script writer.
//!
//! Loads `server.properties`, asks the OpenTSDB suggest API for every metric
//! name, and writes a shell script with one `tsdb fsck ... --fix` line per
//! metric. The script is meant to be run later against the store, typically
//! from the same scheduler that runs this tool.
//!
//! # Guarantees
//! - One read-only HTTP GET per run, no retries
//! - The script file is only replaced after a successful fetch and parse
//! - Credentials embedded in the database URL are masked in logs and errors

pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod script;
pub mod workflow;

// Re-export commonly used types
pub use config::{DEFAULT_CONFIG_PATH, FsckConfig, Properties};
pub use error::{FsckError, Result};
pub use fetch::{MetricFetcher, StatusClass};
pub use logging::init_logging;
pub use metrics::parse_metric_names;
pub use script::{DEFAULT_FSCK_DATE, FsckDate, FsckScript, write_script};
pub use workflow::{RunOptions, RunReport, fetch_metric_names, run};
