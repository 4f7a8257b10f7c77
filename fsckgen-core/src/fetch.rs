//! Retrieval of metric names from the OpenTSDB suggest API.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::{FsckError, redact_url};

/// How a response status is treated.
///
/// Mirrors the rule the script writer has always applied: only `200` is a
/// success, anything above `301` (or a missing status, `0`) is an error, and
/// the remaining codes (informational, `201`-`301`) are neither. Those fall
/// through with an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// `200 OK`, the body holds the metric list
    Success,
    /// An error status reported as [`FsckError::HttpStatus`]
    Failure,
    /// Neither success nor failure; treated as an empty body
    Unhandled,
}

impl StatusClass {
    /// Classifies a raw HTTP status code.
    pub const fn classify(status: u16) -> Self {
        match status {
            200 => Self::Success,
            0 => Self::Failure,
            s if s > 301 => Self::Failure,
            _ => Self::Unhandled,
        }
    }
}

/// Issues the suggest API request.
///
/// No timeout is configured and nothing is retried.
#[derive(Debug, Clone)]
pub struct MetricFetcher {
    client: reqwest::Client,
}

impl MetricFetcher {
    /// Creates a fetcher with a default HTTP client.
    ///
    /// # Errors
    /// Returns [`FsckError::HttpClient`] if the TLS backend cannot be set up.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|source| FsckError::HttpClient { source })?;
        Ok(Self { client })
    }

    /// Performs one GET against `url` and returns the body text.
    ///
    /// The body is decoded as UTF-8 and normalized line by line: every line
    /// (CRLF, CR or LF terminated) is followed by a single `\n`.
    ///
    /// # Errors
    /// - [`FsckError::InvalidUrl`] when `url` does not parse
    /// - [`FsckError::Transport`] when no response is received
    /// - [`FsckError::HttpStatus`] for a [`StatusClass::Failure`] status
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|source| FsckError::InvalidUrl {
            url: redact_url(url),
            source,
        })?;

        debug!("GET {}", redact_url(url));

        let transport = |source| FsckError::Transport {
            url: redact_url(url),
            source,
        };

        let response = self
            .client
            .get(parsed.as_str())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        match StatusClass::classify(status) {
            StatusClass::Success => {
                let bytes = response.bytes().await.map_err(transport)?;
                let body = normalize_lines(&String::from_utf8_lossy(&bytes));
                info!("Received {} bytes from suggest API", body.len());
                Ok(body)
            }
            StatusClass::Failure => Err(FsckError::http_status(status, url)),
            StatusClass::Unhandled => {
                warn!(
                    "Suggest API returned HTTP {} for {}; continuing with an empty body",
                    status,
                    redact_url(url)
                );
                Ok(String::new())
            }
        }
    }
}

/// Re-terminates every line of `text` with `\n`.
pub(crate) fn normalize_lines(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified.lines().fold(String::with_capacity(unified.len()), |mut acc, line| {
        acc.push_str(line);
        acc.push('\n');
        acc
    })
}
