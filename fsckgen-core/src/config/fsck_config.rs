//! Typed settings loaded from `server.properties`.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, error};

use super::Properties;
use crate::error::{FsckError, redact_url};

/// Location of the properties file when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "resources/server.properties";

/// Property keys recognized by [`FsckConfig::from_properties`].
pub mod keys {
    /// Base URL of the OpenTSDB instance
    pub const OPEN_TSDB_URL: &str = "openTSDBUrl";
    /// Path of the data point put API
    pub const API_PUT: &str = "apiPut";
    /// Path of the metric suggest API
    pub const API_QUERY: &str = "apiQuery";
    /// Parameters the upstream device feed supports
    pub const AWARE_SUPPORTED_PARAMS: &str = "awareSupportedParams";
    /// Subject id mapping workbook
    pub const ID_MATCH: &str = "idMatch";
    /// Sheet inside the id mapping workbook
    pub const ID_MATCH_SHEET: &str = "idMatchSheet";
    /// Where the generated script is written
    pub const PROCESSED_FILE: &str = "processedFile";
    /// OpenTSDB checkout containing `build/tsdb`
    pub const ROOT_DIR: &str = "rootDir";
    /// Folder holding source data files
    pub const FOLDER_PATH: &str = "folderPath";
    /// Study identifier
    pub const STUDY_STRING: &str = "studyString";
    /// Start date passed to `tsdb fsck`
    pub const FSCK_DATE: &str = "fsckDate";
}

/// Settings for one fsck script generation run.
///
/// Every field holds the properties value verbatim; a missing key leaves the
/// field empty. Only `open_tsdb_url`, `api_query`, `processed_file`,
/// `root_dir` and `fsck_date` drive behaviour, the remaining fields are
/// carried so the whole `server.properties` shared with the loader tooling
/// round-trips through `show-config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FsckConfig {
    /// Base URL of the OpenTSDB instance
    #[serde(rename = "openTSDBUrl")]
    pub open_tsdb_url: String,
    /// Put API path (unused here)
    pub api_put: String,
    /// Suggest API path, appended to the base URL
    pub api_query: String,
    /// Supported feed parameters (unused here)
    pub aware_supported_params: String,
    /// Id mapping workbook (unused here)
    pub id_match: String,
    /// Id mapping sheet (unused here)
    pub id_match_sheet: String,
    /// Output script path
    pub processed_file: String,
    /// OpenTSDB installation root prefixed to `/build/tsdb`
    pub root_dir: String,
    /// Source data folder (unused here)
    pub folder_path: String,
    /// Study identifier (unused here)
    pub study_string: String,
    /// Raw `fsckDate` value, validated when the script is rendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fsck_date: Option<String>,
}

impl FsckConfig {
    /// Builds the settings from parsed properties.
    pub fn from_properties(props: &Properties) -> Self {
        let field = |key: &str| props.get(key).unwrap_or_default().to_string();

        Self {
            open_tsdb_url: field(keys::OPEN_TSDB_URL),
            api_put: field(keys::API_PUT),
            api_query: field(keys::API_QUERY),
            aware_supported_params: field(keys::AWARE_SUPPORTED_PARAMS),
            id_match: field(keys::ID_MATCH),
            id_match_sheet: field(keys::ID_MATCH_SHEET),
            processed_file: field(keys::PROCESSED_FILE),
            root_dir: field(keys::ROOT_DIR),
            folder_path: field(keys::FOLDER_PATH),
            study_string: field(keys::STUDY_STRING),
            fsck_date: props.get(keys::FSCK_DATE).map(str::to_string),
        }
    }

    /// Reads and parses the properties file at `path`.
    ///
    /// The file is ISO-8859-1: every byte maps to the code point of the same
    /// value. Characters outside Latin-1 are written as `\uXXXX` escapes.
    ///
    /// # Errors
    /// Returns [`FsckError::ConfigLoad`] if the file cannot be read.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| FsckError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let text: String = bytes.iter().copied().map(char::from).collect();

        let props = Properties::parse(&text);
        debug!("Loaded {} properties from {}", props.len(), path.display());

        Ok(Self::from_properties(&props))
    }

    /// Loads the configuration, falling back to an all-empty default.
    ///
    /// A load failure is logged and handed back alongside the default so the
    /// caller can still account for it when choosing an exit code. The run
    /// itself carries on, which normally ends in an `InvalidUrl` error once
    /// the empty base URL is used.
    pub fn load_or_default(path: &Path) -> (Self, Option<FsckError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => {
                error!("{}: {:?}", e, e);
                (Self::default(), Some(e))
            }
        }
    }

    /// Full URL of the metric suggest endpoint: base URL and query path
    /// joined as-is.
    pub fn query_url(&self) -> String {
        format!("{}{}", self.open_tsdb_url, self.api_query)
    }
}

impl std::fmt::Display for FsckConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FsckConfig({} -> {})",
            redact_url(&self.query_url()),
            self.processed_file
        )
    }
}
