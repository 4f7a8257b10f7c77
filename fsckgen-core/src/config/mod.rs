//! Configuration loading.
//!
//! - `Properties`: the `.properties` text format reader
//! - `FsckConfig`: typed settings built from the recognized keys

mod fsck_config;
mod properties;

pub use fsck_config::{DEFAULT_CONFIG_PATH, FsckConfig, keys};
pub use properties::Properties;
