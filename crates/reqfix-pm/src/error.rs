use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqfixError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse {}: {source}", path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // Conflict-fix table errors
    #[error("Invalid conflict fix rule \"{constraint}\": {reason}")]
    InvalidRule { constraint: String, reason: String },

    // External process errors
    #[error("Could not run {program}: {reason}")]
    OracleUnavailable { program: String, reason: String },

    #[error("{program} timed out after {limit:?}")]
    Timeout { program: String, limit: Duration },

    // Version lookup errors
    #[error("No version found for {package}: {reason}")]
    LookupMiss { package: String, reason: String },

    // Ladder errors
    #[error("All strategies failed to produce a resolvable manifest")]
    AllStrategiesFailed,
}

pub type Result<T> = std::result::Result<T, ReqfixError>;
