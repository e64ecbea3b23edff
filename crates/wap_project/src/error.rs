use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A location in the configuration tree that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// JSON-path-like location of the offending value, e.g. `$.package[0].path`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at path {}", self.message, self.path)
    }
}

/// Errors that can occur while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file \"{0}\" should be utf-8")]
    Encoding(Utf8PathBuf),

    #[error("Config file \"{path}\" should be well-formed JSON: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file \"{path}\" should be well-formed TOML: {source}")]
    Toml {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unsupported config file extension for {0}, expected .json or .toml")]
    UnsupportedExtension(Utf8PathBuf),

    #[error("Invalid configuration: {0}")]
    Schema(SchemaError),

    #[error("Invalid version \"{0}\", expected dotted form like 9.2.7")]
    InvalidVersion(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}
