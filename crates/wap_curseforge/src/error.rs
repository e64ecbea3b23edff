use camino::Utf8PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Changelog file {0} cannot be decoded as UTF-8")]
    Encoding(Utf8PathBuf),

    #[error("Changelog path {0} does not exist")]
    ChangelogMissing(Utf8PathBuf),

    /// The server answered with a non-success status.
    #[error("HTTP error from CurseForge during {activity}: '{status}'. Response body: {body}")]
    Api {
        activity: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP request to CurseForge failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from CurseForge: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CurseForge does not know about version {version} for flavor {flavor}. Does it actually exist?")]
    UnknownGameVersion { flavor: String, version: String },
}
