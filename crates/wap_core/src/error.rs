//! Error types for build operations.
//!
//! All fallible functions in this crate return [`Result<T>`]. Recoverable
//! problems (empty include globs, overwritten files, overridden tags) are not
//! errors; they are recorded in a [`Report`](crate::Report) instead.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`], used by callers to pick exit codes and hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Usage,
    PathExists,
    PathMissing,
    PathType,
    TagMalformed,
    PlatformCapability,
    Io,
    Watch,
}

/// Errors that can occur while building, linking or watching a package.
#[derive(Error, Debug)]
pub enum Error {
    /// Two addons resolve to the same source directory.
    #[error("Addon paths should be unique. Found duplicate for {0}")]
    DuplicateAddonPath(Utf8PathBuf),

    /// An include pattern is not a valid glob.
    #[error("Include pattern \"{pattern}\" is invalid: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The configuration could not be loaded (only raised when re-reading it in watch mode).
    #[error(transparent)]
    Project(#[from] wap_project::Error),

    /// `auto` linking was combined with explicit flavors.
    #[error("If linking \"auto\", it should be the only provided link option")]
    AutoLinkWithFlavors,

    #[error("{message}")]
    PathExists {
        path: Utf8PathBuf,
        message: String,
    },

    #[error("{message}")]
    PathMissing {
        path: Utf8PathBuf,
        message: String,
    },

    #[error("{message}")]
    PathType {
        path: Utf8PathBuf,
        message: String,
    },

    /// A TOC tag name cannot be represented on a `## Name: Value` line.
    #[error("TOC tag name {0:?} should not be empty or contain spaces, colons or newlines")]
    MalformedTag(String),

    #[error("{message}")]
    Platform { message: String, hint: String },

    /// A path handed to us by the OS is not valid UTF-8.
    #[error("Path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateAddonPath(_) | Error::InvalidGlob { .. } | Error::Project(_) => {
                ErrorKind::Configuration
            }
            Error::AutoLinkWithFlavors => ErrorKind::Usage,
            Error::PathExists { .. } => ErrorKind::PathExists,
            Error::PathMissing { .. } => ErrorKind::PathMissing,
            Error::PathType { .. } | Error::NonUtf8Path(_) => ErrorKind::PathType,
            Error::MalformedTag(_) => ErrorKind::TagMalformed,
            Error::Platform { .. } => ErrorKind::PlatformCapability,
            Error::Io { .. } => ErrorKind::Io,
            Error::Watch(_) => ErrorKind::Watch,
        }
    }

    /// A suggested remedy, when the fix is not obvious from the message.
    pub fn hint(&self) -> Option<String> {
        match self {
            Error::DuplicateAddonPath(_) => {
                Some("Each entry of \"package\" should point at a different directory".to_string())
            }
            Error::Platform { hint, .. } => Some(hint.clone()),
            Error::PathExists { message, .. } if message.contains("symlink") => Some(
                "Delete the existing path, or pass --link-force to replace it automatically"
                    .to_string(),
            ),
            _ => None,
        }
    }

    pub(crate) fn path_exists(path: &Utf8Path, message: impl Into<String>) -> Self {
        Error::PathExists {
            path: path.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn path_missing(path: &Utf8Path, message: impl Into<String>) -> Self {
        Error::PathMissing {
            path: path.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn path_type(path: &Utf8Path, message: impl Into<String>) -> Self {
        Error::PathType {
            path: path.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// Attaches a path to `std::io::Error`s.
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: &Utf8Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: &Utf8Path) -> Result<T> {
        self.map_err(|source| Error::io(path, source))
    }
}
