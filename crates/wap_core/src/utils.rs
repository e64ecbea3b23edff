//! Path helpers shared by the builders.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Lexically normalizes a path: drops `.` components and folds `..` into the
/// preceding component. Does not touch the filesystem, so the path need not exist.
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_str()),
        }
    }
    normalized
}

/// Joins a relative path onto the current directory, then normalizes it.
pub fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = std::env::current_dir().map_err(|source| Error::io(path, source))?;
    Ok(normalize_path(&utf8_path(cwd)?.join(path)))
}

pub fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(Error::NonUtf8Path)
}

/// Final component of `path` as a string, or the whole path if it has none.
pub fn file_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}
