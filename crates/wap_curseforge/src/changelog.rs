use camino::{Utf8Path, Utf8PathBuf};
use wap_project::ChangelogType;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    pub text: String,
    pub kind: ChangelogType,
}

impl Changelog {
    /// Changelog type implied by a file extension, if any.
    pub fn type_for_extension(path: &Utf8Path) -> Option<ChangelogType> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "md" | "markdown" => Some(ChangelogType::Markdown),
            "html" => Some(ChangelogType::Html),
            "txt" => Some(ChangelogType::Text),
            _ => None,
        }
    }

    pub fn from_text(text: impl Into<String>, kind: Option<ChangelogType>) -> Self {
        Self {
            text: text.into(),
            kind: kind.unwrap_or_default(),
        }
    }

    /// Reads a changelog file. Without an explicit `kind`, the type is taken from the
    /// extension and falls back to text.
    pub fn from_path(path: &Utf8Path, kind: Option<ChangelogType>) -> Result<Self> {
        let kind = kind
            .or_else(|| Self::type_for_extension(path))
            .unwrap_or_default();

        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => Error::ChangelogMissing(path.to_owned()),
            _ => Error::Io {
                path: path.to_owned(),
                source,
            },
        })?;
        let text = String::from_utf8(bytes).map_err(|_| Error::Encoding(Utf8PathBuf::from(path)))?;

        Ok(Self { text, kind })
    }
}
