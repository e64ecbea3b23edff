//! TOC (table of contents) manifest generation and parsing.
//!
//! The game client discovers an addon through `<AddonDir>/<AddonDir><suffix>.toc`,
//! a text file of `## Tag: Value` lines followed by the Lua/XML files to load.
//!
//! Notes on how the client reads these files:
//! - The folder name must match the TOC file prefix (`Foo/Foo.toc`, not `Foo/Bar.toc`).
//! - For a player with locale `xxXX`, both `Title` and `Title-xxXX` match, and the
//!   *last* matching line wins. The same holds for `Notes`. Localized tags are
//!   therefore always emitted after every other tag.
//! - File lines use Windows path separators.

use camino::Utf8Path;
use chrono::{DateTime, SecondsFormat, Utc};
use wap_project::{TocConfig, WowVersion};

use crate::error::{Error, Result};
use crate::report::Report;

/// Locale codes understood by the client.
const LANGUAGE_REGIONS: [&str; 15] = [
    "deDE", "enGB", "enUS", "esES", "frFR", "koKR", "zhCN", "zhTW", "enCN", "enTW", "esMX",
    "ruRU", "ptBR", "ptPT", "itIT",
];

const LOCALIZABLE_TAGS: [&str; 2] = ["Title", "Notes"];

const OFFICIAL_TAGS: [&str; 17] = [
    "Title",
    "Notes",
    "Interface",
    "Author",
    "Version",
    "RequiredDeps",
    "Dependencies",
    "OptionalDeps",
    "LoadOnDemand",
    "LoadWith",
    "LoadManagers",
    "SavedVariables",
    "SavedVariablesPerCharacter",
    "DefaultState",
    "Secure",
    "IconTexture",
    "AddonCompartmentFunc",
];

const METADATA_TAG_PREFIX: &str = "X-";
const TAG_LINE_PREFIX: &str = "##";
const COMMENT_LINE_PREFIX: &str = "#";

/// The client truncates longer lines.
const MAX_TAG_LINE_LEN: usize = 1023;

/// Returns true for `Title-<locale>` and `Notes-<locale>` with a known locale.
pub fn is_localized_tag(name: &str) -> bool {
    match name.split_once('-') {
        Some((base, locale)) => {
            LOCALIZABLE_TAGS.contains(&base) && LANGUAGE_REGIONS.contains(&locale)
        }
        None => false,
    }
}

fn is_official_tag(name: &str) -> bool {
    OFFICIAL_TAGS.contains(&name) || is_localized_tag(name)
}

/// Metadata about the build itself, written as `X-` tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    pub date_time: String,
    pub tool: String,
}

impl BuildStamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            date_time: time.to_rfc3339_opts(SecondsFormat::Secs, true),
            tool: format!("wap {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Package-wide values every TOC of a build shares.
#[derive(Debug, Clone)]
pub struct TocContext {
    pub addon_version: String,
    /// Fallback for the `Author` tag.
    pub author: Option<String>,
    pub stamp: BuildStamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    pub tags: Vec<(String, String)>,
    pub files: Vec<String>,
    pub suffix: String,
}

impl Toc {
    /// Parses TOC text. Used to read back generated files, not for authoring.
    pub fn parse(contents: &str, suffix: &str) -> Self {
        let mut tags = Vec::new();
        let mut files = Vec::new();

        for line in contents.lines() {
            if let Some(rest) = line.strip_prefix(TAG_LINE_PREFIX) {
                let (name, value) = rest.split_once(':').unwrap_or((rest, ""));
                tags.push((name.trim().to_string(), value.trim().to_string()));
            } else if !line.is_empty() && !line.starts_with(COMMENT_LINE_PREFIX) {
                files.push(line.replace('\\', "/"));
            }
        }

        Self {
            tags,
            files,
            suffix: suffix.to_string(),
        }
    }

    /// Builds the TOC for one flavor from the declarative tag configuration.
    ///
    /// Tool-computed tags come first (`Interface`, `Version`, `X-BuildDateTime`,
    /// `X-BuildTool`), then the user's tags are merged in. A user tag with the same
    /// name replaces the tool value in place; the override is reported but honored.
    pub fn from_toc_config(
        toc_config: &TocConfig,
        wow_version: WowVersion,
        suffix: &str,
        context: &TocContext,
        report: &mut Report,
    ) -> Self {
        let mut tags: Vec<(String, String)> = vec![
            ("Interface".to_string(), wow_version.interface_version()),
            ("Version".to_string(), context.addon_version.clone()),
            (
                format!("{METADATA_TAG_PREFIX}BuildDateTime"),
                context.stamp.date_time.clone(),
            ),
            (
                format!("{METADATA_TAG_PREFIX}BuildTool"),
                context.stamp.tool.clone(),
            ),
        ];

        for (name, value) in toc_config.serialized_tags() {
            if let Some(existing) = tags.iter_mut().find(|(tool_name, _)| *tool_name == name) {
                report.warn(format!(
                    "Overwriting wap-provided TOC tag \"{name}\"=\"{}\" with \"{value}\"",
                    existing.1
                ));
                existing.1 = value;
                continue;
            }

            if !is_official_tag(&name) && !name.starts_with(METADATA_TAG_PREFIX) {
                report.warn(format!(
                    "TOC tag \"{name}\" is not a known tag and does not have the \
                     \"{METADATA_TAG_PREFIX}\" prefix"
                ));
            }
            if name == "Secure" && value == "1" {
                report.warn(
                    "TOC tag \"Secure\" is set to 1, but only Blizzard-signed addons can use it",
                );
            }
            tags.push((name, value));
        }

        if let Some(author) = &context.author {
            if !tags.iter().any(|(name, _)| name == "Author") {
                tags.push(("Author".to_string(), author.clone()));
            }
        }

        for (name, value) in &tags {
            let line_len = tag_line(name, value).chars().count();
            if line_len > MAX_TAG_LINE_LEN {
                report.warn(format!(
                    "Line length for TOC tag \"{name}\" ({line_len}) exceeds \
                     {MAX_TAG_LINE_LEN} and will be truncated by the game client"
                ));
            }
        }

        // stable: relative order within each group is kept
        tags.sort_by_key(|(name, _)| is_localized_tag(name));

        Self {
            tags,
            files: toc_config.files.clone(),
            suffix: suffix.to_string(),
        }
    }

    /// Looks up the value of the last tag named `name`.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }

    /// Checks that every tag can be written and every listed file exists under `addon_dir`.
    pub fn validate(&self, addon_dir: &Utf8Path) -> Result<()> {
        for (name, _) in &self.tags {
            if name.is_empty() || name.contains(['\n', '\r', ' ', ':']) {
                return Err(Error::MalformedTag(name.clone()));
            }
        }

        for file in &self.files {
            let path = addon_dir.join(file);
            if !path.is_file() {
                return Err(Error::path_missing(
                    &path,
                    format!(
                        "TOC lists file \"{file}\", but {path} is not a file. Paths are \
                         relative to the addon directory and should use forward slashes."
                    ),
                ));
            }
        }

        Ok(())
    }

    pub fn filename(&self, addon_dir_name: &str) -> String {
        format!("{addon_dir_name}{}.toc", self.suffix)
    }

    pub fn generate(&self) -> String {
        let tag_lines = self.tags.iter().map(|(name, value)| tag_line(name, value));
        let file_lines = self.files.iter().map(|file| file.replace('/', "\\"));

        tag_lines
            .chain(std::iter::once(String::new()))
            .chain(file_lines)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn tag_line(name: &str, value: &str) -> String {
    format!("{TAG_LINE_PREFIX} {name}: {value}")
}
