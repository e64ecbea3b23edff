//! Configuration model for wap packages.
//!
//! A package is described by a `wap.json` (or `wap.toml`) file next to the addon
//! sources. This crate owns the typed representation of that file, its loading
//! and its schema validation. Building is done by `wap_core`.

use camino::Utf8Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod error;
mod flavor;
mod schema;
mod version;

pub use error::{Error, Result, SchemaError};
pub use flavor::Flavor;
pub use version::WowVersion;

/// Published location of the JSON schema, written into new config files.
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/t-mart/wap/master/src/wap/schema/wap.schema.json";

/// Describes a package configuration file
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// The name of the package, used for the build directory and archive name.
    ///
    /// Example: `MyAddon`
    pub name: String,

    /// The version of the package. Any string is accepted.
    ///
    /// Example: `1.2.3`
    pub version: String,

    /// Used as the `Author` TOC tag when an addon does not declare one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Game client version per supported flavor, in dotted form.
    pub wow_versions: BTreeMap<Flavor, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishConfig>,

    /// The addons that make up this package, in build order.
    pub package: Vec<AddonConfig>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct PublishConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curseforge: Option<CurseforgeConfig>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurseforgeConfig {
    pub project_id: String,

    /// Project slug, only used to print the URL of an uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Changelog file path relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_type: Option<ChangelogType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<ReleaseType>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogType {
    #[default]
    Text,
    Html,
    Markdown,
}

impl ChangelogType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangelogType::Text => "text",
            ChangelogType::Html => "html",
            ChangelogType::Markdown => "markdown",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    #[default]
    Alpha,
    Beta,
    Release,
}

impl ReleaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseType::Alpha => "alpha",
            ReleaseType::Beta => "beta",
            ReleaseType::Release => "release",
        }
    }
}

/// One addon directory of the package
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct AddonConfig {
    /// Source directory, relative to the config file.
    ///
    /// Example: `./MyAddon`
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc: Option<TocConfig>,

    /// Glob patterns, relative to the config file, of extra paths copied into the
    /// addon directory (e.g. `./LICENSE`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
}

/// Declarative contents of the TOC files generated for an addon
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct TocConfig {
    /// Tag name to value, in declaration order.
    #[serde(default)]
    pub tags: IndexMap<String, TagValue>,

    /// Files the client loads, relative to the addon directory, using `/`.
    #[serde(default)]
    pub files: Vec<String>,
}

/// A raw tag value as written in the config file.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    List(Vec<String>),
    Text(String),
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

/// How a well-known tag's value is rendered into a TOC line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagFormat {
    ZeroOne,
    EnabledDisabled,
    CommaList,
    PassThrough,
}

impl TagFormat {
    fn for_tag(name: &str) -> Self {
        match name {
            "LoadOnDemand" => TagFormat::ZeroOne,
            "DefaultState" => TagFormat::EnabledDisabled,
            "Dependencies" | "RequiredDeps" | "OptionalDeps" | "LoadWith" | "LoadManagers"
            | "SavedVariables" | "SavedVariablesPerCharacter" => TagFormat::CommaList,
            _ => TagFormat::PassThrough,
        }
    }

    fn render(self, value: &TagValue) -> String {
        match (self, value) {
            (TagFormat::EnabledDisabled, TagValue::Bool(true)) => "enabled".to_string(),
            (TagFormat::EnabledDisabled, TagValue::Bool(false)) => "disabled".to_string(),
            (_, TagValue::Bool(b)) => String::from(if *b { "1" } else { "0" }),
            (_, TagValue::List(items)) => items.join(", "),
            (_, TagValue::Text(text)) => text.clone(),
        }
    }
}

impl TocConfig {
    /// Renders every declared tag to its TOC string form, preserving declaration order.
    pub fn serialized_tags(&self) -> Vec<(String, String)> {
        self.tags
            .iter()
            .map(|(name, value)| (name.clone(), TagFormat::for_tag(name).render(value)))
            .collect()
    }
}

impl Config {
    /// Reads, parses and validates a config file. The format is chosen by extension.
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let content =
            String::from_utf8(bytes).map_err(|_| Error::Encoding(path.to_owned()))?;

        let config: Config = match path.extension() {
            Some("json") => serde_json::from_str(&content).map_err(|source| Error::Json {
                path: path.to_owned(),
                source,
            })?,
            Some("toml") => toml::from_str(&content).map_err(|source| Error::Toml {
                path: path.to_owned(),
                source,
            })?,
            _ => return Err(Error::UnsupportedExtension(path.to_owned())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints the JSON schema expresses.
    pub fn validate(&self) -> Result<()> {
        schema::validate(self).map_err(Error::Schema)
    }

    /// Parsed `wowVersions`, in flavor order.
    pub fn parsed_wow_versions(&self) -> Result<BTreeMap<Flavor, WowVersion>> {
        self.wow_versions
            .iter()
            .map(|(flavor, version)| Ok((*flavor, version.parse()?)))
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_example_config() -> Config {
        let mut tags = IndexMap::new();
        tags.insert("Title".to_string(), TagValue::from("My Addon"));
        tags.insert("Title-deDE".to_string(), TagValue::from("Mein Addon"));
        tags.insert("Notes".to_string(), TagValue::from("Does things"));
        tags.insert("LoadOnDemand".to_string(), TagValue::Bool(false));
        tags.insert(
            "SavedVariables".to_string(),
            TagValue::List(vec!["MyAddonDB".to_string(), "MyAddonCache".to_string()]),
        );
        tags.insert("X-Website".to_string(), TagValue::from("https://example.com"));

        Config {
            schema: None,
            name: "MyAddon".to_string(),
            version: "1.2.3".to_string(),
            author: Some("Tim".to_string()),
            description: None,
            wow_versions: BTreeMap::from([
                (Flavor::Mainline, "9.2.7".to_string()),
                (Flavor::Wrath, "3.4.0".to_string()),
            ]),
            publish: Some(PublishConfig {
                curseforge: Some(CurseforgeConfig {
                    project_id: "123456".to_string(),
                    slug: Some("my-addon".to_string()),
                    changelog_file: Some("CHANGELOG.md".to_string()),
                    changelog_text: None,
                    changelog_type: None,
                    release_type: Some(ReleaseType::Beta),
                }),
            }),
            package: vec![AddonConfig {
                path: "./MyAddon".to_string(),
                toc: Some(TocConfig {
                    tags,
                    files: vec!["Main.lua".to_string(), "Lib/Util.lua".to_string()],
                }),
                include: vec!["./LICENSE".to_string()],
            }],
        }
    }

    #[test]
    fn test_json_parsing() {
        let config: Config = serde_json::from_str(include_str!("../test-data/wap.json")).unwrap();

        assert_eq!(config, create_example_config());
    }

    #[test]
    fn test_toml_parsing() {
        let config: Config = toml::from_str(include_str!("../test-data/wap.toml")).unwrap();

        assert_eq!(config, create_example_config());
    }

    #[test]
    fn test_tag_order_preserved() {
        let config: Config = serde_json::from_str(include_str!("../test-data/wap.json")).unwrap();
        let names: Vec<_> = config.package[0]
            .toc
            .as_ref()
            .unwrap()
            .tags
            .keys()
            .cloned()
            .collect();

        assert_eq!(
            names,
            [
                "Title",
                "Title-deDE",
                "Notes",
                "LoadOnDemand",
                "SavedVariables",
                "X-Website"
            ]
        );
    }

    #[test]
    fn test_serialized_tags() {
        let mut tags = IndexMap::new();
        tags.insert("LoadOnDemand".to_string(), TagValue::Bool(true));
        tags.insert("DefaultState".to_string(), TagValue::Bool(false));
        tags.insert("Dependencies".to_string(), TagValue::List(vec![]));
        tags.insert(
            "OptionalDeps".to_string(),
            TagValue::List(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
        );
        tags.insert("Title".to_string(), TagValue::from("Foo"));
        let toc = TocConfig {
            tags,
            files: vec![],
        };

        assert_eq!(
            toc.serialized_tags(),
            vec![
                ("LoadOnDemand".to_string(), "1".to_string()),
                ("DefaultState".to_string(), "disabled".to_string()),
                ("Dependencies".to_string(), "".to_string()),
                ("OptionalDeps".to_string(), "a, b, c".to_string()),
                ("Title".to_string(), "Foo".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_sections_default() {
        let config = r#"
        {
            "name": "Foo",
            "version": "0.1.0",
            "wowVersions": { "vanilla": "1.14.3" },
            "package": [{ "path": "./Foo" }]
        }
        "#;

        let config: Config = serde_json::from_str(config).unwrap();
        assert_eq!(config.author, None);
        assert_eq!(config.publish, None);
        assert_eq!(config.package[0].toc, None);
        assert!(config.package[0].include.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_path_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();

        let json_path = root.join("wap.json");
        std::fs::write(&json_path, include_str!("../test-data/wap.json")).unwrap();
        assert_eq!(Config::from_path(&json_path).unwrap(), create_example_config());

        let toml_path = root.join("wap.toml");
        std::fs::write(&toml_path, include_str!("../test-data/wap.toml")).unwrap();
        assert_eq!(Config::from_path(&toml_path).unwrap(), create_example_config());
    }

    #[test]
    fn test_from_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();

        let missing = root.join("wap.json");
        assert!(matches!(Config::from_path(&missing), Err(Error::Io { .. })));

        let latin1 = root.join("latin1.json");
        std::fs::write(&latin1, [b'{', 0xE9, b'}']).unwrap();
        assert!(matches!(Config::from_path(&latin1), Err(Error::Encoding(_))));

        let malformed = root.join("malformed.json");
        std::fs::write(&malformed, "{ name: ").unwrap();
        assert!(matches!(Config::from_path(&malformed), Err(Error::Json { .. })));

        let yaml = root.join("wap.yaml");
        std::fs::write(&yaml, "name: foo").unwrap();
        assert!(matches!(
            Config::from_path(&yaml),
            Err(Error::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_parsed_wow_versions() {
        let config = create_example_config();
        let versions = config.parsed_wow_versions().unwrap();
        assert_eq!(versions[&Flavor::Mainline], WowVersion::new(9, 2, 7));
        assert_eq!(versions[&Flavor::Wrath], WowVersion::new(3, 4, 0));
    }

    #[test]
    fn test_json_serialization_roundtrip() {
        let config = create_example_config();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"wowVersions\""));
        assert!(json.contains("\"projectId\""));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
