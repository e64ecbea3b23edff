//! Structural validation of a deserialized [`Config`].
//!
//! Serde already enforces the shape of the document; this module checks the
//! value constraints the published JSON schema adds on top (non-empty strings,
//! dotted versions, at least one flavor and one addon).

use crate::{Config, SchemaError, WowVersion};

fn fail(path: impl Into<String>, message: impl Into<String>) -> Result<(), SchemaError> {
    Err(SchemaError {
        path: path.into(),
        message: message.into(),
    })
}

fn non_empty(value: &str, path: impl Into<String>) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return fail(path, "value should be a non-empty string");
    }
    Ok(())
}

pub(crate) fn validate(config: &Config) -> Result<(), SchemaError> {
    non_empty(&config.name, "$.name")?;
    non_empty(&config.version, "$.version")?;

    if config.wow_versions.is_empty() {
        return fail("$.wowVersions", "at least one flavor version should be declared");
    }
    for (flavor, version) in &config.wow_versions {
        if version.parse::<WowVersion>().is_err() {
            return fail(
                format!("$.wowVersions.{flavor}"),
                format!("\"{version}\" should be a dotted version like 9.2.7"),
            );
        }
    }

    if let Some(curseforge) = config.publish.as_ref().and_then(|p| p.curseforge.as_ref()) {
        non_empty(&curseforge.project_id, "$.publish.curseforge.projectId")?;
        if curseforge.changelog_file.is_some() && curseforge.changelog_text.is_some() {
            return fail(
                "$.publish.curseforge",
                "only one of changelogFile and changelogText should be set",
            );
        }
    }

    if config.package.is_empty() {
        return fail("$.package", "at least one addon should be declared");
    }
    for (index, addon) in config.package.iter().enumerate() {
        non_empty(&addon.path, format!("$.package[{index}].path"))?;

        for (i, pattern) in addon.include.iter().enumerate() {
            non_empty(pattern, format!("$.package[{index}].include[{i}]"))?;
        }

        if let Some(toc) = &addon.toc {
            for (i, file) in toc.files.iter().enumerate() {
                non_empty(file, format!("$.package[{index}].toc.files[{i}]"))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Config {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_bad_wow_version_is_located() {
        let config = parse(
            r#"{"name": "A", "version": "1", "wowVersions": {"wrath": "3.4"},
                "package": [{"path": "A"}]}"#,
        );
        let err = validate(&config).unwrap_err();
        assert_eq!(err.path, "$.wowVersions.wrath");
    }

    #[test]
    fn test_empty_package_list() {
        let config = parse(
            r#"{"name": "A", "version": "1", "wowVersions": {"wrath": "3.4.0"}, "package": []}"#,
        );
        assert_eq!(validate(&config).unwrap_err().path, "$.package");
    }

    #[test]
    fn test_empty_addon_path() {
        let config = parse(
            r#"{"name": "A", "version": "1", "wowVersions": {"wrath": "3.4.0"},
                "package": [{"path": "A"}, {"path": " "}]}"#,
        );
        assert_eq!(validate(&config).unwrap_err().path, "$.package[1].path");
    }

    #[test]
    fn test_no_flavors() {
        let config =
            parse(r#"{"name": "A", "version": "1", "wowVersions": {}, "package": [{"path": "A"}]}"#);
        assert_eq!(validate(&config).unwrap_err().path, "$.wowVersions");
    }

    #[test]
    fn test_conflicting_changelog_sources() {
        let config = parse(
            r#"{"name": "A", "version": "1", "wowVersions": {"wrath": "3.4.0"},
                "publish": {"curseforge": {"projectId": "1", "changelogFile": "C.md",
                                           "changelogText": "hi"}},
                "package": [{"path": "A"}]}"#,
        );
        assert_eq!(validate(&config).unwrap_err().path, "$.publish.curseforge");
    }
}
