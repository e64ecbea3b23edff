//! Building a single addon directory.
//!
//! An [`Addon`] is resolved from its [`AddonConfig`] once and is immutable
//! afterwards. [`Addon::build`] then produces `<output root>/<source dir name>`:
//!
//! 1. create the output directory (and empty it when cleaning),
//! 2. copy the source tree into it,
//! 3. copy every include path under its own base name,
//! 4. validate and write one TOC file per target.
//!
//! Files written more than once during a build are overwritten with a warning,
//! the text of which is picked by [`collision_warning`].

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, BTreeSet};
use walkdir::WalkDir;
use wap_project::{AddonConfig, Config};

use crate::error::{Error, IoResultExt, Result};
use crate::fileops::{clean_dir, copy_path};
use crate::report::Report;
use crate::toc::{BuildStamp, Toc, TocContext};
use crate::utils::{absolute, file_name, normalize_path, utf8_path};

/// Where a file in the output directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Source,
    Include,
    Manifest,
}

/// Warning text for a file written by `incoming` after `earlier` already wrote it.
/// The later write always wins.
fn collision_warning(earlier: Origin, incoming: Origin, relative: &Utf8Path) -> String {
    match (earlier, incoming) {
        (Origin::Source, Origin::Include) => {
            format!("Include path overwrites source file \"{relative}\"")
        }
        (Origin::Include, Origin::Include) => format!(
            "Include path overwrites \"{relative}\", which an earlier include pattern already \
             copied"
        ),
        (Origin::Source, Origin::Manifest) => format!(
            "Generated TOC file overwrites source file \"{relative}\". Remove it from the \
             source directory to silence this warning"
        ),
        (Origin::Include, Origin::Manifest) => {
            format!("Generated TOC file overwrites included file \"{relative}\"")
        }
        (Origin::Manifest, Origin::Manifest) => {
            format!("Generated TOC file \"{relative}\" is written more than once")
        }
        (Origin::Manifest, _) | (_, Origin::Source) => {
            format!("File \"{relative}\" is written more than once")
        }
    }
}

/// Warning text for an include directory merged into a directory that `earlier`
/// already produced. Files inside are checked one by one.
fn merge_warning(earlier: Origin, relative: &Utf8Path) -> String {
    match earlier {
        Origin::Include => format!(
            "Include path merges into \"{relative}\", which an earlier include pattern already \
             copied"
        ),
        _ => format!("Include path merges into source directory \"{relative}\""),
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    origin: Origin,
    is_dir: bool,
}

/// Relative paths written into an addon output directory during one build.
#[derive(Debug, Default)]
struct OutputLedger {
    entries: BTreeMap<Utf8PathBuf, Entry>,
}

impl OutputLedger {
    fn record(&mut self, relative: Utf8PathBuf, origin: Origin, report: &mut Report) {
        let entry = Entry {
            origin,
            is_dir: false,
        };
        self.insert(relative, entry, true, report);
    }

    /// Directories colliding with directories only warn when `announce_merge` is set.
    fn insert(
        &mut self,
        relative: Utf8PathBuf,
        entry: Entry,
        announce_merge: bool,
        report: &mut Report,
    ) {
        let Some(earlier) = self.entries.insert(relative.clone(), entry) else {
            return;
        };
        if earlier.is_dir && entry.is_dir {
            if announce_merge {
                report.warn(merge_warning(earlier.origin, &relative));
            }
        } else {
            report.warn(collision_warning(earlier.origin, entry.origin, &relative));
        }
    }

    /// Records every file and directory that copying `src` to `<output>/<prefix>`
    /// produces. A collision at `prefix` itself always warns.
    fn record_tree(
        &mut self,
        src: &Utf8Path,
        prefix: &Utf8Path,
        origin: Origin,
        report: &mut Report,
    ) -> Result<()> {
        if src.is_file() {
            self.record(prefix.to_owned(), origin, report);
            return Ok(());
        }

        if !prefix.as_str().is_empty() {
            let entry = Entry {
                origin,
                is_dir: true,
            };
            self.insert(prefix.to_owned(), entry, true, report);
        }

        for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| Error::io(src, e.into()))?;
            let is_dir = entry.file_type().is_dir();
            let path = utf8_path(entry.into_path())?;
            if let Ok(relative) = path.strip_prefix(src) {
                let entry = Entry { origin, is_dir };
                self.insert(prefix.join(relative), entry, false, report);
            }
        }
        Ok(())
    }
}

/// Outcome of building one addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonBuildResult {
    /// The addon's output directory.
    pub path: Utf8PathBuf,
    /// TOC files written into `path`, in target order.
    pub manifests: Vec<Utf8PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Addon {
    pub source_path: Utf8PathBuf,
    pub include_paths: Vec<Utf8PathBuf>,
    /// Directory include patterns are resolved against (the config file's directory).
    pub include_root: Utf8PathBuf,
    pub tocs: Vec<Toc>,
}

impl Addon {
    /// Resolves paths and include globs and builds the TOCs of one addon.
    ///
    /// Paths are resolved lexically against the config file's directory. One TOC is
    /// created per configured flavor, followed by a flavor-neutral one carrying the
    /// highest configured version, which clients without a flavor-specific TOC load.
    pub fn create(
        addon_config: &AddonConfig,
        config: &Config,
        config_path: &Utf8Path,
        stamp: &BuildStamp,
        report: &mut Report,
    ) -> Result<Self> {
        let include_root = absolute(config_path.parent().unwrap_or(Utf8Path::new("")))?;
        let source_path = normalize_path(&include_root.join(&addon_config.path));

        let mut include_paths = Vec::new();
        for pattern in &addon_config.include {
            let matches = resolve_include(&include_root, pattern)?;
            if matches.is_empty() {
                report.warn(format!(
                    "Include pattern \"{pattern}\" of addon {source_path} matched no paths"
                ));
            }
            include_paths.extend(matches);
        }

        let tocs = match &addon_config.toc {
            Some(toc_config) => {
                let context = TocContext {
                    addon_version: config.version.clone(),
                    author: config.author.clone(),
                    stamp: stamp.clone(),
                };
                let versions = config.parsed_wow_versions()?;

                let mut targets: Vec<_> = versions
                    .iter()
                    .map(|(flavor, version)| (*version, flavor.toc_suffix()))
                    .collect();
                if let Some(max) = versions.values().max() {
                    targets.push((*max, ""));
                }

                // every target emits the same tag warnings, report each once
                let mut seen = BTreeSet::new();
                let mut tocs = Vec::with_capacity(targets.len());
                for (version, suffix) in targets {
                    let mut scratch = Report::new();
                    tocs.push(Toc::from_toc_config(
                        toc_config,
                        version,
                        suffix,
                        &context,
                        &mut scratch,
                    ));
                    for event in scratch.drain() {
                        if seen.insert(event.message.clone()) {
                            report.warn(event.message);
                        }
                    }
                }
                tocs
            }
            None => Vec::new(),
        };

        Ok(Self {
            source_path,
            include_paths,
            include_root,
            tocs,
        })
    }

    /// Name of the addon's directory, shared by its source and output.
    pub fn dir_name(&self) -> &str {
        file_name(&self.source_path)
    }

    pub fn output_path(&self, output_root: &Utf8Path) -> Utf8PathBuf {
        output_root.join(self.dir_name())
    }

    /// Paths whose changes should trigger a rebuild of this addon.
    pub fn watch_paths(&self) -> impl Iterator<Item = &Utf8Path> {
        std::iter::once(self.source_path.as_path())
            .chain(self.include_paths.iter().map(Utf8PathBuf::as_path))
    }

    pub fn build(
        &self,
        output_root: &Utf8Path,
        clean: bool,
        report: &mut Report,
    ) -> Result<AddonBuildResult> {
        let output = self.output_path(output_root);
        tracing::debug!(source = %self.source_path, %output, "building addon");

        if output.exists() && !output.is_dir() {
            return Err(Error::path_exists(
                &output,
                format!("Addon output {output} exists but is not a directory."),
            ));
        }
        std::fs::create_dir_all(&output).at_path(&output)?;

        if clean {
            clean_dir(&output)?;
        }

        if !self.source_path.is_dir() {
            return Err(Error::path_type(
                &self.source_path,
                format!(
                    "Addon path {} should be a directory, but it is not (or does not exist).",
                    self.source_path
                ),
            ));
        }

        let mut ledger = OutputLedger::default();
        ledger.record_tree(&self.source_path, Utf8Path::new(""), Origin::Source, report)?;
        copy_path(&self.source_path, &output)?;

        for include in &self.include_paths {
            let name = file_name(include);
            ledger.record_tree(include, Utf8Path::new(name), Origin::Include, report)?;
            copy_path(include, &output.join(name))?;
        }

        let mut manifests = Vec::with_capacity(self.tocs.len());
        for toc in &self.tocs {
            toc.validate(&output)?;

            let filename = toc.filename(self.dir_name());
            let toc_path = output.join(&filename);
            if toc_path.is_dir() {
                return Err(Error::path_exists(
                    &toc_path,
                    format!("Cannot write TOC file {toc_path} because it is a directory."),
                ));
            }
            ledger.record(Utf8PathBuf::from(filename), Origin::Manifest, report);

            tracing::debug!(path = %toc_path, "writing toc");
            std::fs::write(&toc_path, toc.generate()).at_path(&toc_path)?;
            manifests.push(toc_path);
        }

        Ok(AddonBuildResult {
            path: output,
            manifests,
        })
    }
}

/// Expands one include glob relative to `root`. The root itself is matched literally.
fn resolve_include(root: &Utf8Path, pattern: &str) -> Result<Vec<Utf8PathBuf>> {
    let relative = pattern.strip_prefix("./").unwrap_or(pattern);
    let full = if Utf8Path::new(relative).is_absolute() {
        relative.to_string()
    } else {
        Utf8PathBuf::from(glob::Pattern::escape(root.as_str()))
            .join(relative)
            .into_string()
    };

    let paths = glob::glob(&full).map_err(|source| Error::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut resolved = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                let path = utf8_path(err.path().to_path_buf())?;
                return Err(Error::io(&path, err.into_error()));
            }
        };
        resolved.push(normalize_path(&utf8_path(path)?));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fs;
    use tempfile::tempdir;
    use wap_project::{Flavor, TagValue, TocConfig};

    fn utf8_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn config(addon: AddonConfig) -> Config {
        Config {
            schema: None,
            name: "Pkg".to_string(),
            version: "1.0.0".to_string(),
            author: None,
            description: None,
            wow_versions: [
                (Flavor::Mainline, "9.2.7".to_string()),
                (Flavor::Wrath, "3.4.0".to_string()),
            ]
            .into(),
            publish: None,
            package: vec![addon],
        }
    }

    fn addon_config(include: &[&str], files: &[&str]) -> AddonConfig {
        let mut toc = TocConfig::default();
        toc.tags.insert("Title".to_string(), TagValue::from("Addon"));
        toc.files = files.iter().map(|f| f.to_string()).collect();
        AddonConfig {
            path: "./Addon".to_string(),
            toc: Some(toc),
            include: include.iter().map(|i| i.to_string()).collect(),
        }
    }

    fn create(root: &Utf8Path, addon_config: AddonConfig, report: &mut Report) -> Result<Addon> {
        let config = config(addon_config.clone());
        Addon::create(
            &addon_config,
            &config,
            &root.join("wap.json"),
            &BuildStamp::now(),
            report,
        )
    }

    #[test]
    fn test_create_resolves_paths_and_targets() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        let mut report = Report::new();

        let addon = create(&root, addon_config(&[], &[]), &mut report).unwrap();

        assert_eq!(addon.source_path, normalize_path(&root.join("Addon")));
        assert_eq!(addon.include_root, normalize_path(&root));
        let suffixes: Vec<_> = addon.tocs.iter().map(|t| t.suffix.as_str()).collect();
        assert_eq!(suffixes, ["_Mainline", "_Wrath", ""]);
        let interfaces: Vec<_> = addon.tocs.iter().map(|t| t.tag("Interface").unwrap()).collect();
        assert_eq!(interfaces, ["90207", "30400", "90207"]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_create_without_toc() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        let mut cfg = addon_config(&[], &[]);
        cfg.toc = None;

        let addon = create(&root, cfg, &mut Report::new()).unwrap();
        assert!(addon.tocs.is_empty());
    }

    #[test]
    fn test_tag_warnings_reported_once() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        let mut cfg = addon_config(&[], &[]);
        if let Some(toc) = cfg.toc.as_mut() {
            toc.tags.insert("Website".to_string(), TagValue::from("x"));
        }
        let mut report = Report::new();

        create(&root, cfg, &mut report).unwrap();
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_include_globs() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::write(root.join("LICENSE"), "mit").unwrap();
        fs::create_dir(root.join("libs")).unwrap();
        fs::write(root.join("libs/a.lua"), "").unwrap();
        fs::write(root.join("libs/b.lua"), "").unwrap();
        let mut report = Report::new();

        let addon = create(
            &root,
            addon_config(&["./LICENSE", "libs/*.lua", "./nothing-*"], &[]),
            &mut report,
        )
        .unwrap();

        let names: Vec<_> = addon.include_paths.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["LICENSE", "a.lua", "b.lua"]);
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("./nothing-*"));
    }

    #[test]
    fn test_invalid_glob_is_configuration_error() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);

        let err = create(&root, addon_config(&["[unclosed"], &[]), &mut Report::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_root_with_glob_characters_is_literal() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir).join("proj[1]");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("LICENSE"), "").unwrap();

        let addon = create(&root, addon_config(&["LICENSE"], &[]), &mut Report::new()).unwrap();
        assert_eq!(addon.include_paths, [normalize_path(&root.join("LICENSE"))]);
    }

    #[test]
    fn test_build_requires_source_dir() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        let addon = create(&root, addon_config(&[], &[]), &mut Report::new()).unwrap();

        let err = addon
            .build(&root.join("dist"), false, &mut Report::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathType);
    }

    #[test]
    fn test_build_output_occupied_by_file() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir(root.join("Addon")).unwrap();
        fs::create_dir(root.join("dist")).unwrap();
        fs::write(root.join("dist/Addon"), "").unwrap();
        let addon = create(&root, addon_config(&[], &[]), &mut Report::new()).unwrap();

        let err = addon
            .build(&root.join("dist"), false, &mut Report::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathExists);
    }

    #[test]
    fn test_build_missing_toc_file() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir(root.join("Addon")).unwrap();
        let addon = create(&root, addon_config(&[], &["Main.lua"]), &mut Report::new()).unwrap();

        let err = addon
            .build(&root.join("dist"), false, &mut Report::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathMissing);
        assert!(err.to_string().contains("Main.lua"));
    }

    #[test]
    fn test_toc_over_directory_fails() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir_all(root.join("Addon/Addon_Wrath.toc")).unwrap();
        let addon = create(&root, addon_config(&[], &[]), &mut Report::new()).unwrap();

        let err = addon
            .build(&root.join("dist"), false, &mut Report::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathExists);
    }

    #[test]
    fn test_include_overwriting_source_warns() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir(root.join("Addon")).unwrap();
        fs::write(root.join("Addon/LICENSE"), "old").unwrap();
        fs::write(root.join("LICENSE"), "new").unwrap();
        let mut report = Report::new();
        let addon = create(&root, addon_config(&["LICENSE"], &[]), &mut report).unwrap();

        let result = addon.build(&root.join("dist"), false, &mut report).unwrap();

        assert_eq!(fs::read_to_string(result.path.join("LICENSE")).unwrap(), "new");
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("overwrites source file \"LICENSE\""));
    }

    #[test]
    fn test_include_directory_matching_source_directory_warns() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir_all(root.join("Addon/Libs")).unwrap();
        fs::write(root.join("Addon/Libs/a.lua"), "a").unwrap();
        fs::create_dir(root.join("Libs")).unwrap();
        fs::write(root.join("Libs/b.lua"), "b").unwrap();
        let mut report = Report::new();
        let addon = create(&root, addon_config(&["./Libs"], &[]), &mut report).unwrap();

        let result = addon.build(&root.join("dist"), false, &mut report).unwrap();

        assert!(result.path.join("Libs/a.lua").is_file());
        assert!(result.path.join("Libs/b.lua").is_file());
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("merges into source directory \"Libs\""));
    }

    #[test]
    fn test_nested_file_collision_inside_merged_directory_warns() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir_all(root.join("Addon/Libs/Sub")).unwrap();
        fs::write(root.join("Addon/Libs/Sub/a.lua"), "old").unwrap();
        fs::create_dir_all(root.join("Libs/Sub")).unwrap();
        fs::write(root.join("Libs/Sub/a.lua"), "new").unwrap();
        let mut report = Report::new();
        let addon = create(&root, addon_config(&["Libs"], &[]), &mut report).unwrap();

        let result = addon.build(&root.join("dist"), false, &mut report).unwrap();

        assert_eq!(fs::read_to_string(result.path.join("Libs/Sub/a.lua")).unwrap(), "new");
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("\"Libs\""));
        assert!(warnings[1].contains("overwrites source file"));
        assert!(warnings[1].contains("a.lua"));
    }

    #[test]
    fn test_collision_table_messages() {
        let rel = Utf8Path::new("X.toc");
        assert!(collision_warning(Origin::Source, Origin::Manifest, rel).starts_with("Generated TOC"));
        assert!(collision_warning(Origin::Include, Origin::Include, rel).contains("earlier include"));
        assert!(collision_warning(Origin::Include, Origin::Manifest, rel).contains("included file"));
    }
}
