//! Linking built addons into game installations for development.

use camino::Utf8PathBuf;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use wap_project::{Config, Flavor};

use crate::addon::AddonBuildResult;
use crate::error::{Error, Result};
use crate::fileops::symlink;
use crate::install::AddonsPaths;
use crate::report::Report;
use crate::utils::file_name;

/// One `--link` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChoice {
    /// Every configured flavor that is installed.
    Auto,
    Flavor(Flavor),
}

impl FromStr for LinkChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(LinkChoice::Auto);
        }
        s.parse().map(LinkChoice::Flavor)
    }
}

impl fmt::Display for LinkChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkChoice::Auto => f.write_str("auto"),
            LinkChoice::Flavor(flavor) => write!(f, "{flavor}"),
        }
    }
}

/// What to link after every build.
#[derive(Debug, Clone, Default)]
pub struct LinkRequest {
    auto: bool,
    flavors: BTreeSet<Flavor>,
    pub force: bool,
    pub paths: AddonsPaths,
}

impl LinkRequest {
    /// Validates a list of choices. `auto` cannot be combined with explicit flavors.
    pub fn new(choices: &[LinkChoice], force: bool, paths: AddonsPaths) -> Result<Self> {
        let auto = choices.contains(&LinkChoice::Auto);
        let flavors: BTreeSet<_> = choices
            .iter()
            .filter_map(|choice| match choice {
                LinkChoice::Flavor(flavor) => Some(*flavor),
                LinkChoice::Auto => None,
            })
            .collect();

        if auto && !flavors.is_empty() {
            return Err(Error::AutoLinkWithFlavors);
        }

        Ok(Self {
            auto,
            flavors,
            force,
            paths,
        })
    }

    pub fn is_empty(&self) -> bool {
        !self.auto && self.flavors.is_empty()
    }

    /// AddOns directories to link into for `config`.
    ///
    /// `auto` picks the configured flavors whose directory exists, so it must be
    /// re-resolved whenever the config changes. An explicit flavor without a known
    /// directory is an error.
    pub fn resolve_targets(&self, config: &Config) -> Result<Vec<(Flavor, Utf8PathBuf)>> {
        if self.auto {
            return Ok(config
                .wow_versions
                .keys()
                .filter_map(|flavor| self.paths.get(*flavor).map(|path| (*flavor, path)))
                .filter(|(_, path)| path.is_dir())
                .collect());
        }

        self.flavors
            .iter()
            .map(|flavor| match self.paths.get(*flavor) {
                Some(path) => Ok((*flavor, path)),
                None => Err(Error::Platform {
                    message: format!(
                        "There is no known AddOns directory for {} on this platform.",
                        flavor.canonical_name()
                    ),
                    hint: format!("Pass --{flavor}-addons-path to choose one"),
                }),
            })
            .collect()
    }
}

impl AddonBuildResult {
    /// Symlinks `<addons_dir>/<output dir name>` to this build's output directory.
    pub fn link(&self, addons_dir: &camino::Utf8Path, force: bool) -> Result<Utf8PathBuf> {
        let link_path = addons_dir.join(file_name(&self.path));
        symlink(&link_path, &self.path, force)?;
        Ok(link_path)
    }
}

/// Links every build result into every target of `request`.
pub fn link_all(
    results: &[AddonBuildResult],
    request: &LinkRequest,
    config: &Config,
    report: &mut Report,
) -> Result<Vec<Utf8PathBuf>> {
    let targets = request.resolve_targets(config)?;
    if request.auto && targets.is_empty() {
        report.warn("Auto linking found no installed flavors to link into");
    }

    let mut links = Vec::new();
    for (flavor, addons_dir) in &targets {
        for result in results {
            let link_path = result.link(addons_dir, request.force)?;
            tracing::debug!(%flavor, link = %link_path, target = %result.path, "linked addon");
            report.info(format!("Linked {link_path} -> {}", result.path));
            links.push(link_path);
        }
    }
    Ok(links)
}
