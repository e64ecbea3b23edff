use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeSet, HashSet};
use wap_project::Config;

use crate::addon::{Addon, AddonBuildResult};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::toc::BuildStamp;

/// Every addon of a configuration, built together under one root.
#[derive(Debug, Clone)]
pub struct Package {
    pub addons: Vec<Addon>,
    /// `<output>/<name>-<version>`
    pub build_path: Utf8PathBuf,
}

/// Directory a package build is written to.
pub fn build_path(output_path: &Utf8Path, config: &Config) -> Utf8PathBuf {
    output_path.join(format!("{}-{}", config.name, config.version))
}

impl Package {
    /// Resolves every addon of `config`. Fails before touching the filesystem when two
    /// addons share a source directory.
    pub fn create(
        config: &Config,
        config_path: &Utf8Path,
        output_path: &Utf8Path,
        report: &mut Report,
    ) -> Result<Self> {
        Self::create_with_stamp(config, config_path, output_path, &BuildStamp::now(), report)
    }

    pub fn create_with_stamp(
        config: &Config,
        config_path: &Utf8Path,
        output_path: &Utf8Path,
        stamp: &BuildStamp,
        report: &mut Report,
    ) -> Result<Self> {
        let addons = config
            .package
            .iter()
            .map(|addon_config| Addon::create(addon_config, config, config_path, stamp, report))
            .collect::<Result<Vec<_>>>()?;

        // symlinked aliases of one directory count as duplicates
        let mut seen = HashSet::new();
        for addon in &addons {
            let resolved = addon
                .source_path
                .canonicalize_utf8()
                .unwrap_or_else(|_| addon.source_path.clone());
            if !seen.insert(resolved) {
                return Err(Error::DuplicateAddonPath(addon.source_path.clone()));
            }
        }

        Ok(Self {
            addons,
            build_path: build_path(output_path, config),
        })
    }

    /// Builds every addon in declaration order.
    pub fn build(&self, clean: bool, report: &mut Report) -> Result<Vec<AddonBuildResult>> {
        tracing::info!(path = %self.build_path, "building package");
        self.addons
            .iter()
            .map(|addon| addon.build(&self.build_path, clean, report))
            .collect()
    }

    /// Source and include paths of every addon. Does not include the config file.
    pub fn watch_paths(&self) -> BTreeSet<Utf8PathBuf> {
        self.addons
            .iter()
            .flat_map(Addon::watch_paths)
            .map(Utf8Path::to_path_buf)
            .collect()
    }
}
