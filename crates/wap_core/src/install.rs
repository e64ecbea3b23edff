//! World of Warcraft installation path detection.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use wap_project::Flavor;

/// Root of a default installation on this platform, if there is a conventional one.
fn default_install_root() -> Option<Utf8PathBuf> {
    if cfg!(target_os = "windows") {
        Some(Utf8PathBuf::from(r"C:\Program Files (x86)\World of Warcraft"))
    } else if cfg!(target_os = "macos") {
        Some(Utf8PathBuf::from("/Applications/World of Warcraft"))
    } else {
        None
    }
}

/// `<root>/<flavor install dir>/Interface/AddOns`.
pub fn addons_path_under(root: &Utf8Path, flavor: Flavor) -> Utf8PathBuf {
    root.join(flavor.installation_dir_name())
        .join("Interface")
        .join("AddOns")
}

/// Default AddOns directory of `flavor` on this platform. The path may not exist.
pub fn default_addons_path(flavor: Flavor) -> Option<Utf8PathBuf> {
    default_install_root().map(|root| addons_path_under(&root, flavor))
}

/// AddOns directory per flavor: explicit overrides first, platform defaults otherwise.
#[derive(Debug, Clone, Default)]
pub struct AddonsPaths {
    overrides: BTreeMap<Flavor, Utf8PathBuf>,
}

impl AddonsPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, flavor: Flavor, path: impl Into<Utf8PathBuf>) -> Self {
        self.overrides.insert(flavor, path.into());
        self
    }

    pub fn set_override(&mut self, flavor: Flavor, path: impl Into<Utf8PathBuf>) {
        self.overrides.insert(flavor, path.into());
    }

    pub fn get(&self, flavor: Flavor) -> Option<Utf8PathBuf> {
        self.overrides
            .get(&flavor)
            .cloned()
            .or_else(|| default_addons_path(flavor))
    }
}
