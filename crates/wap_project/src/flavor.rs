use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A World of Warcraft game client variant.
///
/// Variants are declared in the order manifests are generated, so the derived
/// `Ord` doubles as the iteration order of [`Config::wow_versions`](crate::Config).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Mainline,
    Wrath,
    Vanilla,
}

impl Flavor {
    pub const ALL: [Flavor; 3] = [Flavor::Mainline, Flavor::Wrath, Flavor::Vanilla];

    /// The lowercase name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Flavor::Mainline => "mainline",
            Flavor::Wrath => "wrath",
            Flavor::Vanilla => "vanilla",
        }
    }

    /// Human readable name of the game client.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Flavor::Mainline => "Mainline",
            Flavor::Wrath => "Wrath of the Lich King Classic",
            Flavor::Vanilla => "WoW Classic",
        }
    }

    /// Suffix appended to the addon directory name in this flavor's TOC file name.
    pub fn toc_suffix(self) -> &'static str {
        match self {
            Flavor::Mainline => "_Mainline",
            Flavor::Wrath => "_Wrath",
            Flavor::Vanilla => "_Vanilla",
        }
    }

    /// Directory under the WoW installation root that holds this client.
    pub fn installation_dir_name(self) -> &'static str {
        match self {
            Flavor::Mainline => "_retail_",
            Flavor::Wrath => "_classic_",
            Flavor::Vanilla => "_classic_era_",
        }
    }

    /// Latest client version known at release time, used to scaffold new projects.
    pub fn latest_version(self) -> &'static str {
        match self {
            Flavor::Mainline => "9.2.7",
            Flavor::Wrath => "3.4.0",
            Flavor::Vanilla => "1.14.3",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flavor::ALL
            .into_iter()
            .find(|flavor| flavor.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown flavor \"{s}\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_serde_names() {
        let json = serde_json::to_string(&Flavor::ALL).unwrap();
        assert_eq!(json, r#"["mainline","wrath","vanilla"]"#);
    }

    #[test]
    fn test_flavor_from_str() {
        assert_eq!("wrath".parse::<Flavor>(), Ok(Flavor::Wrath));
        assert_eq!("Vanilla".parse::<Flavor>(), Ok(Flavor::Vanilla));
        assert!("tbc".parse::<Flavor>().is_err());
    }

    #[test]
    fn test_flavor_order_matches_declaration() {
        let mut flavors = vec![Flavor::Vanilla, Flavor::Mainline, Flavor::Wrath];
        flavors.sort();
        assert_eq!(flavors, Flavor::ALL.to_vec());
    }
}
