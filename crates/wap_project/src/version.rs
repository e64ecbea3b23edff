use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::Error;

fn dotted_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)$").expect("valid regex")
    })
}

/// A dotted `major.minor.patch` game client version, e.g. `9.2.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WowVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl WowVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Packs the version into the number the client expects in the `Interface` tag.
    ///
    /// Minor and patch are zero-padded to two digits: `9.2.7` becomes `90207`.
    pub fn interface_version(&self) -> String {
        format!("{}{:0>2}{:0>2}", self.major, self.minor, self.patch)
    }
}

impl FromStr for WowVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidVersion(s.to_string());
        let captures = dotted_pattern().captures(s).ok_or_else(invalid)?;
        let component = |name: &str| -> Result<u32, Error> {
            captures[name].parse::<u32>().map_err(|_| invalid())
        };

        Ok(Self {
            major: component("major")?,
            minor: component("minor")?,
            patch: component("patch")?,
        })
    }
}

impl fmt::Display for WowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_version() {
        assert_eq!("9.2.7".parse::<WowVersion>().unwrap().interface_version(), "90207");
        assert_eq!("3.4.0".parse::<WowVersion>().unwrap().interface_version(), "30400");
        assert_eq!("1.14.3".parse::<WowVersion>().unwrap().interface_version(), "11403");
        assert_eq!("10.0.2".parse::<WowVersion>().unwrap().interface_version(), "100002");
    }

    #[test]
    fn test_invalid_versions() {
        for bad in ["", "9.2", "9.2.7.1", "9.x.7", " 9.2.7", "v9.2.7"] {
            assert!(bad.parse::<WowVersion>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_ordering_is_numeric() {
        let older: WowVersion = "3.4.0".parse().unwrap();
        let newer: WowVersion = "10.0.0".parse().unwrap();
        assert!(older < newer);
        assert_eq!(
            ["1.14.3", "9.2.7", "3.4.0"]
                .iter()
                .map(|v| v.parse::<WowVersion>().unwrap())
                .max()
                .unwrap()
                .to_string(),
            "9.2.7"
        );
    }
}
