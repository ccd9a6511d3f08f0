//! Build version identifiers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Matches release image names such as `cos-rc-85-13310-1034-0`.
/// The trailing dash-separated digits are the build number.
static IMAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*-(?:dev-|beta-|stable-|rc-)?\d+-(\d[\d-]*)$")
        .expect("image name regex")
});

/// A product build version, e.g. `15050.0.0`.
///
/// Versions are opaque keys into the snapshot repository. They are never
/// compared lexically; the order between builds comes from the snapshot
/// history itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildVersion(String);

impl BuildVersion {
    /// Accepts either a dotted build number (`13310.1034.0`) or a release
    /// image name (`cos-rc-85-13310-1034-0`) and normalizes to the build
    /// number. Anything that is not an image name is taken verbatim.
    pub fn parse(input: &str) -> Self {
        if let Some(caps) = IMAGE_NAME_RE.captures(input.trim()) {
            return Self(caps[1].replacen('-', ".", 3));
        }
        Self(input.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_build_number_is_kept() {
        assert_eq!(BuildVersion::parse("13310.1034.0").as_str(), "13310.1034.0");
    }

    #[test]
    fn test_image_name_resolves_to_build_number() {
        assert_eq!(
            BuildVersion::parse("cos-rc-85-13310-1034-0").as_str(),
            "13310.1034.0"
        );
        assert_eq!(
            BuildVersion::parse("cos-dev-86-13421-0-0").as_str(),
            "13421.0.0"
        );
        assert_eq!(BuildVersion::parse("cos-89-16108-403-22").as_str(), "16108.403.22");
    }

    #[test]
    fn test_non_image_strings_pass_through() {
        assert_eq!(BuildVersion::parse("main").as_str(), "main");
        assert_eq!(BuildVersion::parse("  15050.0.0 ").as_str(), "15050.0.0");
        // Channel marker without milestone is not an image name
        assert_eq!(BuildVersion::parse("cos-rc-").as_str(), "cos-rc-");
    }

    #[test]
    fn test_only_first_three_dashes_become_dots() {
        // Four trailing groups keep the last dash intact, mirroring the
        // dotted `major.minor.patch` shape with a build suffix.
        assert_eq!(
            BuildVersion::parse("cos-stable-81-12871-1183-0").as_str(),
            "12871.1183.0"
        );
    }
}
