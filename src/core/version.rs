//! Version grammar validation against the build type

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Release versions: dot-separated numeric components, at least two
static RELEASE_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9](\.[0-9]+)+$").expect("release grammar compiles"));

/// Pre-release versions: numeric components plus an a/b/rc marker and one digit
static PRERELEASE_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9](\.[0-9]+)*(a|b|rc)[0-9]$").expect("prerelease grammar compiles"));

/// Build type tag for a run
///
/// Selects the version grammar and which registry set publish steps
/// target. Anything other than `release` and `rc` is a test build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildType {
    Release,
    Rc,
    Other(String),
}

impl BuildType {
    /// Parse a build type tag (never fails; unknown tags are test builds)
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "release" => BuildType::Release,
            "rc" => BuildType::Rc,
            other => BuildType::Other(other.to_string()),
        }
    }

    /// Whether publish steps for this build type target production registries
    pub fn routes_to_production(&self) -> bool {
        matches!(self, BuildType::Release | BuildType::Rc)
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildType::Release => "release",
            BuildType::Rc => "rc",
            BuildType::Other(tag) => tag,
        }
    }
}

impl FromStr for BuildType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BuildType::from_tag(s))
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version validation failure; fatal to the run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{version}' is not a valid release version")]
    MalformedRelease { version: String },

    #[error("'{version}' is not a valid pre-release version")]
    MalformedPrerelease { version: String },

    #[error("version '{version}' does not match the latest tag '{tag}'")]
    TagMismatch { version: String, tag: String },

    #[error("no tag available to check release version '{version}' against")]
    MissingTag { version: String },
}

/// Classify a version string against the build type.
///
/// Release builds must match the release grammar and equal the most
/// recent tag (stripped of one leading `v`). Every other build type
/// must match the pre-release grammar. Pure single-pass check.
pub fn validate(
    version: &str,
    build_type: &BuildType,
    latest_tag: Option<&str>,
) -> Result<(), ValidationError> {
    match build_type {
        BuildType::Release => {
            if !RELEASE_GRAMMAR.is_match(version) {
                return Err(ValidationError::MalformedRelease {
                    version: version.to_string(),
                });
            }

            let tag = latest_tag.ok_or_else(|| ValidationError::MissingTag {
                version: version.to_string(),
            })?;

            let expected = tag.strip_prefix('v').unwrap_or(tag);
            if version != expected {
                return Err(ValidationError::TagMismatch {
                    version: version.to_string(),
                    tag: tag.to_string(),
                });
            }

            Ok(())
        }
        _ => {
            if !PRERELEASE_GRAMMAR.is_match(version) {
                return Err(ValidationError::MalformedPrerelease {
                    version: version.to_string(),
                });
            }
            Ok(())
        }
    }
}
