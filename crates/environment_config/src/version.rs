//! TeamCity release versions.
//!
//! Provides [`ServerVersion`], a validated TeamCity version string with the
//! ordering rules used to gate features and to derive data directory names.
//!
//! # Grammar
//!
//! - Release: one or more dotted numeric segments with at least a major and a
//!   minor part (`9.0`, `10.0.5`, `2018.1`). Only the leading numeric part is
//!   checked, so trailing text such as `2018.1 EAP` is tolerated.
//! - Snapshot: a release followed by `-SNAPSHOT` (`2021.2.1-SNAPSHOT`). The
//!   release check is a prefix match, so these pass release validation too;
//!   the caller's snapshot flag selects the examples quoted on failure.
//! - The bare sentinel `SNAPSHOT` is always accepted and is newer than every
//!   other version.

use crate::{EnvironmentError, EnvironmentResult};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// The sentinel version meaning "always the newest build".
pub const SNAPSHOT: &str = "SNAPSHOT";

static RELEASE_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(\.\d+)+").expect("release version pattern is valid"));

static SNAPSHOT_VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(\.\d+)+-SNAPSHOT").expect("snapshot version pattern is valid")
});

static DATA_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+)").expect("data version pattern is valid"));

/// TeamCity 9.0, the oldest supported release and the default environment version.
pub static VERSION_9_0: LazyLock<ServerVersion> =
    LazyLock::new(|| ServerVersion::from_validated("9.0"));

/// TeamCity 2018.2.
pub static VERSION_2018_2: LazyLock<ServerVersion> =
    LazyLock::new(|| ServerVersion::from_validated("2018.2"));

/// TeamCity 2020.1.
pub static VERSION_2020_1: LazyLock<ServerVersion> =
    LazyLock::new(|| ServerVersion::from_validated("2020.1"));

/// A validated TeamCity version string.
///
/// Equality and hashing use the original text, while [`ServerVersion::compare`]
/// compares numerically. `10.0` and `10.00` are therefore different values that
/// compare as equal. Because the two notions disagree, and because comparing a
/// release with a non-numeric suffix fails, this type intentionally does not
/// implement `Ord`.
///
/// # Examples
///
/// ```
/// use environment_config::ServerVersion;
///
/// let older = ServerVersion::release("2018.1")?;
/// let newer = ServerVersion::release("2018.2")?;
/// assert!(older.less_than(&newer)?);
/// assert_eq!(newer.data_version()?, "2018.2");
/// # Ok::<(), environment_config::EnvironmentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerVersion(String);

impl ServerVersion {
    /// Parse a version string.
    ///
    /// # Arguments
    ///
    /// * `version` - The version text
    /// * `allow_snapshots` - Whether `<release>-SNAPSHOT` versions are accepted
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::InvalidVersionFormat` when the text does not
    /// start with a valid release version (or, with `allow_snapshots`, is not a
    /// snapshot version either). The sentinel `SNAPSHOT` never fails.
    pub fn parse(version: impl Into<String>, allow_snapshots: bool) -> EnvironmentResult<Self> {
        let version = version.into();
        if version != SNAPSHOT {
            let is_release = RELEASE_VERSION_PATTERN.is_match(&version);
            let valid = if allow_snapshots {
                is_release || SNAPSHOT_VERSION_PATTERN.is_match(&version)
            } else {
                is_release
            };
            if !valid {
                return Err(EnvironmentError::InvalidVersionFormat {
                    version,
                    allow_snapshots,
                });
            }
        }
        Ok(Self(version))
    }

    /// Parse a version string with snapshot versions disallowed.
    pub fn release(version: impl Into<String>) -> EnvironmentResult<Self> {
        Self::parse(version, false)
    }

    // Only for compile-time constants that are known to be valid.
    fn from_validated(version: &str) -> Self {
        Self(version.to_string())
    }

    /// Get the original version text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the `SNAPSHOT` sentinel.
    pub fn is_latest_snapshot(&self) -> bool {
        self.0 == SNAPSHOT
    }

    /// Returns `true` for the `SNAPSHOT` sentinel or a `-SNAPSHOT` suffixed version.
    pub fn is_snapshot(&self) -> bool {
        self.is_latest_snapshot() || self.0.ends_with("-SNAPSHOT")
    }

    /// Compare two versions.
    ///
    /// The sentinel `SNAPSHOT` is newer than anything else. Otherwise both
    /// strings are split on `.` and `-` and compared segment by segment as
    /// integers, skipping `SNAPSHOT` segments. When the common segments are
    /// all equal, the version with more segments is the greater one, so
    /// `2021.1.1` is newer than `2021.1` and `2021.1.1-SNAPSHOT` is newer than
    /// `2021.1.1`.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::InvalidNumericSegment` when a compared
    /// segment is not an integer, e.g. the suffix of `2018.1-beta`.
    pub fn compare(&self, other: &ServerVersion) -> EnvironmentResult<Ordering> {
        match (self.is_latest_snapshot(), other.is_latest_snapshot()) {
            (true, false) => return Ok(Ordering::Greater),
            (false, true) => return Ok(Ordering::Less),
            _ => {}
        }
        if self.0 == other.0 {
            return Ok(Ordering::Equal);
        }

        let parts = self.segments();
        let other_parts = other.segments();
        for (part, other_part) in parts.iter().zip(other_parts.iter()) {
            if *part == SNAPSHOT || *other_part == SNAPSHOT {
                continue;
            }
            let number = self.numeric_segment(part)?;
            let other_number = other.numeric_segment(other_part)?;
            match number.cmp(&other_number) {
                Ordering::Equal => {}
                decided => return Ok(decided),
            }
        }
        Ok(parts.len().cmp(&other_parts.len()))
    }

    /// Returns `true` if this version is older than `other`.
    pub fn less_than(&self, other: &ServerVersion) -> EnvironmentResult<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    /// Returns `true` if this version is the same as or newer than `other`.
    pub fn equal_or_greater_than(&self, other: &ServerVersion) -> EnvironmentResult<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    /// The `major.minor` prefix used to name the server data directory.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::MissingDataVersionPrefix` for the `SNAPSHOT`
    /// sentinel, which has no numeric prefix.
    pub fn data_version(&self) -> EnvironmentResult<String> {
        DATA_VERSION_PATTERN
            .captures(&self.0)
            .and_then(|captures| captures.get(1))
            .map(|prefix| prefix.as_str().to_string())
            .ok_or_else(|| EnvironmentError::MissingDataVersionPrefix {
                version: self.0.clone(),
            })
    }

    fn segments(&self) -> Vec<&str> {
        self.0.split(|c| c == '.' || c == '-').collect()
    }

    fn numeric_segment(&self, segment: &str) -> EnvironmentResult<u64> {
        segment
            .parse::<u64>()
            .map_err(|_| EnvironmentError::InvalidNumericSegment {
                version: self.0.clone(),
                segment: segment.to_string(),
            })
    }
}

impl Default for ServerVersion {
    fn default() -> Self {
        VERSION_9_0.clone()
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ServerVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServerVersion {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::release(s)
    }
}

impl From<ServerVersion> for String {
    fn from(version: ServerVersion) -> String {
        version.0
    }
}

impl Serialize for ServerVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
