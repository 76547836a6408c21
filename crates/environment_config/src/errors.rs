//! Environment configuration error types.
//!
//! Domain-specific errors for version parsing, setting resolution
//! and build file loading.

use thiserror::Error;

/// Examples quoted when a release version string is rejected.
const RELEASE_EXAMPLES: &str = "'9.0', '10.0.5', '2018.1'";

/// Examples quoted when snapshot versions are allowed but the string is rejected.
const SNAPSHOT_EXAMPLES: &str = "'10.0-SNAPSHOT', '2021.1', '2021.2.1-SNAPSHOT'";

/// Environment configuration errors.
///
/// All of these are configuration errors: they are raised synchronously while
/// the environments are being configured or resolved and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("'{version}' is not a valid TeamCity version string (examples: {})", version_examples(.allow_snapshots))]
    InvalidVersionFormat {
        version: String,
        allow_snapshots: bool,
    },

    #[error("Version '{version}' has a non-numeric segment '{segment}' and cannot be compared")]
    InvalidNumericSegment { version: String, segment: String },

    #[error("Version '{version}' has no major.minor prefix to derive a data version from")]
    MissingDataVersionPrefix { version: String },

    #[error("Setting '{setting}' of environment '{environment}' has no override, value or default")]
    UnresolvedSetting { environment: String, setting: String },

    #[error("Invalid environment name: {reason}")]
    InvalidEnvironmentName { reason: String },

    #[error("Invalid value for setting '{setting}' of environment '{environment}': {reason}")]
    InvalidSetting {
        environment: String,
        setting: String,
        reason: String,
    },

    #[error("'{feature}' requires TeamCity {required} or later, but the plugin targets {version}")]
    UnsupportedFeature {
        feature: String,
        required: String,
        version: String,
    },

    #[error("Build file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to access build file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Failed to parse build file: {reason}")]
    ParseError { reason: String },
}

impl EnvironmentError {
    /// Attach the environment and setting names to a lower level failure.
    ///
    /// Errors that already carry the names are returned unchanged.
    pub fn for_setting(self, environment: &str, setting: &str) -> Self {
        match self {
            EnvironmentError::UnresolvedSetting { .. } | EnvironmentError::InvalidSetting { .. } => {
                self
            }
            other => EnvironmentError::InvalidSetting {
                environment: environment.to_string(),
                setting: setting.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

fn version_examples(allow_snapshots: &bool) -> &'static str {
    if *allow_snapshots {
        SNAPSHOT_EXAMPLES
    } else {
        RELEASE_EXAMPLES
    }
}

/// Result type alias for environment configuration operations.
pub type EnvironmentResult<T> = Result<T, EnvironmentError>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
