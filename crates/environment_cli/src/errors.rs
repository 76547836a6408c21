use std::io;

use environment_config::EnvironmentError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the `teamcity-env` CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// The build file could not be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resolving or validating environment settings failed.
    ///
    /// Covers invalid versions, settings without a value and features the
    /// targeted API version does not support.
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// The named environment is not declared in the build file.
    #[error("Unknown environment '{0}'")]
    UnknownEnvironment(String),

    /// A launch script could not be started.
    #[error("Failed to launch '{program}'")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}
