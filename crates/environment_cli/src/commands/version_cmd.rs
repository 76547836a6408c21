//! Version commands.
//!
//! ```bash
//! teamcity-env version                       # CLI version
//! teamcity-env version compare 2020.1 2019.2.3
//! teamcity-env version compare 2021.1-SNAPSHOT 2021.1 --allow-snapshots
//! teamcity-env version data 2020.1.3         # prints 2020.1
//! ```

use std::cmp::Ordering;

use clap::{Args, Subcommand};
use environment_config::ServerVersion;
use tracing::{debug, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "version_cmd_tests.rs"]
mod tests;

#[derive(Args, Debug, Clone)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub command: Option<VersionCommands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum VersionCommands {
    /// Compare two TeamCity versions.
    Compare {
        first: String,
        second: String,

        /// Accept snapshot versions such as 2021.1-SNAPSHOT.
        #[arg(long)]
        allow_snapshots: bool,
    },

    /// Print the data directory version (major.minor) of a TeamCity version.
    Data { version: String },
}

#[instrument]
pub async fn execute(args: &VersionArgs) -> Result<(), Error> {
    let output = match &args.command {
        None => cli_version(),
        Some(VersionCommands::Compare {
            first,
            second,
            allow_snapshots,
        }) => {
            let ordering = compare_versions(first, second, *allow_snapshots)?;
            format_comparison(first, second, ordering)
        }
        Some(VersionCommands::Data { version }) => data_version(version)?,
    };
    println!("{}", output);
    Ok(())
}

pub fn cli_version() -> String {
    format!(
        "teamcity-env version {}",
        option_env!("TEAMCITY_ENV_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
    )
}

/// Parse and compare two versions.
pub fn compare_versions(
    first: &str,
    second: &str,
    allow_snapshots: bool,
) -> Result<Ordering, Error> {
    let first = ServerVersion::parse(first, allow_snapshots)?;
    let second = ServerVersion::parse(second, allow_snapshots)?;
    let ordering = first.compare(&second)?;
    debug!(message = "Compared versions", first = %first, second = %second, ordering = ?ordering);
    Ok(ordering)
}

pub fn format_comparison(first: &str, second: &str, ordering: Ordering) -> String {
    let symbol = match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    format!("{} {} {}", first, symbol, second)
}

/// The data directory version of a release version.
pub fn data_version(version: &str) -> Result<String, Error> {
    let version = ServerVersion::parse(version, true)?;
    Ok(version.data_version()?)
}
