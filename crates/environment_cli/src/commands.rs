//! Command modules for the `teamcity-env` CLI.
//!
//! - `environments_cmd`: list environments and show their resolved settings
//! - `launch_cmd`: start and stop the server or agent of an environment
//! - `version_cmd`: compare versions and derive data versions

pub mod environments_cmd;
pub mod launch_cmd;
pub mod version_cmd;
