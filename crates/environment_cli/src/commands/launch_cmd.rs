//! Server and agent start/stop commands.
//!
//! ```bash
//! teamcity-env server start teamcity2020
//! teamcity-env agent stop teamcity2020
//! teamcity-env server start teamcity2020 --dry-run   # print the command only
//! ```
//!
//! The launch script is spawned and left running; the command does not wait
//! for the server or agent to become ready.

use clap::Subcommand;
use colored::Colorize;
use environment_config::{
    EnvironmentRegistry, LaunchAction, LaunchCommand, Platform, PluginSettings,
};
use tracing::{debug, info, instrument};

use crate::config::ConfigArgs;
use crate::errors::Error;

#[cfg(test)]
#[path = "launch_cmd_tests.rs"]
mod tests;

/// The process a launch command controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Server,
    Agent,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LaunchCommands {
    /// Start the process of an environment.
    Start {
        /// Environment name.
        environment: String,

        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Stop the process of an environment.
    Stop {
        /// Environment name.
        environment: String,

        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
}

impl LaunchCommands {
    fn parts(&self) -> (LaunchAction, &str, bool) {
        match self {
            LaunchCommands::Start {
                environment,
                dry_run,
            } => (LaunchAction::Start, environment.as_str(), *dry_run),
            LaunchCommands::Stop {
                environment,
                dry_run,
            } => (LaunchAction::Stop, environment.as_str(), *dry_run),
        }
    }
}

#[instrument]
pub async fn execute(
    target: LaunchTarget,
    cmd: &LaunchCommands,
    config: &ConfigArgs,
) -> Result<(), Error> {
    let (action, environment, dry_run) = cmd.parts();
    let plugin = config.load_plugin()?;
    let command = build_launch_command(&plugin, target, environment, action, Platform::current())?;

    if dry_run {
        println!("{}", command);
        return Ok(());
    }

    spawn(&command)?;
    println!(
        "{} {:?} {} for environment {}",
        "✓".green(),
        target,
        action,
        environment.bold()
    );
    Ok(())
}

/// Compose the launch command for a declared environment.
pub fn build_launch_command(
    plugin: &PluginSettings,
    target: LaunchTarget,
    environment: &str,
    action: LaunchAction,
    platform: Platform,
) -> Result<LaunchCommand, Error> {
    let registry: &EnvironmentRegistry = plugin.environments();
    let handle = registry
        .get(environment)
        .ok_or_else(|| Error::UnknownEnvironment(environment.to_string()))?;
    let settings = handle.borrow();

    let command = match target {
        LaunchTarget::Server => LaunchCommand::server(&settings, action, platform)?,
        LaunchTarget::Agent => LaunchCommand::agent(&settings, action, platform)?,
    };
    debug!(
        message = "Composed launch command",
        environment = environment,
        program = command.program.as_str()
    );
    Ok(command)
}

/// Start the launch script without waiting for it to finish.
fn spawn(command: &LaunchCommand) -> Result<(), Error> {
    let child = tokio::process::Command::new(&command.program)
        .args(&command.args)
        .envs(command.env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .spawn()
        .map_err(|source| Error::Launch {
            program: command.program.clone(),
            source,
        })?;

    info!(
        program = command.program.as_str(),
        pid = ?child.id(),
        "Launched script"
    );
    Ok(())
}
