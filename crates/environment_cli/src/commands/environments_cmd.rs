//! Environment inspection commands.
//!
//! ```bash
//! # List the environments declared in teamcity.toml
//! teamcity-env environments list
//!
//! # Show every resolved setting of an environment and where it came from
//! teamcity-env environments show teamcity2020
//! teamcity-env -P teamcity.environments.teamcity2020.homeDir=/tmp/tc environments show teamcity2020 --json
//! ```

use clap::Subcommand;
use colored::Colorize;
use environment_config::{
    EnvironmentRegistry, PluginSettings, ResolvedEnvironment, SettingSource,
};
use tracing::{debug, instrument};

use crate::config::ConfigArgs;
use crate::errors::Error;

#[cfg(test)]
#[path = "environments_cmd_tests.rs"]
mod tests;

#[derive(Subcommand, Debug, Clone)]
pub enum EnvironmentsCommands {
    /// List the declared environments in declaration order.
    List,

    /// Show the resolved settings of an environment.
    Show {
        /// Environment name.
        name: String,

        /// Print the settings as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[instrument]
pub async fn execute(cmd: &EnvironmentsCommands, config: &ConfigArgs) -> Result<(), Error> {
    let plugin = config.load_plugin()?;
    let output = match cmd {
        EnvironmentsCommands::List => format_environment_list(&plugin)?,
        EnvironmentsCommands::Show { name, json } => {
            debug!(message = "Showing environment", name = name.as_str(), json = json);
            let resolved = resolve_environment(plugin.environments(), name)?;
            if *json {
                format_environment_json(&resolved)?
            } else {
                format_environment_pretty(&resolved)
            }
        }
    };
    println!("{}", output);
    Ok(())
}

/// Resolve every setting of a declared environment.
pub fn resolve_environment(
    registry: &EnvironmentRegistry,
    name: &str,
) -> Result<ResolvedEnvironment, Error> {
    let environment = registry
        .get(name)
        .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))?;
    let resolved = environment.borrow().resolve_all()?;
    Ok(resolved)
}

/// One line per environment: name, version and home directory.
pub fn format_environment_list(plugin: &PluginSettings) -> Result<String, Error> {
    let registry = plugin.environments();
    if registry.is_empty() {
        return Ok(format!("{}", "(no environments defined)".dimmed()));
    }

    let mut output = String::new();
    for environment in registry.list() {
        let settings = environment.borrow();
        output.push_str(&format!(
            "{}  {}  {}\n",
            settings.name().bold(),
            settings.version().as_str().green(),
            settings.home_dir()?
        ));
    }
    Ok(output.trim_end().to_string())
}

pub fn format_environment_json(resolved: &ResolvedEnvironment) -> Result<String, Error> {
    serde_json::to_string_pretty(resolved)
        .map_err(|e| Error::Config(format!("Failed to serialize to JSON: {}", e)))
}

/// Human-readable settings with their source.
pub fn format_environment_pretty(resolved: &ResolvedEnvironment) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} ({})\n\n",
        resolved.name.bold().bright_cyan(),
        resolved.version.as_str()
    ));

    for (setting, value) in resolved.settings() {
        match value {
            Some(value) => output.push_str(&format!(
                "  {:<14} {} {}\n",
                setting.name().bold(),
                value.value,
                source_marker(value.source)
            )),
            None => output.push_str(&format!(
                "  {:<14} {}\n",
                setting.name().bold(),
                "(not set)".red()
            )),
        }
    }

    output.push_str(&format!("\n{}\n", "Plugins:".bold()));
    if resolved.plugins.is_empty() {
        output.push_str(&format!("  {}\n", "(none)".dimmed()));
    } else {
        for plugin in &resolved.plugins {
            output.push_str(&format!("  {}\n", plugin.display()));
        }
    }
    output
}

fn source_marker(source: SettingSource) -> String {
    let marker = format!("[{}]", source);
    match source {
        SettingSource::Override => marker.yellow().to_string(),
        SettingSource::Explicit => marker.green().to_string(),
        SettingSource::Convention => marker.dimmed().to_string(),
    }
}
