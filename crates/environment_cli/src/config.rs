//! Build file and override configuration for the `teamcity-env` CLI.
//!
//! Every command that works with environments loads the `teamcity.toml` build
//! file. External overrides come from two layers, first hit wins:
//!
//! 1. `-P teamcity.environments.<env>.<setting>=<value>` properties
//! 2. `TEAMCITY_ENVIRONMENTS__<ENV>__<SETTING>` environment variables

use std::path::{Path, PathBuf};

use clap::Args;
use environment_config::override_source::OVERRIDE_NAMESPACE;
use environment_config::{
    BuildFile, EnvironmentVariableOverrides, LayeredOverrides, PluginSettings, PropertyOverrides,
    DEFAULT_BUILD_FILE,
};
use tracing::{debug, warn};

use crate::errors::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path of the build file [default: ./teamcity.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a setting, e.g. -P teamcity.environments.ci.homeDir=/opt/tc
    #[arg(short = 'P', long = "property", value_parser = parse_key_val, global = true)]
    pub properties: Vec<(String, String)>,
}

impl ConfigArgs {
    /// The build file path, defaulting to the build file in the current directory.
    pub fn config_path(&self) -> PathBuf {
        get_config_path(self.config.as_deref())
    }

    /// Override sources: `-P` properties above environment variables.
    pub fn overrides(&self) -> LayeredOverrides {
        let properties = PropertyOverrides::new();
        for (key, value) in &self.properties {
            if !is_override_key(key) {
                warn!(
                    key = key.as_str(),
                    "Property is outside the teamcity.environments namespace and has no effect"
                );
            }
            properties.set(key.as_str(), value.as_str());
        }

        LayeredOverrides::new()
            .with_layer(properties)
            .with_layer(EnvironmentVariableOverrides::new())
    }

    /// Load the build file and apply it to plugin settings.
    pub fn load_plugin(&self) -> Result<PluginSettings, Error> {
        let path = self.config_path();
        debug!(message = "Loading build file", path = ?path);

        if !path.exists() {
            return Err(Error::Config(format!("Build file not found: {:?}", path)));
        }

        Ok(BuildFile::load_settings(&path, self.overrides())?)
    }
}

/// Get the build file path.
///
/// Returns `config_path` when given, otherwise `teamcity.toml` in the current
/// directory.
pub fn get_config_path(config_path: Option<&Path>) -> PathBuf {
    if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_BUILD_FILE)
    }
}

/// Returns `true` when `key` lies inside the `teamcity.environments.` namespace.
pub fn is_override_key(key: &str) -> bool {
    key.strip_prefix(OVERRIDE_NAMESPACE)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
