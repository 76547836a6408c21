//! The `teamcity.toml` build file.
//!
//! The build file declares the plugin metadata and the environments used to
//! exercise it:
//!
//! ```toml
//! [plugin]
//! version = "2020.1"
//! allow_snapshot_versions = false
//!
//! [plugin.publish]
//! channels = ["Beta"]
//!
//! [environments]
//! base_home_dir = "servers"
//! base_data_dir = "data"
//!
//! [environments.teamcity2020]
//! version = "2020.1.3"
//! additional_server_options = ["-Xmx1g"]
//! plugins = ["build/distributions/plugin.zip"]
//! ```
//!
//! Environments are created in the order their tables appear. Values are
//! applied through the same setters used by code, so an invalid version fails
//! while the file is applied and the error names the environment.

use crate::override_source::OverrideSource;
use crate::plugin::{
    AgentComponentSettings, PluginSettings, PublishSettings, ServerComponentSettings,
};
use crate::registry::EnvironmentRegistry;
use crate::{EnvironmentError, EnvironmentResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default build file name.
pub const DEFAULT_BUILD_FILE: &str = "teamcity.toml";

/// The contents of a build file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
    #[serde(default)]
    pub plugin: PluginSection,

    #[serde(default)]
    pub environments: EnvironmentsSection,
}

/// The `[plugin]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    pub version: Option<String>,
    pub allow_snapshot_versions: Option<bool>,
    pub server: Option<ServerComponentSettings>,
    pub agent: Option<AgentComponentSettings>,
    pub publish: Option<PublishSettings>,
}

/// The `[environments]` table: registry base values plus one sub-table per
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentsSection {
    pub base_home_dir: Option<String>,
    pub base_data_dir: Option<String>,
    pub base_download_url: Option<String>,
    pub downloads_dir: Option<String>,

    /// Environment tables in declaration order.
    #[serde(flatten)]
    pub environments: toml::Table,
}

/// One `[environments.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSection {
    pub version: Option<String>,
    pub download_url: Option<String>,
    pub home_dir: Option<String>,
    pub data_dir: Option<String>,
    pub java_home: Option<String>,
    pub plugins: Option<Vec<PathBuf>>,

    /// Replaces every server option, including the developer-mode defaults.
    pub server_options: Option<Vec<String>>,
    pub additional_server_options: Option<Vec<String>>,
    pub agent_options: Option<Vec<String>>,
    pub additional_agent_options: Option<Vec<String>>,
}

impl BuildFile {
    /// Load a build file from disk.
    ///
    /// # Errors
    ///
    /// - `EnvironmentError::FileNotFound` if `path` does not exist
    /// - `EnvironmentError::FileAccessError` if it cannot be read
    /// - `EnvironmentError::ParseError` if it is not a valid build file
    pub fn load(path: &Path) -> EnvironmentResult<Self> {
        debug!(path = ?path, "Loading build file");

        if !path.exists() {
            return Err(EnvironmentError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| EnvironmentError::FileAccessError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        content.parse()
    }

    /// Load a build file and apply it to new plugin settings.
    ///
    /// # Errors
    ///
    /// Returns any load error, any error raised while applying the values,
    /// and any feature the targeted API version does not support.
    pub fn load_settings(
        path: &Path,
        overrides: impl OverrideSource + 'static,
    ) -> EnvironmentResult<PluginSettings> {
        let build_file = Self::load(path)?;
        let mut plugin = PluginSettings::with_overrides(overrides);
        build_file.apply(&mut plugin)?;
        plugin.validate()?;
        info!(
            path = ?path,
            environments = plugin.environments().len(),
            "Loaded build file"
        );
        Ok(plugin)
    }

    /// The environment tables in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::ParseError` if a table does not describe an
    /// environment.
    pub fn environment_sections(&self) -> EnvironmentResult<Vec<(String, EnvironmentSection)>> {
        self.environments
            .environments
            .iter()
            .map(|(name, value)| {
                let section = value.clone().try_into::<EnvironmentSection>().map_err(|e| {
                    EnvironmentError::ParseError {
                        reason: format!("environment '{}': {}", name, e),
                    }
                })?;
                Ok((name.clone(), section))
            })
            .collect()
    }

    /// Apply the file to plugin settings.
    ///
    /// The snapshot flag is applied before any version so that snapshot
    /// versions are accepted when the file allows them.
    pub fn apply(&self, plugin: &mut PluginSettings) -> EnvironmentResult<()> {
        let section = &self.plugin;
        if let Some(allow) = section.allow_snapshot_versions {
            plugin.set_allow_snapshot_versions(allow);
        }
        if let Some(version) = &section.version {
            plugin.set_version(version)?;
        }
        if let Some(server) = &section.server {
            *plugin.server_mut() = server.clone();
        }
        if let Some(agent) = &section.agent {
            *plugin.agent_mut() = agent.clone();
        }
        if let Some(publish) = &section.publish {
            *plugin.publish_mut() = publish.clone();
        }

        let environments = self.environment_sections()?;
        self.environments.apply_base_values(plugin.environments_mut());
        for (name, environment) in environments {
            environment.apply(&name, plugin.environments_mut())?;
        }
        Ok(())
    }
}

impl FromStr for BuildFile {
    type Err = EnvironmentError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        toml::from_str(content).map_err(|e| EnvironmentError::ParseError {
            reason: e.to_string(),
        })
    }
}

impl EnvironmentsSection {
    fn apply_base_values(&self, registry: &mut EnvironmentRegistry) {
        if let Some(value) = &self.base_home_dir {
            registry.set_base_home_dir(value.as_str());
        }
        if let Some(value) = &self.base_data_dir {
            registry.set_base_data_dir(value.as_str());
        }
        if let Some(value) = &self.base_download_url {
            registry.set_base_download_url(value.as_str());
        }
        if let Some(value) = &self.downloads_dir {
            registry.set_downloads_dir(value.as_str());
        }
    }
}

impl EnvironmentSection {
    fn apply(&self, name: &str, registry: &mut EnvironmentRegistry) -> EnvironmentResult<()> {
        registry.configure(name, |env| {
            if let Some(version) = &self.version {
                env.set_version(version)?;
            }
            if let Some(value) = &self.download_url {
                env.set_download_url(value.as_str());
            }
            if let Some(value) = &self.home_dir {
                env.set_home_dir(value.as_str());
            }
            if let Some(value) = &self.data_dir {
                env.set_data_dir(value.as_str());
            }
            if let Some(value) = &self.java_home {
                env.set_java_home(value.as_str());
            }
            if let Some(plugins) = &self.plugins {
                env.set_plugins(plugins.iter().cloned());
            }
            if let Some(options) = &self.server_options {
                env.set_server_options(options.iter().cloned());
            }
            if let Some(options) = &self.additional_server_options {
                env.add_server_options(options.iter().cloned());
            }
            if let Some(options) = &self.agent_options {
                env.set_agent_options(options.iter().cloned());
            }
            if let Some(options) = &self.additional_agent_options {
                env.add_agent_options(options.iter().cloned());
            }
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "build_file_tests.rs"]
mod tests;
