//! Plugin metadata.
//!
//! [`PluginSettings`] describes the plugin under development: the TeamCity API
//! version it targets, its server and agent components, how it is published,
//! and the environments it is exercised in.

use crate::override_source::{NoOverrides, OverrideSource};
use crate::registry::EnvironmentRegistry;
use crate::version::{ServerVersion, VERSION_2018_2, VERSION_2020_1};
use crate::{EnvironmentError, EnvironmentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error};

/// Channel a plugin is published to when none are configured.
pub const DEFAULT_PUBLISH_CHANNEL: &str = "Stable";

/// Server-side component of the plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerComponentSettings {
    /// Name of the plugin archive, without extension.
    #[serde(default)]
    pub archive_name: Option<String>,

    /// Path of a hand-written plugin descriptor.
    #[serde(default)]
    pub descriptor: Option<PathBuf>,

    /// Whether the server may reload the plugin without a restart.
    #[serde(default)]
    pub allow_runtime_reload: Option<bool>,

    /// Whether the plugin supports multi-node responsibilities.
    #[serde(default)]
    pub node_responsibilities_aware: Option<bool>,
}

/// Files of an agent tool deployment that must be marked executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDeployment {
    #[serde(default)]
    pub executable_files: Vec<String>,
}

impl ToolDeployment {
    pub fn add_executable_file(&mut self, path: impl Into<String>) {
        self.executable_files.push(path.into());
    }
}

/// Agent-side component of the plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentComponentSettings {
    #[serde(default)]
    pub archive_name: Option<String>,

    #[serde(default)]
    pub descriptor: Option<PathBuf>,

    /// Present when the agent component is a tool rather than a plugin.
    #[serde(default)]
    pub tool_deployment: Option<ToolDeployment>,
}

impl AgentComponentSettings {
    /// Make the agent component a tool deployment and return it.
    pub fn tool_deployment_mut(&mut self) -> &mut ToolDeployment {
        self.tool_deployment.get_or_insert_with(ToolDeployment::default)
    }

    pub fn is_tool_deployment(&self) -> bool {
        self.tool_deployment.is_some()
    }
}

/// Publishing of the plugin to the plugin repository.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSettings {
    /// Channels the plugin is published to.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    /// Upload token.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Release notes.
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_channels() -> Vec<String> {
    vec![DEFAULT_PUBLISH_CHANNEL.to_string()]
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            token: None,
            notes: None,
        }
    }
}

impl fmt::Debug for PublishSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishSettings")
            .field("channels", &self.channels)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("notes", &self.notes)
            .finish()
    }
}

/// The plugin under development.
///
/// # Examples
///
/// ```
/// use environment_config::PluginSettings;
///
/// let mut plugin = PluginSettings::new();
/// plugin.set_version("2020.1")?;
/// plugin.server_mut().allow_runtime_reload = Some(true);
/// plugin.validate()?;
///
/// plugin
///     .environments_mut()
///     .configure("teamcity2020", |env| env.set_version("2020.1.3"))?;
/// # Ok::<(), environment_config::EnvironmentError>(())
/// ```
#[derive(Debug)]
pub struct PluginSettings {
    version: ServerVersion,
    allow_snapshot_versions: bool,
    server: Option<ServerComponentSettings>,
    agent: Option<AgentComponentSettings>,
    publish: Option<PublishSettings>,
    environments: EnvironmentRegistry,
}

impl PluginSettings {
    /// Plugin settings whose environments see no external overrides.
    pub fn new() -> Self {
        Self::with_overrides(NoOverrides)
    }

    /// Plugin settings whose environments consult the given override source.
    pub fn with_overrides(overrides: impl OverrideSource + 'static) -> Self {
        Self {
            version: ServerVersion::default(),
            allow_snapshot_versions: false,
            server: None,
            agent: None,
            publish: None,
            environments: EnvironmentRegistry::with_overrides(overrides),
        }
    }

    /// The TeamCity API version the plugin is built against.
    pub fn version(&self) -> &ServerVersion {
        &self.version
    }

    /// Set the TeamCity API version.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::InvalidVersionFormat` for an invalid version;
    /// the previous version is kept.
    pub fn set_version(&mut self, version: &str) -> EnvironmentResult<()> {
        self.version = ServerVersion::parse(version, self.allow_snapshot_versions)?;
        debug!(version = %self.version, "Setting plugin API version");
        Ok(())
    }

    pub fn allow_snapshot_versions(&self) -> bool {
        self.allow_snapshot_versions
    }

    /// Allow snapshot versions for the plugin and for every environment.
    pub fn set_allow_snapshot_versions(&mut self, allow: bool) {
        self.allow_snapshot_versions = allow;
        self.environments.set_allow_snapshot_versions(allow);
    }

    pub fn server(&self) -> Option<&ServerComponentSettings> {
        self.server.as_ref()
    }

    /// The server component, created on first use.
    pub fn server_mut(&mut self) -> &mut ServerComponentSettings {
        self.server.get_or_insert_with(ServerComponentSettings::default)
    }

    pub fn agent(&self) -> Option<&AgentComponentSettings> {
        self.agent.as_ref()
    }

    /// The agent component, created on first use.
    pub fn agent_mut(&mut self) -> &mut AgentComponentSettings {
        self.agent.get_or_insert_with(AgentComponentSettings::default)
    }

    pub fn publish(&self) -> Option<&PublishSettings> {
        self.publish.as_ref()
    }

    /// The publishing configuration, created with the default channel on first use.
    pub fn publish_mut(&mut self) -> &mut PublishSettings {
        self.publish.get_or_insert_with(PublishSettings::default)
    }

    pub fn environments(&self) -> &EnvironmentRegistry {
        &self.environments
    }

    pub fn environments_mut(&mut self) -> &mut EnvironmentRegistry {
        &mut self.environments
    }

    /// Whether the targeted API lets the server reload the plugin at runtime.
    pub fn supports_runtime_reload(&self) -> EnvironmentResult<bool> {
        self.version.equal_or_greater_than(&VERSION_2018_2)
    }

    /// Whether the targeted API knows about multi-node responsibilities.
    pub fn supports_node_responsibilities(&self) -> EnvironmentResult<bool> {
        self.version.equal_or_greater_than(&VERSION_2020_1)
    }

    /// Check that the configured components only use features of the targeted API.
    ///
    /// # Errors
    ///
    /// - `EnvironmentError::UnsupportedFeature` when a server descriptor
    ///   setting needs a newer API version
    /// - `EnvironmentError::InvalidNumericSegment` when the API version cannot
    ///   be compared with the feature milestones
    pub fn validate(&self) -> EnvironmentResult<()> {
        let Some(server) = &self.server else {
            return Ok(());
        };

        if server.allow_runtime_reload.is_some() {
            self.require(self.supports_runtime_reload(), "allowRuntimeReload", &VERSION_2018_2)?;
        }
        if server.node_responsibilities_aware.is_some() {
            self.require(
                self.supports_node_responsibilities(),
                "nodeResponsibilitiesAware",
                &VERSION_2020_1,
            )?;
        }
        Ok(())
    }

    fn require(
        &self,
        supported: EnvironmentResult<bool>,
        feature: &str,
        required: &ServerVersion,
    ) -> EnvironmentResult<()> {
        match supported {
            Ok(true) => Ok(()),
            Ok(false) => Err(EnvironmentError::UnsupportedFeature {
                feature: feature.to_string(),
                required: required.to_string(),
                version: self.version.to_string(),
            }),
            Err(e) => {
                error!(version = %self.version, feature, error = %e, "Cannot compare plugin API version");
                Err(e)
            }
        }
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
