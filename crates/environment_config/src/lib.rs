//! Configuration model for TeamCity plugin development environments.
//!
//! An environment is a local TeamCity installation used to exercise a plugin
//! during development. This crate provides:
//!
//! - [`ServerVersion`]: the TeamCity version grammar and its comparator
//! - [`SettingResolver`]: three-tier resolution (external override, explicit
//!   value, computed convention) over an [`OverrideSource`]
//! - [`EnvironmentRegistry`] and [`EnvironmentSettings`]: named environments
//!   whose paths and options are derived from the registry base values
//! - [`PluginSettings`]: plugin metadata that owns the registry
//! - [`BuildFile`]: the `teamcity.toml` build file
//! - [`LaunchCommand`]: the server and agent start/stop scripts

pub mod build_file;
pub mod environment;
pub mod errors;
pub mod jvm_options;
pub mod launch;
pub mod override_source;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod version;

pub use build_file::{BuildFile, DEFAULT_BUILD_FILE};
pub use environment::{
    EnvironmentHandle, EnvironmentSettings, ResolvedEnvironment, Setting, PRODUCT_NAME,
};
pub use errors::{EnvironmentError, EnvironmentResult};
pub use jvm_options::JvmOptions;
pub use launch::{LaunchAction, LaunchCommand, Platform};
pub use override_source::{
    EnvironmentVariableOverrides, LayeredOverrides, NoOverrides, OverrideSource,
    PropertyOverrides,
};
pub use plugin::{
    AgentComponentSettings, PluginSettings, PublishSettings, ServerComponentSettings,
    ToolDeployment,
};
pub use registry::{BaseSetting, EnvironmentRegistry};
pub use resolver::{ResolvedSetting, SettingKey, SettingResolver, SettingSource};
pub use version::ServerVersion;
