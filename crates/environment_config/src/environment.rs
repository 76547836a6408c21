//! Settings of a single TeamCity environment.
//!
//! An environment is one local TeamCity installation used to try a plugin
//! during development. Each of its settings resolves through
//! [`SettingResolver`](crate::SettingResolver): an external override keyed by
//! `teamcity.environments.<name>.<setting>` wins, then a value set on the
//! environment, then a convention computed from the registry base values and
//! the environment's current version.
//!
//! | Setting | Convention |
//! |---|---|
//! | `downloadUrl` | `<baseDownloadUrl>/TeamCity-<version>.tar.gz` |
//! | `installerFile` | `<downloadsDir>/<file name of downloadUrl>` |
//! | `homeDir` | `<baseHomeDir>/TeamCity-<version>` |
//! | `dataDir` | `<baseDataDir>/<major.minor of version>` |
//! | `pluginsDir` | `<dataDir>/plugins` (derived only) |
//! | `javaHome` | `JAVA_HOME` of the current process |
//! | `serverOptions` | developer-mode flags, see [`DEFAULT_SERVER_OPTIONS`](crate::jvm_options::DEFAULT_SERVER_OPTIONS) |
//! | `agentOptions` | empty |
//!
//! Conventions are never cached. Changing the version after other settings
//! were read changes every value derived from it, unless that value was set
//! explicitly or overridden.

use crate::jvm_options::JvmOptions;
use crate::registry::{BaseSetting, RegistryContext};
use crate::resolver::{ResolvedSetting, SettingKey, SettingSource};
use crate::version::ServerVersion;
use crate::{EnvironmentError, EnvironmentResult};
use serde::Serialize;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// Product name used in distribution and installation directory names.
pub const PRODUCT_NAME: &str = "TeamCity";

/// Per-environment settings that can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    DownloadUrl,
    InstallerFile,
    HomeDir,
    DataDir,
    PluginsDir,
    JavaHome,
    ServerOptions,
    AgentOptions,
}

impl Setting {
    /// All settings in display order.
    pub const ALL: [Setting; 8] = [
        Setting::DownloadUrl,
        Setting::InstallerFile,
        Setting::HomeDir,
        Setting::DataDir,
        Setting::PluginsDir,
        Setting::JavaHome,
        Setting::ServerOptions,
        Setting::AgentOptions,
    ];

    /// The setting name used in override keys.
    pub fn name(&self) -> &'static str {
        match self {
            Setting::DownloadUrl => "downloadUrl",
            Setting::InstallerFile => "installerFile",
            Setting::HomeDir => "homeDir",
            Setting::DataDir => "dataDir",
            Setting::PluginsDir => "pluginsDir",
            Setting::JavaHome => "javaHome",
            Setting::ServerOptions => "serverOptions",
            Setting::AgentOptions => "agentOptions",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The settings of one named environment.
///
/// Created through [`EnvironmentRegistry::environment`](crate::EnvironmentRegistry::environment).
pub struct EnvironmentSettings {
    name: String,
    context: Rc<RegistryContext>,
    version: ServerVersion,
    download_url: Option<String>,
    home_dir: Option<String>,
    data_dir: Option<String>,
    java_home: Option<String>,
    plugins: Vec<PathBuf>,
    server_options: JvmOptions,
    agent_options: JvmOptions,
}

impl EnvironmentSettings {
    pub(crate) fn new(name: impl Into<String>, context: Rc<RegistryContext>) -> Self {
        Self {
            name: name.into(),
            context,
            version: ServerVersion::default(),
            download_url: None,
            home_dir: None,
            data_dir: None,
            java_home: None,
            plugins: Vec::new(),
            server_options: JvmOptions::server_defaults(),
            agent_options: JvmOptions::new(),
        }
    }

    /// The environment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The TeamCity version of this environment. Defaults to `9.0`.
    pub fn version(&self) -> &ServerVersion {
        &self.version
    }

    /// Set the TeamCity version.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::InvalidSetting` naming the environment and the
    /// `version` setting if `version` is not a valid version string; the
    /// previous version is kept.
    pub fn set_version(&mut self, version: &str) -> EnvironmentResult<()> {
        let parsed = ServerVersion::parse(version, self.context.allow_snapshot_versions())
            .map_err(|e| e.for_setting(&self.name, "version"))?;
        debug!(environment = %self.name, version = %parsed, "Setting environment version");
        self.version = parsed;
        Ok(())
    }

    pub fn set_download_url(&mut self, value: impl Into<String>) {
        self.download_url = Some(value.into());
    }

    pub fn set_home_dir(&mut self, value: impl Into<String>) {
        self.home_dir = Some(value.into());
    }

    pub fn set_data_dir(&mut self, value: impl Into<String>) {
        self.data_dir = Some(value.into());
    }

    pub fn set_java_home(&mut self, value: impl Into<String>) {
        self.java_home = Some(value.into());
    }

    /// Plugin archives deployed to this environment, in the order added.
    pub fn plugins(&self) -> &[PathBuf] {
        &self.plugins
    }

    /// Replace the plugins deployed to this environment.
    pub fn set_plugins<I, P>(&mut self, plugins: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.plugins.clear();
        self.add_plugins(plugins);
    }

    /// Add plugins to deploy. Duplicates are kept.
    pub fn add_plugins<I, P>(&mut self, plugins: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.plugins.extend(plugins.into_iter().map(Into::into));
    }

    /// The configured server options, before external overrides.
    pub fn server_options_list(&self) -> &JvmOptions {
        &self.server_options
    }

    /// Replace all server options, including the developer-mode defaults.
    pub fn set_server_options<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.server_options.set(options);
    }

    /// Append a server option.
    pub fn add_server_option(&mut self, option: impl Into<String>) {
        self.server_options.add(option);
    }

    /// Append server options in order.
    pub fn add_server_options<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.server_options.add_all(options);
    }

    /// The configured agent options, before external overrides.
    pub fn agent_options_list(&self) -> &JvmOptions {
        &self.agent_options
    }

    /// Replace all agent options.
    pub fn set_agent_options<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agent_options.set(options);
    }

    /// Append an agent option.
    pub fn add_agent_option(&mut self, option: impl Into<String>) {
        self.agent_options.add(option);
    }

    /// Append agent options in order.
    pub fn add_agent_options<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agent_options.add_all(options);
    }

    /// Resolve a setting considering external overrides.
    ///
    /// # Errors
    ///
    /// - `EnvironmentError::InvalidSetting` naming the environment and setting,
    ///   e.g. when a data directory has to be derived from the `SNAPSHOT` version
    /// - `EnvironmentError::UnresolvedSetting` when the Java home is not set
    ///   and `JAVA_HOME` is not defined
    pub fn resolve(&self, setting: Setting) -> EnvironmentResult<ResolvedSetting> {
        self.resolve_unnamed(setting)
            .map_err(|e| e.for_setting(&self.name, setting.name()))
    }

    fn resolve_unnamed(&self, setting: Setting) -> EnvironmentResult<ResolvedSetting> {
        let resolver = self.context.resolver();
        let key = SettingKey::environment(&self.name, setting.name());

        match setting {
            Setting::DownloadUrl => resolver.resolve(key, self.download_url.as_deref(), || {
                let base = self.context.resolve_base(BaseSetting::BaseDownloadUrl)?;
                Ok(Some(format!(
                    "{}/{}-{}.tar.gz",
                    base.value, PRODUCT_NAME, self.version
                )))
            }),
            Setting::InstallerFile => resolver.resolve(key, None, || {
                let downloads = self.context.resolve_base(BaseSetting::DownloadsDir)?;
                let url = self.download_url()?;
                Ok(Some(format!("{}/{}", downloads.value, file_name(&url))))
            }),
            Setting::HomeDir => resolver.resolve(key, self.home_dir.as_deref(), || {
                let base = self.context.resolve_base(BaseSetting::BaseHomeDir)?;
                Ok(Some(format!("{}/{}-{}", base.value, PRODUCT_NAME, self.version)))
            }),
            Setting::DataDir => resolver.resolve(key, self.data_dir.as_deref(), || {
                let base = self.context.resolve_base(BaseSetting::BaseDataDir)?;
                Ok(Some(format!("{}/{}", base.value, self.version.data_version()?)))
            }),
            Setting::PluginsDir => {
                let data_dir = self.resolve(Setting::DataDir)?;
                Ok(ResolvedSetting {
                    value: format!("{}/plugins", data_dir.value),
                    source: data_dir.source,
                })
            }
            Setting::JavaHome => resolver.resolve(key, self.java_home.as_deref(), || {
                Ok(std::env::var("JAVA_HOME").ok())
            }),
            Setting::ServerOptions => {
                let joined = self.server_options.joined();
                resolver.resolve(key, Some(joined.as_str()), || Ok(None))
            }
            Setting::AgentOptions => {
                let joined = self.agent_options.joined();
                resolver.resolve(key, Some(joined.as_str()), || Ok(None))
            }
        }
    }

    /// The URL the TeamCity distribution is downloaded from.
    pub fn download_url(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::DownloadUrl).map(ResolvedSetting::into_value)
    }

    /// Where the downloaded distribution is stored.
    pub fn installer_file(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::InstallerFile).map(ResolvedSetting::into_value)
    }

    /// The TeamCity installation directory.
    pub fn home_dir(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::HomeDir).map(ResolvedSetting::into_value)
    }

    /// The TeamCity data directory.
    pub fn data_dir(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::DataDir).map(ResolvedSetting::into_value)
    }

    /// The directory plugins are deployed into.
    pub fn plugins_dir(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::PluginsDir).map(ResolvedSetting::into_value)
    }

    /// The Java home used to start the server and agent.
    pub fn java_home(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::JavaHome).map(ResolvedSetting::into_value)
    }

    /// Server JVM options joined with single spaces.
    pub fn server_options(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::ServerOptions).map(ResolvedSetting::into_value)
    }

    /// Agent JVM options joined with single spaces.
    pub fn agent_options(&self) -> EnvironmentResult<String> {
        self.resolve(Setting::AgentOptions).map(ResolvedSetting::into_value)
    }

    /// Resolve every setting into a snapshot for process-launch collaborators.
    ///
    /// A missing Java home is reported as `None` rather than an error so the
    /// remaining values can still be inspected.
    pub fn resolve_all(&self) -> EnvironmentResult<ResolvedEnvironment> {
        let java_home = match self.resolve(Setting::JavaHome) {
            Ok(resolved) => Some(resolved),
            Err(EnvironmentError::UnresolvedSetting { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(ResolvedEnvironment {
            name: self.name.clone(),
            version: self.version.clone(),
            download_url: self.resolve(Setting::DownloadUrl)?,
            installer_file: self.resolve(Setting::InstallerFile)?,
            home_dir: self.resolve(Setting::HomeDir)?,
            data_dir: self.resolve(Setting::DataDir)?,
            plugins_dir: self.resolve(Setting::PluginsDir)?,
            java_home,
            server_options: self.resolve(Setting::ServerOptions)?,
            agent_options: self.resolve(Setting::AgentOptions)?,
            plugins: self.plugins.clone(),
        })
    }
}

impl fmt::Debug for EnvironmentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentSettings")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("download_url", &self.download_url)
            .field("home_dir", &self.home_dir)
            .field("data_dir", &self.data_dir)
            .field("java_home", &self.java_home)
            .field("plugins", &self.plugins)
            .field("server_options", &self.server_options)
            .field("agent_options", &self.agent_options)
            .finish()
    }
}

fn file_name(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[index + 1..],
        None => url,
    }
}

/// Every setting of an environment, resolved at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    pub name: String,
    pub version: ServerVersion,
    pub download_url: ResolvedSetting,
    pub installer_file: ResolvedSetting,
    pub home_dir: ResolvedSetting,
    pub data_dir: ResolvedSetting,
    pub plugins_dir: ResolvedSetting,
    pub java_home: Option<ResolvedSetting>,
    pub server_options: ResolvedSetting,
    pub agent_options: ResolvedSetting,
    pub plugins: Vec<PathBuf>,
}

impl ResolvedEnvironment {
    /// The resolved Java home.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::UnresolvedSetting` when no Java home was found.
    pub fn require_java_home(&self) -> EnvironmentResult<&str> {
        self.java_home
            .as_ref()
            .map(|resolved| resolved.value.as_str())
            .ok_or_else(|| EnvironmentError::UnresolvedSetting {
                environment: self.name.clone(),
                setting: Setting::JavaHome.name().to_string(),
            })
    }

    /// Settings with their values and sources, in display order.
    pub fn settings(&self) -> Vec<(Setting, Option<&ResolvedSetting>)> {
        vec![
            (Setting::DownloadUrl, Some(&self.download_url)),
            (Setting::InstallerFile, Some(&self.installer_file)),
            (Setting::HomeDir, Some(&self.home_dir)),
            (Setting::DataDir, Some(&self.data_dir)),
            (Setting::PluginsDir, Some(&self.plugins_dir)),
            (Setting::JavaHome, self.java_home.as_ref()),
            (Setting::ServerOptions, Some(&self.server_options)),
            (Setting::AgentOptions, Some(&self.agent_options)),
        ]
    }

    /// Returns `true` when any setting came from an external override.
    pub fn has_overrides(&self) -> bool {
        self.settings()
            .into_iter()
            .any(|(_, resolved)| resolved.is_some_and(|r| r.source == SettingSource::Override))
    }
}

/// A shared handle to an environment owned by a registry.
///
/// Cloning the handle does not copy the environment: every handle for the
/// same name observes the same settings.
#[derive(Clone)]
pub struct EnvironmentHandle {
    name: String,
    inner: Rc<RefCell<EnvironmentSettings>>,
}

impl EnvironmentHandle {
    pub(crate) fn new(settings: EnvironmentSettings) -> Self {
        Self {
            name: settings.name.clone(),
            inner: Rc::new(RefCell::new(settings)),
        }
    }

    /// The environment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the settings for reading.
    ///
    /// # Panics
    ///
    /// Panics if the settings are currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, EnvironmentSettings> {
        self.inner.borrow()
    }

    /// Borrow the settings for modification.
    ///
    /// # Panics
    ///
    /// Panics if the settings are currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, EnvironmentSettings> {
        self.inner.borrow_mut()
    }

    /// Run a configuration callback against the settings.
    pub fn configure<F, R>(&self, configure: F) -> R
    where
        F: FnOnce(&mut EnvironmentSettings) -> R,
    {
        configure(&mut self.inner.borrow_mut())
    }

    /// Returns `true` if both handles refer to the same environment.
    pub fn ptr_eq(&self, other: &EnvironmentHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EnvironmentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnvironmentHandle").field(&self.name).finish()
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
