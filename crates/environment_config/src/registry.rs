//! The environment registry.
//!
//! [`EnvironmentRegistry`] is the configuration context for one build
//! invocation. It owns the named environments (in declaration order), the
//! shared base values they derive their defaults from, and the external
//! override source every resolution consults.
//!
//! # Base values
//!
//! | Setting | Override key | Convention |
//! |---|---|---|
//! | `baseHomeDir` | `teamcity.environments.baseHomeDir` | `servers` |
//! | `baseDataDir` | `teamcity.environments.baseDataDir` | `data` |
//! | `baseDownloadUrl` | `teamcity.environments.baseDownloadUrl` | `https://download.jetbrains.com/teamcity` |
//! | `downloadsDir` | `teamcity.environments.downloadsDir` | `downloads` |
//!
//! Directory conventions are relative to the process working directory.

use crate::environment::{EnvironmentHandle, EnvironmentSettings};
use crate::override_source::{NoOverrides, OverrideSource};
use crate::resolver::{ResolvedSetting, SettingKey, SettingResolver};
use crate::{EnvironmentError, EnvironmentResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info};

/// Default directory that environment installations are unpacked into.
pub const DEFAULT_BASE_HOME_DIR: &str = "servers";

/// Default directory holding environment data directories.
pub const DEFAULT_BASE_DATA_DIR: &str = "data";

/// Default location distributions are downloaded from.
pub const DEFAULT_BASE_DOWNLOAD_URL: &str = "https://download.jetbrains.com/teamcity";

/// Default directory caching downloaded distributions.
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";

/// Registry-wide settings shared by every environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseSetting {
    BaseHomeDir,
    BaseDataDir,
    BaseDownloadUrl,
    DownloadsDir,
}

impl BaseSetting {
    /// All base settings in display order.
    pub const ALL: [BaseSetting; 4] = [
        BaseSetting::BaseHomeDir,
        BaseSetting::BaseDataDir,
        BaseSetting::BaseDownloadUrl,
        BaseSetting::DownloadsDir,
    ];

    /// The setting name used in override keys.
    pub fn name(&self) -> &'static str {
        match self {
            BaseSetting::BaseHomeDir => "baseHomeDir",
            BaseSetting::BaseDataDir => "baseDataDir",
            BaseSetting::BaseDownloadUrl => "baseDownloadUrl",
            BaseSetting::DownloadsDir => "downloadsDir",
        }
    }

    fn convention(&self) -> &'static str {
        match self {
            BaseSetting::BaseHomeDir => DEFAULT_BASE_HOME_DIR,
            BaseSetting::BaseDataDir => DEFAULT_BASE_DATA_DIR,
            BaseSetting::BaseDownloadUrl => DEFAULT_BASE_DOWNLOAD_URL,
            BaseSetting::DownloadsDir => DEFAULT_DOWNLOADS_DIR,
        }
    }
}

#[derive(Debug, Default)]
struct BaseValues {
    base_home_dir: Option<String>,
    base_data_dir: Option<String>,
    base_download_url: Option<String>,
    downloads_dir: Option<String>,
}

impl BaseValues {
    fn get(&self, setting: BaseSetting) -> Option<&str> {
        match setting {
            BaseSetting::BaseHomeDir => self.base_home_dir.as_deref(),
            BaseSetting::BaseDataDir => self.base_data_dir.as_deref(),
            BaseSetting::BaseDownloadUrl => self.base_download_url.as_deref(),
            BaseSetting::DownloadsDir => self.downloads_dir.as_deref(),
        }
    }

    fn set(&mut self, setting: BaseSetting, value: String) {
        let slot = match setting {
            BaseSetting::BaseHomeDir => &mut self.base_home_dir,
            BaseSetting::BaseDataDir => &mut self.base_data_dir,
            BaseSetting::BaseDownloadUrl => &mut self.base_download_url,
            BaseSetting::DownloadsDir => &mut self.downloads_dir,
        };
        *slot = Some(value);
    }
}

/// State shared read-only between the registry and its environments.
pub(crate) struct RegistryContext {
    overrides: Box<dyn OverrideSource>,
    base: RefCell<BaseValues>,
    allow_snapshot_versions: Cell<bool>,
}

impl RegistryContext {
    pub(crate) fn resolver(&self) -> SettingResolver<'_> {
        SettingResolver::new(self.overrides.as_ref())
    }

    pub(crate) fn resolve_base(&self, setting: BaseSetting) -> EnvironmentResult<ResolvedSetting> {
        let base = self.base.borrow();
        self.resolver().resolve(
            SettingKey::registry(setting.name()),
            base.get(setting),
            || Ok(Some(setting.convention().to_string())),
        )
    }

    pub(crate) fn allow_snapshot_versions(&self) -> bool {
        self.allow_snapshot_versions.get()
    }
}

/// The named environments of one build invocation plus their shared base values.
///
/// # Examples
///
/// ```
/// use environment_config::{EnvironmentRegistry, PropertyOverrides};
///
/// let overrides = PropertyOverrides::new();
/// let mut registry = EnvironmentRegistry::with_overrides(overrides.clone());
/// registry.set_base_home_dir("/opt/teamcity");
///
/// let ci = registry.environment("ci")?;
/// ci.borrow_mut().set_version("2020.1.3")?;
/// assert_eq!(ci.borrow().home_dir()?, "/opt/teamcity/TeamCity-2020.1.3");
///
/// overrides.set("teamcity.environments.ci.homeDir", "/tmp/ci");
/// assert_eq!(ci.borrow().home_dir()?, "/tmp/ci");
/// # Ok::<(), environment_config::EnvironmentError>(())
/// ```
pub struct EnvironmentRegistry {
    context: Rc<RegistryContext>,
    environments: Vec<EnvironmentHandle>,
}

impl EnvironmentRegistry {
    /// Create a registry without external overrides.
    pub fn new() -> Self {
        Self::with_overrides(NoOverrides)
    }

    /// Create a registry that consults the given override source.
    pub fn with_overrides(overrides: impl OverrideSource + 'static) -> Self {
        Self {
            context: Rc::new(RegistryContext {
                overrides: Box::new(overrides),
                base: RefCell::new(BaseValues::default()),
                allow_snapshot_versions: Cell::new(false),
            }),
            environments: Vec::new(),
        }
    }

    /// Whether environment versions may use snapshot grammar.
    pub fn allow_snapshot_versions(&self) -> bool {
        self.context.allow_snapshot_versions()
    }

    /// Allow or disallow snapshot grammar for environment versions.
    pub fn set_allow_snapshot_versions(&mut self, allow: bool) {
        self.context.allow_snapshot_versions.set(allow);
    }

    /// Set the explicit value of a base setting.
    pub fn set_base(&mut self, setting: BaseSetting, value: impl Into<String>) {
        let value = value.into();
        debug!(setting = setting.name(), value = %value, "Setting registry base value");
        self.context.base.borrow_mut().set(setting, value);
    }

    /// Resolve a base setting (override, explicit value, then convention).
    pub fn resolve_base(&self, setting: BaseSetting) -> EnvironmentResult<ResolvedSetting> {
        self.context.resolve_base(setting)
    }

    pub fn set_base_home_dir(&mut self, value: impl Into<String>) {
        self.set_base(BaseSetting::BaseHomeDir, value);
    }

    pub fn set_base_data_dir(&mut self, value: impl Into<String>) {
        self.set_base(BaseSetting::BaseDataDir, value);
    }

    pub fn set_base_download_url(&mut self, value: impl Into<String>) {
        self.set_base(BaseSetting::BaseDownloadUrl, value);
    }

    pub fn set_downloads_dir(&mut self, value: impl Into<String>) {
        self.set_base(BaseSetting::DownloadsDir, value);
    }

    /// The directory environment installations are placed in.
    pub fn base_home_dir(&self) -> EnvironmentResult<String> {
        self.resolve_base(BaseSetting::BaseHomeDir)
            .map(ResolvedSetting::into_value)
    }

    /// The directory environment data directories are placed in.
    pub fn base_data_dir(&self) -> EnvironmentResult<String> {
        self.resolve_base(BaseSetting::BaseDataDir)
            .map(ResolvedSetting::into_value)
    }

    /// The URL distributions are downloaded from.
    pub fn base_download_url(&self) -> EnvironmentResult<String> {
        self.resolve_base(BaseSetting::BaseDownloadUrl)
            .map(ResolvedSetting::into_value)
    }

    /// The directory downloaded distributions are cached in.
    pub fn downloads_dir(&self) -> EnvironmentResult<String> {
        self.resolve_base(BaseSetting::DownloadsDir)
            .map(ResolvedSetting::into_value)
    }

    /// Get the environment with the given name, creating it with convention
    /// values if it does not exist yet.
    ///
    /// Repeated calls with the same name return handles to the same environment.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::InvalidEnvironmentName` for an empty name.
    pub fn environment(&mut self, name: &str) -> EnvironmentResult<EnvironmentHandle> {
        if name.is_empty() {
            return Err(EnvironmentError::InvalidEnvironmentName {
                reason: "Environment name cannot be empty".to_string(),
            });
        }

        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }

        info!(environment = name, "Creating environment");
        let handle = EnvironmentHandle::new(EnvironmentSettings::new(
            name,
            Rc::clone(&self.context),
        ));
        self.environments.push(handle.clone());
        Ok(handle)
    }

    /// Get or create an environment and run a configuration callback on it.
    ///
    /// # Errors
    ///
    /// Returns the name validation error or the first error reported by `configure`.
    pub fn configure<F>(&mut self, name: &str, configure: F) -> EnvironmentResult<EnvironmentHandle>
    where
        F: FnOnce(&mut EnvironmentSettings) -> EnvironmentResult<()>,
    {
        let handle = self.environment(name)?;
        handle.configure(configure)?;
        Ok(handle)
    }

    /// Look up an environment without creating it.
    pub fn get(&self, name: &str) -> Option<EnvironmentHandle> {
        self.environments
            .iter()
            .find(|environment| environment.name() == name)
            .cloned()
    }

    /// All environments in declaration order.
    pub fn list(&self) -> impl Iterator<Item = &EnvironmentHandle> + '_ {
        self.environments.iter()
    }

    /// Environment names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.list()
            .map(|environment| environment.name().to_string())
            .collect()
    }

    /// Number of environments.
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// Returns `true` when no environment has been declared.
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

impl Default for EnvironmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvironmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentRegistry")
            .field("environments", &self.names())
            .field("base", &self.context.base.borrow())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
