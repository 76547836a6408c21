//! Server and agent launch commands.
//!
//! Builds the script invocation that starts or stops the TeamCity server or
//! build agent of an environment. Running the command and waiting for the
//! server to come up is left to the caller.

use crate::environment::EnvironmentSettings;
use crate::EnvironmentResult;
use serde::Serialize;
use std::fmt;

/// Operating system family, selects the launch script flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// The platform of the running process.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    fn script_extension(&self) -> &'static str {
        match self {
            Platform::Windows => "bat",
            Platform::Unix => "sh",
        }
    }
}

/// Whether a launch script starts or stops its process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchAction {
    Start,
    Stop,
}

impl LaunchAction {
    pub fn as_arg(&self) -> &'static str {
        match self {
            LaunchAction::Start => "start",
            LaunchAction::Stop => "stop",
        }
    }
}

impl fmt::Display for LaunchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// A fully resolved script invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    pub program: String,
    pub env: Vec<(String, String)>,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// The command that starts or stops the environment's server.
    ///
    /// Starting passes the data directory and the server options; stopping
    /// only needs the Java home.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of any required setting, for example
    /// `EnvironmentError::UnresolvedSetting` when no Java home is known.
    pub fn server(
        environment: &EnvironmentSettings,
        action: LaunchAction,
        platform: Platform,
    ) -> EnvironmentResult<Self> {
        let home_dir = environment.home_dir()?;
        let mut env = vec![("JAVA_HOME".to_string(), environment.java_home()?)];
        if action == LaunchAction::Start {
            env.push(("TEAMCITY_DATA_PATH".to_string(), environment.data_dir()?));
            env.push((
                "TEAMCITY_SERVER_OPTS".to_string(),
                environment.server_options()?,
            ));
        }

        Ok(Self {
            program: format!(
                "{}/bin/teamcity-server.{}",
                home_dir,
                platform.script_extension()
            ),
            env,
            args: vec![action.as_arg().to_string()],
        })
    }

    /// The command that starts or stops the environment's build agent.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of any required setting.
    pub fn agent(
        environment: &EnvironmentSettings,
        action: LaunchAction,
        platform: Platform,
    ) -> EnvironmentResult<Self> {
        let home_dir = environment.home_dir()?;
        let mut env = vec![("JAVA_HOME".to_string(), environment.java_home()?)];
        if action == LaunchAction::Start {
            env.push((
                "TEAMCITY_AGENT_OPTS".to_string(),
                environment.agent_options()?,
            ));
        }

        Ok(Self {
            program: format!(
                "{}/buildAgent/bin/agent.{}",
                home_dir,
                platform.script_extension()
            ),
            env,
            args: vec![action.as_arg().to_string()],
        })
    }

    /// The value of an environment variable passed to the script.
    pub fn env_value(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}=\"{}\" ", key, value)?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
