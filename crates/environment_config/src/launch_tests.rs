//! Tests for launch command composition.

use super::*;
use crate::{EnvironmentError, EnvironmentHandle, EnvironmentRegistry};
use serial_test::serial;

fn environment(registry: &mut EnvironmentRegistry) -> EnvironmentHandle {
    registry.set_base_home_dir("/servers");
    registry.set_base_data_dir("/data");
    let env = registry.environment("ci").unwrap();
    env.borrow_mut().set_version("2020.1.3").unwrap();
    env.borrow_mut().set_java_home("/opt/jdk");
    env
}

/// Verify the server start command on Unix.
#[test]
fn test_server_start_unix() {
    let mut registry = EnvironmentRegistry::new();
    let env = environment(&mut registry);
    env.borrow_mut().set_server_options(["-Xmx1g"]);

    let command = LaunchCommand::server(&env.borrow(), LaunchAction::Start, Platform::Unix).unwrap();

    assert_eq!(command.program, "/servers/TeamCity-2020.1.3/bin/teamcity-server.sh");
    assert_eq!(command.args, vec!["start"]);
    assert_eq!(command.env_value("JAVA_HOME"), Some("/opt/jdk"));
    assert_eq!(command.env_value("TEAMCITY_DATA_PATH"), Some("/data/2020.1"));
    assert_eq!(command.env_value("TEAMCITY_SERVER_OPTS"), Some("-Xmx1g"));
}

/// Verify the server stop command on Windows only passes the Java home.
#[test]
fn test_server_stop_windows() {
    let mut registry = EnvironmentRegistry::new();
    let env = environment(&mut registry);

    let command =
        LaunchCommand::server(&env.borrow(), LaunchAction::Stop, Platform::Windows).unwrap();

    assert_eq!(command.program, "/servers/TeamCity-2020.1.3/bin/teamcity-server.bat");
    assert_eq!(command.args, vec!["stop"]);
    assert_eq!(command.env, vec![("JAVA_HOME".to_string(), "/opt/jdk".to_string())]);
}

/// Verify the agent start command.
#[test]
fn test_agent_start() {
    let mut registry = EnvironmentRegistry::new();
    let env = environment(&mut registry);
    env.borrow_mut().add_agent_option("-Dagent=1");

    let command = LaunchCommand::agent(&env.borrow(), LaunchAction::Start, Platform::Unix).unwrap();

    assert_eq!(command.program, "/servers/TeamCity-2020.1.3/buildAgent/bin/agent.sh");
    assert_eq!(command.env_value("TEAMCITY_AGENT_OPTS"), Some("-Dagent=1"));
    assert_eq!(command.env_value("TEAMCITY_DATA_PATH"), None);

    let windows =
        LaunchCommand::agent(&env.borrow(), LaunchAction::Start, Platform::Windows).unwrap();
    assert!(windows.program.ends_with("/buildAgent/bin/agent.bat"));
}

/// Verify the agent does not need a data directory.
#[test]
fn test_agent_with_snapshot_version() {
    let mut registry = EnvironmentRegistry::new();
    let env = environment(&mut registry);
    env.borrow_mut().set_version("SNAPSHOT").unwrap();

    let agent = LaunchCommand::agent(&env.borrow(), LaunchAction::Start, Platform::Unix);
    assert!(agent.is_ok());

    let server = LaunchCommand::server(&env.borrow(), LaunchAction::Start, Platform::Unix);
    assert!(matches!(
        server,
        Err(EnvironmentError::InvalidSetting { ref setting, .. }) if setting == "dataDir"
    ));
}

/// Verify a missing Java home fails the command.
#[test]
#[serial]
fn test_missing_java_home() {
    let mut registry = EnvironmentRegistry::new();
    let env = registry.environment("ci").unwrap();
    std::env::remove_var("JAVA_HOME");

    let result = LaunchCommand::agent(&env.borrow(), LaunchAction::Stop, Platform::Unix);
    assert!(matches!(
        result,
        Err(EnvironmentError::UnresolvedSetting { .. })
    ));
}

/// Verify the printable form of a command.
#[test]
fn test_display() {
    let command = LaunchCommand {
        program: "/home/bin/agent.sh".to_string(),
        env: vec![("JAVA_HOME".to_string(), "/opt/jdk".to_string())],
        args: vec!["start".to_string()],
    };

    assert_eq!(command.to_string(), "JAVA_HOME=\"/opt/jdk\" /home/bin/agent.sh start");
}
