//! Tests for environment inspection commands.

use super::*;
use environment_config::{PropertyOverrides, Setting};

fn plugin_with_environments(overrides: PropertyOverrides) -> PluginSettings {
    colored::control::set_override(false);

    let mut plugin = PluginSettings::with_overrides(overrides);
    let registry = plugin.environments_mut();
    registry.set_base_home_dir("/servers");
    registry.set_base_data_dir("/data");
    registry
        .configure("teamcity2020", |env| {
            env.set_version("2020.1.3")?;
            env.set_java_home("/opt/jdk11");
            env.add_plugins(["build/plugin.zip"]);
            Ok(())
        })
        .unwrap();
    registry
        .configure("teamcity2018", |env| {
            env.set_version("2018.2")?;
            env.set_java_home("/opt/jdk8");
            Ok(())
        })
        .unwrap();
    plugin
}

#[test]
fn test_format_environment_list() {
    let plugin = plugin_with_environments(PropertyOverrides::new());

    let output = format_environment_list(&plugin).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("teamcity2020"));
    assert!(lines[0].contains("2020.1.3"));
    assert!(lines[0].contains("/servers/TeamCity-2020.1.3"));
    assert!(lines[1].starts_with("teamcity2018"));
}

#[test]
fn test_format_empty_environment_list() {
    colored::control::set_override(false);
    let plugin = PluginSettings::new();

    let output = format_environment_list(&plugin).unwrap();
    assert_eq!(output, "(no environments defined)");
}

#[test]
fn test_resolve_unknown_environment() {
    let plugin = plugin_with_environments(PropertyOverrides::new());

    let result = resolve_environment(plugin.environments(), "missing");
    assert!(matches!(result, Err(Error::UnknownEnvironment(name)) if name == "missing"));
}

#[test]
fn test_format_environment_pretty_shows_sources() {
    let overrides = PropertyOverrides::new();
    overrides.set("teamcity.environments.teamcity2020.homeDir", "/tmp/override");
    let plugin = plugin_with_environments(overrides);

    let resolved = resolve_environment(plugin.environments(), "teamcity2020").unwrap();
    let output = format_environment_pretty(&resolved);

    assert!(output.contains("teamcity2020 (2020.1.3)"));
    assert!(output.contains("/tmp/override [override]"));
    assert!(output.contains("/opt/jdk11 [explicit]"));
    assert!(output.contains("/data/2020.1 [convention]"));
    assert!(output.contains("build/plugin.zip"));
}

#[test]
fn test_format_environment_json() {
    let plugin = plugin_with_environments(PropertyOverrides::new());
    let resolved = resolve_environment(plugin.environments(), "teamcity2018").unwrap();

    let json = format_environment_json(&resolved).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["name"], "teamcity2018");
    assert_eq!(value["version"], "2018.2");
    assert_eq!(value["data_dir"]["value"], "/data/2018.2");
    assert_eq!(value["data_dir"]["source"], "convention");
    assert_eq!(value["java_home"]["source"], "explicit");
    assert_eq!(resolved.settings().len(), Setting::ALL.len());
}
