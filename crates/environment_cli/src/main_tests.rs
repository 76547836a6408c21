use super::*;
use environment_cli::commands::version_cmd::VersionCommands;

#[test]
fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_parse_environments_show() {
    let cli = Cli::try_parse_from(["teamcity-env", "environments", "show", "ci", "--json"]).unwrap();

    match cli.command {
        Commands::Environments(EnvironmentsCommands::Show { name, json }) => {
            assert_eq!(name, "ci");
            assert!(json);
        }
        other => panic!("Unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "teamcity-env",
        "--config",
        "build/teamcity.toml",
        "-P",
        "teamcity.environments.ci.homeDir=/opt/tc",
        "environments",
        "list",
    ])
    .unwrap();

    assert_eq!(
        cli.config.config.as_deref(),
        Some(std::path::Path::new("build/teamcity.toml"))
    );
    assert_eq!(
        cli.config.properties,
        vec![(
            "teamcity.environments.ci.homeDir".to_string(),
            "/opt/tc".to_string()
        )]
    );
}

#[test]
fn test_parse_property_after_subcommand() {
    let cli = Cli::try_parse_from([
        "teamcity-env",
        "server",
        "start",
        "ci",
        "--dry-run",
        "-P",
        "teamcity.environments.ci.javaHome=/opt/jdk",
    ])
    .unwrap();

    assert_eq!(cli.config.properties.len(), 1);
    match cli.command {
        Commands::Server(LaunchCommands::Start {
            environment,
            dry_run,
        }) => {
            assert_eq!(environment, "ci");
            assert!(dry_run);
        }
        other => panic!("Unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_invalid_property() {
    let result = Cli::try_parse_from(["teamcity-env", "-P", "no-equals", "environments", "list"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_agent_stop() {
    let cli = Cli::try_parse_from(["teamcity-env", "agent", "stop", "ci"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Agent(LaunchCommands::Stop { dry_run: false, .. })
    ));
}

#[test]
fn test_parse_version_commands() {
    let cli = Cli::try_parse_from(["teamcity-env", "version"]).unwrap();
    assert!(matches!(cli.command, Commands::Version(VersionArgs { command: None })));

    let cli = Cli::try_parse_from([
        "teamcity-env",
        "version",
        "compare",
        "2021.1-SNAPSHOT",
        "2021.1",
        "--allow-snapshots",
    ])
    .unwrap();
    match cli.command {
        Commands::Version(VersionArgs {
            command:
                Some(VersionCommands::Compare {
                    first,
                    second,
                    allow_snapshots,
                }),
        }) => {
            assert_eq!(first, "2021.1-SNAPSHOT");
            assert_eq!(second, "2021.1");
            assert!(allow_snapshots);
        }
        other => panic!("Unexpected command: {:?}", other),
    }
}
