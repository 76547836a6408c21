use clap::{Parser, Subcommand};
use environment_cli::commands::environments_cmd::{self, EnvironmentsCommands};
use environment_cli::commands::launch_cmd::{self, LaunchCommands, LaunchTarget};
use environment_cli::commands::version_cmd::{self, VersionArgs};
use environment_cli::config::ConfigArgs;
use environment_cli::errors::Error;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// teamcity-env: Inspect and drive TeamCity plugin development environments
#[derive(Parser, Debug)]
#[command(name = "teamcity-env")]
#[command(about = "Inspect and drive TeamCity plugin development environments", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List and inspect environments
    #[command(subcommand)]
    Environments(EnvironmentsCommands),

    /// Start or stop the TeamCity server of an environment
    #[command(subcommand)]
    Server(LaunchCommands),

    /// Start or stop the build agent of an environment
    #[command(subcommand)]
    Agent(LaunchCommands),

    /// Show the CLI version, compare versions or derive data versions
    Version(VersionArgs),
}

async fn run(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Environments(cmd) => environments_cmd::execute(cmd, &cli.config).await,
        Commands::Server(cmd) => launch_cmd::execute(LaunchTarget::Server, cmd, &cli.config).await,
        Commands::Agent(cmd) => launch_cmd::execute(LaunchTarget::Agent, cmd, &cli.config).await,
        Commands::Version(args) => version_cmd::execute(args).await,
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("TEAMCITY_ENV_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli).await {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
