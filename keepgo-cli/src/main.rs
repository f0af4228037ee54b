//! keepgo: run a program as a service under the host's init system.
//!
//! # Usage
//!
//! ```text
//! keepgo [--config keepgo.yaml] install|uninstall|start|stop|restart
//! keepgo [--config keepgo.yaml] status [--json]
//! keepgo [--config keepgo.yaml] render [--system <name>]
//! keepgo [--config keepgo.yaml] run
//! keepgo systems [--json]
//! ```

mod commands;
mod controller;
mod service_file;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{render::RenderArgs, status::StatusArgs, systems::SystemsArgs};
use keepgo_service::ControlAction;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "keepgo",
    version,
    about = "Install and control a program as a systemd, Upstart, OpenRC, rcS, SysV or launchd service",
    long_about = None,
)]
struct Cli {
    /// Service file describing the program to manage.
    #[arg(long, short, global = true, default_value = "keepgo.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the init-system config and register it.
    Install,
    /// Deregister the service and remove its config.
    Uninstall,
    /// Start the installed service.
    Start,
    /// Stop the installed service.
    Stop,
    /// Restart the installed service.
    Restart,
    /// Show whether the service is running.
    Status(StatusArgs),
    /// Run the workload in the foreground until SIGTERM or SIGINT.
    Run,
    /// Print the config file `install` would write.
    Render(RenderArgs),
    /// List known init systems and which one is active here.
    Systems(SystemsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_path();

    match cli.command {
        Commands::Install => commands::lifecycle::run(config, ControlAction::Install),
        Commands::Uninstall => commands::lifecycle::run(config, ControlAction::Uninstall),
        Commands::Start => commands::lifecycle::run(config, ControlAction::Start),
        Commands::Stop => commands::lifecycle::run(config, ControlAction::Stop),
        Commands::Restart => commands::lifecycle::run(config, ControlAction::Restart),
        Commands::Status(args) => args.run(config),
        Commands::Run => commands::run::run(config),
        Commands::Render(args) => args.run(config),
        Commands::Systems(args) => args.run(),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
