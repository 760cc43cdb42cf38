use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod build;
mod commands;
mod config;
mod util;

#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: QuireCommand,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,

    /// Remove the output directory before building
    #[arg(long, default_value = "false")]
    clean: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// Serve the existing output without building first
    #[arg(long, default_value = "false")]
    no_build: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct CleanArgs {
    /// Print what would be deleted without deleting it
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum QuireCommand {
    /// Build the site
    Build(BuildArgs),

    /// Build the site and serve it on a local port
    Serve(ServeArgs),

    /// Delete the generated site
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        QuireCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        QuireCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        QuireCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
