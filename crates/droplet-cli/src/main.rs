mod commands;
mod progress;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "droplet", about = "Drop shape analysis: contact angles and tensiometry")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Analysis config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw edge contour into an ordered drop profile
    Clean(commands::clean::CleanArgs),
    /// Measure contact angles of one or more sessile drops
    Angle(commands::angle::AngleArgs),
    /// Measure interfacial tension from pendant drop outlines
    Tension(commands::tension::TensionArgs),
    /// Fit the needle width from its two edges
    Needle(commands::needle::NeedleArgs),
    /// Print or save the default analysis config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = commands::load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Clean(args) => commands::clean::run(args, &config),
        Commands::Angle(args) => commands::angle::run(args, &config),
        Commands::Tension(args) => commands::tension::run(args, &config),
        Commands::Needle(args) => commands::needle::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
