//! Kiln CLI - Compile, watch, and serve web assets

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{compile, serve, watch};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Content-addressed asset pipeline for web applications", long_about = None)]
#[command(version)]
struct Cli {
    /// Application root directory
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Output directory for compiled assets (defaults to <root>/public/assets)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile assets for production
    Compile,

    /// Watch assets for changes and recompile
    Watch,

    /// Serve assets over HTTP for development
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Bare invocation shows usage without treating it as an error
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let output = cli
        .output
        .unwrap_or_else(|| cli.root.join("public").join("assets"));

    match command {
        Commands::Compile => compile::run(&cli.root, &output),
        Commands::Watch => watch::run(&cli.root, &output),
        Commands::Serve { addr } => serve::run(&cli.root, &addr),
    }
}
