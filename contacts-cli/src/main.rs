//! contacts CLI - HTTP CRUD service for the contacts table
//!
//! Loads `.env`, parses flags (each with an environment fallback), sets up
//! tracing, and runs the server.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "contacts",
    author,
    version,
    about = "Contacts CRUD service over HTTP, backed by PostgreSQL"
)]
struct Cli {
    /// Debug logging when RUST_LOG is not set
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so .env values feed the clap env fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
    }
    Ok(())
}
