/// Main entry point for the Habit Stats MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use habit_stats_mcp::{default_database_path, HabitStatsServer, TrackerConfig};

/// Command line arguments for the Habit Stats MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Extra attempts made when a write to the database fails
    #[arg(long, default_value_t = 1)]
    write_retries: u32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_stats_mcp={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting Habit Stats MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let config = TrackerConfig {
        write_retries: args.write_retries,
    };

    let server = HabitStatsServer::new(db_path, config).await?;
    server.run().await?;

    info!("Habit Stats MCP server shutdown complete");
    Ok(())
}
