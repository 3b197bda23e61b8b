/// Public library interface for the Habit Stats MCP server
///
/// This module exports the stats engine, its storage backends and the MCP
/// server that exposes them.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

// Internal modules
mod analytics;
mod clock;
mod config;
mod domain;
mod mcp;
mod orchestrator;
mod storage;
mod tools;

// Re-export public modules and types
pub use analytics::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{default_database_path, TrackerConfig};
pub use domain::*;
pub use mcp::McpServer;
pub use mcp::protocol::{JsonRpcResponse, ToolCallResult};
pub use orchestrator::{DeleteOutcome, StatsOrchestrator, ToggleOutcome};
pub use storage::{keys, MemoryStorage, SqliteStorage, StatsStore, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stats server backed by a SQLite database
///
/// Owns the single orchestrator that every tool call goes through.
pub struct HabitStatsServer {
    orchestrator: StatsOrchestrator<SqliteStorage>,
}

impl HabitStatsServer {
    /// Create a server over the database at `db_path`
    ///
    /// The schema is created or migrated on open.
    pub async fn new(db_path: PathBuf, config: TrackerConfig) -> Result<Self, ServerError> {
        Self::with_clock(db_path, config, Arc::new(SystemClock)).await
    }

    /// Create a server with an explicit time source
    pub async fn with_clock(
        db_path: PathBuf,
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Stats server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        let orchestrator = StatsOrchestrator::with_clock(storage, config, clock);

        Ok(Self { orchestrator })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Stats are recomputed once on startup so a streak that lapsed while the
    /// server was down is reported as such.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let stats = self.orchestrator.recompute().await?;
        tracing::info!(
            "Server started successfully: {} points, {} day streak",
            stats.total_points,
            stats.current_streak
        );

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn orchestrator(&self) -> &StatsOrchestrator<SqliteStorage> {
        &self.orchestrator
    }

    pub fn storage(&self) -> &SqliteStorage {
        self.orchestrator.store()
    }
}
