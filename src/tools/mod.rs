/// MCP tools for completion tracking and stats
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call to interact with the stats engine.

pub mod achievements;
pub mod delete;
pub mod progress;
pub mod status;
pub mod toggle;

// Re-export tool functions for easy access
pub use achievements::*;
pub use delete::*;
pub use progress::*;
pub use status::*;
pub use toggle::*;
